/// Merges neighbors that can be represented as one item.
///
/// Used for plain text that the standard grammar splits into several leaves, and for rendered runs that end up with
/// identical styling after flattening.
pub trait Concatenate: Sized {
    /// Tries to absorb `other` into `self`. Returns `other` back if the two can't be merged.
    fn try_concatenate(&mut self, other: Self) -> Result<(), Self>;

    fn concatenate_similar(items: Vec<Self>) -> Vec<Self> {
        let mut merged: Vec<Self> = Vec::with_capacity(items.len());
        for item in items {
            let leftover = match merged.last_mut() {
                Some(prev) => prev.try_concatenate(item),
                None => Err(item),
            };
            if let Err(item) = leftover {
                merged.push(item);
            }
        }
        merged
    }
}
