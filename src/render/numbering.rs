use std::collections::HashMap;

/// Assigns footnote numbers in the order labels are first seen, starting at 1.
#[derive(Debug, Default)]
pub(crate) struct FootnoteNumbering {
    mappings: HashMap<String, usize>,
    order: Vec<String>,
}

impl FootnoteNumbering {
    /// The label's number, assigning the next one if this is the first time we've seen it.
    pub(crate) fn number_for(&mut self, label: &str) -> usize {
        if let Some(number) = self.mappings.get(label) {
            return *number;
        }
        let number = self.order.len() + 1;
        self.mappings.insert(label.to_string(), number);
        self.order.push(label.to_string());
        number
    }

    pub(crate) fn contains(&self, label: &str) -> bool {
        self.mappings.contains_key(label)
    }

    /// The label that got `number`, if any.
    pub(crate) fn label_for(&self, number: usize) -> Option<&str> {
        let idx = number.checked_sub(1)?;
        self.order.get(idx).map(String::as_str)
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }
}
