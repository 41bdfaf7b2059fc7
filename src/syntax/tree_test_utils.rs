#[cfg(test)]
pub(crate) use test_utils::*;
