//! Name partition between two tensor maps

use std::collections::BTreeSet;

/// Tensor names split into common and file-unique sets, each sorted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamePartition {
    /// Names present in both files
    pub common: Vec<String>,
    /// Names only in the first file
    pub only_in_first: Vec<String>,
    /// Names only in the second file
    pub only_in_second: Vec<String>,
}

impl NamePartition {
    /// Partition two name sets
    pub fn new<'a, A, B>(first: A, second: B) -> Self
    where
        A: IntoIterator<Item = &'a str>,
        B: IntoIterator<Item = &'a str>,
    {
        let first: BTreeSet<&str> = first.into_iter().collect();
        let second: BTreeSet<&str> = second.into_iter().collect();

        Self {
            common: first.intersection(&second).map(|s| s.to_string()).collect(),
            only_in_first: first.difference(&second).map(|s| s.to_string()).collect(),
            only_in_second: second.difference(&first).map(|s| s.to_string()).collect(),
        }
    }

    /// No name is unique to either file
    pub fn is_balanced(&self) -> bool {
        self.only_in_first.is_empty() && self.only_in_second.is_empty()
    }
}
