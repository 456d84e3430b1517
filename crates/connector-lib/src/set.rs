//! Deduplicating string set

use serde::{Serialize, Serializer};
use std::collections::HashSet;

/// An order-irrelevant set of identifiers.
///
/// `items()` makes no ordering promise; compare results as unordered
/// collections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringSet {
    members: HashSet<String>,
}

impl StringSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value. Adding the same value twice is a no-op.
    pub fn add(&mut self, value: impl Into<String>) {
        self.members.insert(value.into());
    }

    /// Whether `value` was previously added.
    pub fn contains(&self, value: &str) -> bool {
        self.members.contains(value)
    }

    /// The deduplicated members, in no particular order.
    pub fn items(&self) -> Vec<String> {
        self.members.iter().cloned().collect()
    }

    /// The members sorted, for output that has to be stable.
    pub fn sorted_items(&self) -> Vec<String> {
        let mut items = self.items();
        items.sort();
        items
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for StringSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = StringSet::new();
        set.extend(iter);
        set
    }
}

impl<S: Into<String>> Extend<S> for StringSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl Serialize for StringSet {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        serializer.collect_seq(self.sorted_items())
    }
}
