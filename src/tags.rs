//! Product Tags
//!
//! A sorted, de-duplicated set of string tags attached to catalog products.

use std::string::ToString;

use smallvec::SmallVec;

/// A string tag set backed by a `SmallVec<[String; 5]>`, kept sorted for binary search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringTagCollection {
    tags: SmallVec<[String; 5]>,
}

impl StringTagCollection {
    /// Create a new tag collection, sorting and removing duplicates.
    #[must_use]
    pub fn new(tags: SmallVec<[String; 5]>) -> Self {
        let mut collection = Self { tags };

        collection.tags.sort();
        collection.tags.dedup();

        collection
    }

    /// Create a new tag collection from string slices.
    pub fn from_strs(tags: &[&str]) -> Self {
        Self::new(
            tags.iter()
                .map(ToString::to_string)
                .collect::<SmallVec<[String; 5]>>(),
        )
    }

    /// Create an empty tag collection.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            tags: SmallVec::with_capacity(0),
        }
    }

    /// Check if this collection contains a specific tag.
    pub fn contains(&self, tag: &str) -> bool {
        self.tags
            .binary_search_by(|probe| probe.as_str().cmp(tag))
            .is_ok()
    }

    /// Add a tag, keeping the collection sorted.
    pub fn add(&mut self, tag: &str) {
        if let Err(pos) = self.tags.binary_search_by(|probe| probe.as_str().cmp(tag)) {
            self.tags.insert(pos, tag.to_string());
        }
    }

    /// Iterate over the tags in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// Convert the tag collection to owned strings.
    #[must_use]
    pub fn to_strs(&self) -> SmallVec<[String; 5]> {
        self.tags.clone()
    }

    /// Check if this collection is empty.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Get the number of tags in this collection.
    pub fn len(&self) -> usize {
        self.tags.len()
    }
}

impl From<Vec<String>> for StringTagCollection {
    fn from(tags: Vec<String>) -> Self {
        Self::new(SmallVec::from_vec(tags))
    }
}
