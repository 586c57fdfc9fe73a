use std::collections::BTreeSet;

use crate::error::Result;
use crate::sync::Guarded;

use super::{InvertedIndex, SearchResult};

/// Wraps [`InvertedIndex`] with the reentrant reader/writer lock so many
/// producer threads and querier threads can share one index. Every
/// mutating method takes the write lock; every observing method takes
/// the read lock. `merge` holds the write lock for the whole bulk
/// operation so callers get atomicity by building a private local index
/// and merging it in one call.
pub struct ConcurrentIndex {
    inner: Guarded<InvertedIndex>,
}

impl ConcurrentIndex {
    pub fn new() -> Self {
        ConcurrentIndex {
            inner: Guarded::new(InvertedIndex::new()),
        }
    }

    pub fn add(&self, word: &str, location: &str, position: u32) -> Result<()> {
        self.inner.write().add(word, location, position)
    }

    pub fn add_all_tokens(&self, words: &[String], location: &str, start_position: u32) -> Result<()> {
        self.inner.write().add_all_tokens(words, location, start_position)
    }

    pub fn merge(&self, other: &InvertedIndex) {
        self.inner.write().merge(other)
    }

    pub fn exact_search(&self, queries: &BTreeSet<String>) -> Vec<SearchResult> {
        self.inner.read().exact_search(queries)
    }

    pub fn partial_search(&self, queries: &BTreeSet<String>) -> Vec<SearchResult> {
        self.inner.read().partial_search(queries)
    }

    /// Takes a read-locked snapshot of the underlying index. Used by the
    /// JSON emitters, which need a consistent view of all three levels
    /// rather than one search's accumulated results.
    pub fn snapshot(&self) -> InvertedIndex {
        self.inner.read().clone()
    }
}

impl Default for ConcurrentIndex {
    fn default() -> Self {
        Self::new()
    }
}
