use rust_stemmers::{Algorithm, Stemmer as Snowball};

use super::normalize::parse;

/// Thin wrapper around the Snowball stemmer. Not `Sync`: each worker
/// thread constructs its own, the same way `StemmerFilter` re-creates
/// one per filter pass rather than sharing it.
pub struct Stemmer {
    inner: Snowball,
}

impl Stemmer {
    pub fn new() -> Self {
        Stemmer {
            inner: Snowball::create(Algorithm::English),
        }
    }

    pub fn stem(&self, word: &str) -> String {
        self.inner.stem(word).to_string()
    }

    /// `parse` the line, then stem each token, preserving order.
    pub fn stem_line(&self, line: &str) -> Vec<String> {
        parse(line).iter().map(|w| self.stem(w)).collect()
    }
}

impl Default for Stemmer {
    fn default() -> Self {
        Self::new()
    }
}
