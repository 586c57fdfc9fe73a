pub mod concurrent;

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, ErrorKind, Result};

pub type Word = String;
pub type Location = String;
pub type Position = u32;

/// `where` / `matches` / `score` for one location within one search.
///
/// A plain record, not a handle back into the index: ranking consults a
/// snapshot of the count table taken under the read lock, rather than
/// holding a live reference into the structure it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub location: Location,
    pub matches: u64,
    pub score: f64,
}

/// The three-level word -> location -> positions store, plus the
/// per-location token-count table.
#[derive(Debug, Default, Clone)]
pub struct InvertedIndex {
    words: BTreeMap<Word, BTreeMap<Location, BTreeSet<Position>>>,
    counts: BTreeMap<Location, u64>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        InvertedIndex {
            words: BTreeMap::new(),
            counts: BTreeMap::new(),
        }
    }

    /// Ensure all three levels exist and insert `position` into the
    /// position set. Bumps the location's token count only when the
    /// position was not already present.
    pub fn add(&mut self, word: &str, location: &str, position: Position) -> Result<()> {
        if word.is_empty() {
            return Err(Error::new(ErrorKind::InvalidInput, "word must not be empty"));
        }
        if location.is_empty() {
            return Err(Error::new(ErrorKind::InvalidInput, "location must not be empty"));
        }
        if position == 0 {
            return Err(Error::new(ErrorKind::InvalidInput, "position must be positive"));
        }

        let locations = self.words.entry(word.to_string()).or_default();
        let positions = locations.entry(location.to_string()).or_default();
        if positions.insert(position) {
            *self.counts.entry(location.to_string()).or_insert(0) += 1;
        }
        Ok(())
    }

    /// Adds `words[i]` at `start_position + i` for every `i`.
    pub fn add_all_tokens(&mut self, words: &[String], location: &str, start_position: Position) -> Result<()> {
        for (i, word) in words.iter().enumerate() {
            self.add(word, location, start_position + i as Position)?;
        }
        Ok(())
    }

    /// Bulk-inserts every `(word, location, position)` triple of `other`
    /// into `self`. Not idempotent with respect to counts if the same
    /// source is merged twice; intended to be called once per local index.
    pub fn merge(&mut self, other: &InvertedIndex) {
        for (word, locations) in &other.words {
            let dest_locations = self.words.entry(word.clone()).or_default();
            for (location, positions) in locations {
                let dest_positions = dest_locations.entry(location.clone()).or_default();
                dest_positions.extend(positions.iter().copied());
            }
        }
        for (location, count) in &other.counts {
            self.counts
                .entry(location.clone())
                .and_modify(|c| *c += count)
                .or_insert(*count);
        }
    }

    pub fn exact_search(&self, queries: &BTreeSet<String>) -> Vec<SearchResult> {
        let mut acc: BTreeMap<Location, u64> = BTreeMap::new();
        for query in queries {
            if let Some(locations) = self.words.get(query) {
                accumulate(&mut acc, locations);
            }
        }
        self.rank(acc)
    }

    pub fn partial_search(&self, queries: &BTreeSet<String>) -> Vec<SearchResult> {
        let mut acc: BTreeMap<Location, u64> = BTreeMap::new();
        for query in queries {
            for (_, locations) in self.words.range(query.clone()..).take_while(|(w, _)| w.starts_with(query.as_str())) {
                accumulate(&mut acc, locations);
            }
        }
        self.rank(acc)
    }

    fn rank(&self, acc: BTreeMap<Location, u64>) -> Vec<SearchResult> {
        let mut results: Vec<SearchResult> = acc
            .into_iter()
            .map(|(location, matches)| {
                let count = *self.counts.get(&location).unwrap_or(&1);
                SearchResult {
                    score: matches as f64 / count as f64,
                    matches,
                    location,
                }
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| {
                    let count_a = self.counts.get(&a.location).copied().unwrap_or(0);
                    let count_b = self.counts.get(&b.location).copied().unwrap_or(0);
                    count_b.cmp(&count_a)
                })
                .then_with(|| a.location.to_lowercase().cmp(&b.location.to_lowercase()))
                .then_with(|| a.location.cmp(&b.location))
        });
        results
    }

    pub fn counts(&self) -> &BTreeMap<Location, u64> {
        &self.counts
    }

    pub fn words(&self) -> &BTreeMap<Word, BTreeMap<Location, BTreeSet<Position>>> {
        &self.words
    }
}

fn accumulate(acc: &mut BTreeMap<Location, u64>, locations: &BTreeMap<Location, BTreeSet<Position>>) {
    for (location, positions) in locations {
        *acc.entry(location.clone()).or_insert(0) += positions.len() as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(words: &[&str]) -> BTreeSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn scenario_single_file() {
        let mut idx = InvertedIndex::new();
        idx.add("hello", "a.txt", 1).unwrap();
        idx.add("hello", "a.txt", 2).unwrap();
        idx.add("world", "a.txt", 3).unwrap();

        assert_eq!(
            idx.words()["hello"]["a.txt"],
            [1, 2].into_iter().collect::<BTreeSet<_>>()
        );
        assert_eq!(idx.words()["world"]["a.txt"], [3].into_iter().collect());
        assert_eq!(idx.counts()["a.txt"], 3);
    }

    #[test]
    fn repeat_add_is_idempotent() {
        let mut idx = InvertedIndex::new();
        idx.add("cat", "f", 1).unwrap();
        idx.add("cat", "f", 1).unwrap();
        assert_eq!(idx.words()["cat"]["f"].len(), 1);
        assert_eq!(idx.counts()["f"], 1);
    }

    #[test]
    fn add_rejects_invalid_input() {
        let mut idx = InvertedIndex::new();
        assert!(idx.add("", "f", 1).is_err());
        assert!(idx.add("w", "", 1).is_err());
        assert!(idx.add("w", "f", 0).is_err());
    }

    #[test]
    fn scenario_exact_vs_partial() {
        let mut idx = InvertedIndex::new();
        idx.add("cat", "f", 1).unwrap();
        idx.add("cats", "f", 2).unwrap();
        idx.add("catalog", "f", 3).unwrap();

        let exact = idx.exact_search(&set(&["cat"]));
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0].matches, 1);
        assert_eq!(exact[0].score, 1.0 / 3.0);

        let partial = idx.partial_search(&set(&["cat"]));
        assert_eq!(partial.len(), 1);
        assert_eq!(partial[0].matches, 3);
        assert_eq!(partial[0].score, 1.0);
    }

    #[test]
    fn scenario_ranking_tie_break() {
        let mut idx = InvertedIndex::new();
        idx.add("x", "B", 1).unwrap();
        for i in 2..=10 {
            idx.add("filler", "B", i).unwrap();
        }
        idx.add("x", "A", 1).unwrap();
        for i in 2..=10 {
            idx.add("filler2", "A", i).unwrap();
        }

        let results = idx.exact_search(&set(&["x"]));
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].location, "A");
        assert_eq!(results[1].location, "B");
    }

    #[test]
    fn empty_query_set_yields_empty_list() {
        let idx = InvertedIndex::new();
        assert!(idx.exact_search(&BTreeSet::new()).is_empty());
    }

    #[test]
    fn exact_is_subset_of_partial() {
        let mut idx = InvertedIndex::new();
        idx.add("run", "f", 1).unwrap();
        idx.add("runner", "f", 2).unwrap();
        idx.add("jog", "g", 1).unwrap();

        let exact: BTreeSet<_> = idx
            .exact_search(&set(&["run", "jog"]))
            .into_iter()
            .map(|r| r.location)
            .collect();
        let partial: BTreeSet<_> = idx
            .partial_search(&set(&["run", "jog"]))
            .into_iter()
            .map(|r| r.location)
            .collect();
        assert!(exact.is_subset(&partial));
    }

    #[test]
    fn merge_unions_positions_and_sums_counts() {
        let mut a = InvertedIndex::new();
        a.add("cat", "f", 1).unwrap();
        let mut b = InvertedIndex::new();
        b.add("cat", "f", 2).unwrap();
        b.add("dog", "g", 1).unwrap();

        a.merge(&b);
        assert_eq!(a.words()["cat"]["f"].len(), 2);
        assert_eq!(a.counts()["f"], 2);
        assert_eq!(a.counts()["g"], 1);
    }

    #[test]
    fn parallel_builders_over_disjoint_files_match_sequential() {
        let mut sequential = InvertedIndex::new();
        sequential.add("a", "f1", 1).unwrap();
        sequential.add("b", "f2", 1).unwrap();

        let mut local1 = InvertedIndex::new();
        local1.add("a", "f1", 1).unwrap();
        let mut local2 = InvertedIndex::new();
        local2.add("b", "f2", 1).unwrap();

        let mut merged = InvertedIndex::new();
        merged.merge(&local1);
        merged.merge(&local2);

        assert_eq!(merged.words(), sequential.words());
        assert_eq!(merged.counts(), sequential.counts());
    }
}
