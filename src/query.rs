use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::error::Result;
use crate::index::concurrent::ConcurrentIndex;
use crate::index::SearchResult;
use crate::sync::WorkQueue;
use crate::text::Stemmer;

/// Accumulates one ranked result list per distinct canonical query,
/// deduplicating query lines that stem down to the same set of words.
pub struct QueryParser {
    index: Arc<ConcurrentIndex>,
    exact: bool,
    results: Mutex<std::collections::BTreeMap<String, Vec<SearchResult>>>,
}

impl QueryParser {
    pub fn new(index: Arc<ConcurrentIndex>, exact: bool) -> Self {
        QueryParser {
            index,
            exact,
            results: Mutex::new(std::collections::BTreeMap::new()),
        }
    }

    /// Stems and dedupes `line` into a canonical query; if that query
    /// has not been seen before, runs the search and stores the result
    /// under it. A no-op on a blank line or a repeat query.
    pub fn search_line(&self, line: &str) {
        let stemmer = Stemmer::new();
        let stems: BTreeSet<String> = stemmer.stem_line(line).into_iter().collect();
        if stems.is_empty() {
            return;
        }
        let canonical = stems.iter().cloned().collect::<Vec<_>>().join(" ");

        if self.results.lock().unwrap().contains_key(&canonical) {
            return;
        }

        let result = if self.exact {
            self.index.exact_search(&stems)
        } else {
            self.index.partial_search(&stems)
        };

        self.results.lock().unwrap().entry(canonical).or_insert(result);
    }

    pub fn search_file(&self, path: &Path) -> Result<()> {
        let contents = fs::read_to_string(path)?;
        for line in contents.lines() {
            self.search_line(line);
        }
        Ok(())
    }

    pub fn search_file_concurrent(self: &Arc<Self>, path: &Path, queue: &WorkQueue) -> Result<()> {
        let contents = fs::read_to_string(path)?;
        for line in contents.lines() {
            let line = line.to_string();
            let parser = Arc::clone(self);
            queue.execute(move || parser.search_line(&line));
        }
        Ok(())
    }

    pub fn into_results(self) -> std::collections::BTreeMap<String, Vec<SearchResult>> {
        self.results.into_inner().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_query_dedup() {
        let index = Arc::new(ConcurrentIndex::new());
        index.add("cat", "f", 1).unwrap();
        index.add("dog", "f", 2).unwrap();

        let parser = QueryParser::new(index, true);
        parser.search_line("cats dogs");
        parser.search_line("dogs cats");

        let results = parser.into_results();
        assert_eq!(results.len(), 1);
        assert!(results.contains_key("cat dog"));
    }

    #[test]
    fn blank_line_is_a_no_op() {
        let index = Arc::new(ConcurrentIndex::new());
        let parser = QueryParser::new(index, true);
        parser.search_line("   ");
        assert!(parser.into_results().is_empty());
    }
}
