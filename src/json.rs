use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs::File;
use std::io::Write as _;
use std::path::Path;

use crate::error::Result;
use crate::index::{InvertedIndex, SearchResult};

/// None of the three output documents fit `serde_json`'s stock
/// pretty-printer: it indents with two spaces, not a tab, and has no
/// way to pin a float to a fixed number of decimal digits. Each
/// document is therefore built as a plain string with `write!`, using
/// `serde_json::to_string` only to get correct string escaping for
/// locations and words.
fn quote(s: &str) -> String {
    serde_json::to_string(s).expect("string serialization cannot fail")
}

fn write_document(path: &Path, body: &str) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(body.as_bytes())?;
    Ok(())
}

/// `{ "word": { "location": [positions...] }, ... }`, every level
/// sorted ascending by key (guaranteed by the index's own `BTreeMap`s).
pub fn write_index(index: &InvertedIndex, path: &Path) -> Result<()> {
    let mut out = String::new();
    out.push_str("{\n");
    let words = index.words();
    for (wi, (word, locations)) in words.iter().enumerate() {
        let _ = write!(out, "\t{}: {{\n", quote(word));
        for (li, (location, positions)) in locations.iter().enumerate() {
            let _ = write!(out, "\t\t{}: [\n", quote(location));
            for (pi, position) in positions.iter().enumerate() {
                let comma = if pi + 1 < positions.len() { "," } else { "" };
                let _ = write!(out, "\t\t\t{position}{comma}\n");
            }
            let comma = if li + 1 < locations.len() { "," } else { "" };
            let _ = write!(out, "\t\t]{comma}\n");
        }
        let comma = if wi + 1 < words.len() { "," } else { "" };
        let _ = write!(out, "\t}}{comma}\n");
    }
    out.push_str("}\n");
    write_document(path, &out)
}

/// `{ "location": count, ... }`, sorted by key.
pub fn write_counts(index: &InvertedIndex, path: &Path) -> Result<()> {
    let mut out = String::new();
    out.push_str("{\n");
    let counts = index.counts();
    for (i, (location, count)) in counts.iter().enumerate() {
        let comma = if i + 1 < counts.len() { "," } else { "" };
        let _ = write!(out, "\t{}: {count}{comma}\n", quote(location));
    }
    out.push_str("}\n");
    write_document(path, &out)
}

/// `{ "query canonical": [ {"where", "count", "score"}, ... ], ... }`,
/// sorted by query key, score with exactly eight digits after the point.
pub fn write_results(results: &BTreeMap<String, Vec<SearchResult>>, path: &Path) -> Result<()> {
    let mut out = String::new();
    out.push_str("{\n");
    for (qi, (query, matches)) in results.iter().enumerate() {
        let _ = write!(out, "\t{}: [\n", quote(query));
        for (mi, result) in matches.iter().enumerate() {
            out.push_str("\t\t{\n");
            let _ = write!(out, "\t\t\t\"where\": {},\n", quote(&result.location));
            let _ = write!(out, "\t\t\t\"count\": {},\n", result.matches);
            let _ = write!(out, "\t\t\t\"score\": {:.8}\n", result.score);
            let comma = if mi + 1 < matches.len() { "," } else { "" };
            let _ = write!(out, "\t\t}}{comma}\n");
        }
        let comma = if qi + 1 < results.len() { "," } else { "" };
        let _ = write!(out, "\t]{comma}\n");
    }
    out.push_str("}\n");
    write_document(path, &out)
}
