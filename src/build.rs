use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::Result;
use crate::index::concurrent::ConcurrentIndex;
use crate::index::InvertedIndex;
use crate::sync::WorkQueue;
use crate::text::Stemmer;

/// Lists every regular file under `path` whose extension (case
/// insensitive) is `.txt` or `.text`, in deterministic order. If `path`
/// is itself a file, it is the sole entry regardless of extension.
pub fn collect_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    collect_recursive(path, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_recursive(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries: Vec<_> = fs::read_dir(dir)?.collect::<std::result::Result<_, _>>()?;
    entries.sort_by_key(|e| e.path());
    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            collect_recursive(&path, out)?;
        } else if has_text_extension(&path) {
            out.push(path);
        }
    }
    Ok(())
}

fn has_text_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("txt") || e.eq_ignore_ascii_case("text"))
        .unwrap_or(false)
}

/// Builds a local index from a single file: one line at a time, stemmed,
/// positions forming a dense 1..N stream for the whole file (advancing
/// once per emitted stem, not per source line or character).
pub fn build_local_index(path: &Path) -> Result<InvertedIndex> {
    let location = path.to_string_lossy().to_string();
    let contents = fs::read_to_string(path)?;
    let stemmer = Stemmer::new();
    let mut index = InvertedIndex::new();
    let mut position = 1u32;

    for line in contents.lines() {
        let stems = stemmer.stem_line(line);
        if stems.is_empty() {
            continue;
        }
        index.add_all_tokens(&stems, &location, position)?;
        position += stems.len() as u32;
    }
    Ok(index)
}

/// Walks `path` and merges every file's local index into `index`
/// sequentially: one `build_local_index` call per file, in file order.
pub fn build_index_sequential(path: &Path, index: &ConcurrentIndex) -> Result<()> {
    for file in collect_files(path)? {
        match build_local_index(&file) {
            Ok(local) => index.merge(&local),
            Err(e) => eprintln!("skipping {}: {e}", file.display()),
        }
    }
    Ok(())
}

/// Submits one task per file to `queue`; each task builds a local index
/// and merges it into `index`. Returns once every file has been
/// submitted, so callers await `queue.finish()` to see a complete index.
pub fn build_index_concurrent(path: &Path, index: Arc<ConcurrentIndex>, queue: &WorkQueue) -> Result<()> {
    for file in collect_files(path)? {
        let index = Arc::clone(&index);
        queue.execute(move || match build_local_index(&file) {
            Ok(local) => index.merge(&local),
            Err(e) => eprintln!("skipping {}: {e}", file.display()),
        });
    }
    Ok(())
}
