use crate::config::Config;
use crate::error::{Error, ErrorKind, Result};

pub const USAGE: &str = "\
minnow - build and query an in-memory inverted index

USAGE:
    minnow [FLAGS]

FLAGS:
    -text PATH      build the index from this file or directory tree
    -html URL       seed a web crawl from this URL
    -max N          cap on URLs crawled (default 1)
    -threads N      enable concurrent mode with N workers (default 5)
    -index PATH     write the inverted index JSON here (default index.json)
    -counts PATH    write per-location counts JSON here (default counts.json)
    -query PATH     search queries from this file
    -exact          exact-match search; otherwise prefix search
    -results PATH   write query-results JSON here (default results.json)
    -h, --help      print this message
";

#[derive(Debug, Clone)]
pub struct Args {
    pub text: Option<String>,
    pub html: Option<String>,
    pub max: usize,
    pub threads: Option<usize>,
    pub index: String,
    pub counts: String,
    pub query: Option<String>,
    pub exact: bool,
    pub results: String,
}

/// A token is a flag if it starts with `-` followed by an ASCII letter;
/// anything else is the value belonging to the preceding flag. Flags may
/// repeat; the last occurrence wins.
pub fn parse(raw: &[String], config: &Config) -> Result<Args> {
    // Checked up front: "--help" does not fit the "-" + ASCII-letter
    // flag grammar below (its second character is itself "-"), so it
    // cannot be recognized by the generic loop.
    if raw.iter().any(|t| t == "-h" || t == "--help") {
        return Err(Error::new(ErrorKind::InvalidInput, "help requested"));
    }

    let mut text = None;
    let mut html = None;
    let mut max = config.default_crawl_max;
    let mut threads = None;
    let mut index = config.index_path.clone();
    let mut counts = config.counts_path.clone();
    let mut query = None;
    let mut exact = false;
    let mut results = config.results_path.clone();

    let mut i = 0;
    while i < raw.len() {
        let token = raw[i].as_str();
        if !is_flag(token) {
            return Err(parse_error(format!("unexpected argument {token:?}")));
        }

        if token == "-exact" {
            exact = true;
            i += 1;
            continue;
        }

        let value = raw.get(i + 1).ok_or_else(|| parse_error(format!("{token} requires a value")))?;
        if is_flag(value) {
            return Err(parse_error(format!("{token} requires a value")));
        }

        match token {
            "-text" => text = Some(value.clone()),
            "-html" => html = Some(value.clone()),
            "-max" => max = value.parse::<usize>()?,
            "-threads" => threads = Some(value.parse::<usize>()?),
            "-index" => index = value.clone(),
            "-counts" => counts = value.clone(),
            "-query" => query = Some(value.clone()),
            "-results" => results = value.clone(),
            other => return Err(parse_error(format!("unknown flag {other}"))),
        }
        i += 2;
    }

    Ok(Args {
        text,
        html,
        max,
        threads,
        index,
        counts,
        query,
        exact,
        results,
    })
}

fn is_flag(token: &str) -> bool {
    token.starts_with('-') && token.chars().nth(1).is_some_and(|c| c.is_ascii_alphabetic())
}

fn parse_error(context: String) -> Error {
    Error::new(ErrorKind::InvalidInput, context)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(tokens: &[&str]) -> Result<Args> {
        parse(&tokens.iter().map(|s| s.to_string()).collect::<Vec<_>>(), &Config::default())
    }

    #[test]
    fn defaults_apply_when_no_flags_given() {
        let a = args(&[]).unwrap();
        assert_eq!(a.index, "index.json");
        assert_eq!(a.counts, "counts.json");
        assert_eq!(a.results, "results.json");
        assert_eq!(a.max, 1);
        assert!(!a.exact);
        assert!(a.text.is_none());
    }

    #[test]
    fn later_repetition_overwrites_earlier() {
        let a = args(&["-text", "first", "-text", "second"]).unwrap();
        assert_eq!(a.text.as_deref(), Some("second"));
    }

    #[test]
    fn unordered_flags_all_apply() {
        let a = args(&["-exact", "-max", "3", "-text", "docs"]).unwrap();
        assert!(a.exact);
        assert_eq!(a.max, 3);
        assert_eq!(a.text.as_deref(), Some("docs"));
    }

    #[test]
    fn non_integer_max_is_a_parse_error() {
        assert!(args(&["-max", "abc"]).is_err());
    }

    #[test]
    fn unknown_flag_is_rejected() {
        assert!(args(&["-bogus", "x"]).is_err());
    }

    #[test]
    fn missing_value_is_rejected() {
        assert!(args(&["-text"]).is_err());
    }
}
