use unicode_normalization::UnicodeNormalization;

/// Decomposes to NFD, drops every code point that is not alphabetic or
/// whitespace (this also strips diacritics, since combining marks are
/// not alphabetic), then lower-cases what remains.
pub fn clean(text: &str) -> String {
    text.nfd()
        .filter(|c| c.is_alphabetic() || c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

pub fn split(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

pub fn parse(text: &str) -> Vec<String> {
    split(&clean(text))
}
