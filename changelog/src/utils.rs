use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

/// Issue reference at the end of a rendered bullet: `(#12)` or `([#12](url))`
pub static ISSUE_REFERENCE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(\[?#(\d+)\]?(?:\([^)\s]*\))?\)").expect("Failed to compile issue reference regex")
});

pub static BULLET_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[-*] ").expect("Failed to compile bullet regex"));

/// `{{ title }}` or `{{ issue.title }}` in an entry template
pub static TEMPLATE_PLACEHOLDER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*(?:issue\.)?([A-Za-z_]+)\s*\}\}")
        .expect("Failed to compile template placeholder regex")
});

/// Issue numbers referenced by the bullets in `text`.
///
/// Only the last reference of a bullet counts, since titles may mention other
/// issues themselves.
pub fn issue_numbers(text: &str) -> BTreeSet<u64> {
    text.lines()
        .filter(|line| BULLET_PATTERN.is_match(line))
        .filter_map(|line| {
            ISSUE_REFERENCE_PATTERN
                .captures_iter(line)
                .last()
                .and_then(|captures| captures.get(1))
                .and_then(|number| number.as_str().parse().ok())
        })
        .collect()
}
