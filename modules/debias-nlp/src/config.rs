//! Tuning constants for the heuristic keyword/topic extraction in this crate (see DESIGN.md).

use std::collections::HashSet;
use std::sync::OnceLock;

pub const SNIPPET_LENGTH: usize = 200;
pub const MAX_KEYWORDS: usize = 8;

pub const NEWS_CATEGORIES: &[&str] = &[
    "politics",
    "business",
    "technology",
    "health",
    "science",
    "sports",
    "entertainment",
    "world",
    "environment",
];

const STOP_WORDS: &[&str] = &[
    "said", "says", "told", "according", "reported", "going", "latest", "news", "press",
    "associated", "world", "update", "live", "breaking", "exclusive", "report", "today",
    "yesterday", "tomorrow", "week", "month", "year", "the", "a", "an", "and", "or", "but",
    "in", "on", "at", "to", "for", "of", "with", "by", "is", "are", "was", "were", "this",
    "that", "these", "those", "it", "its", "as", "from",
];

const PUBLISHER_NAMES: &[&str] = &[
    "skynews",
    "bbc",
    "cnn",
    "reuters",
    "apnews",
    "theguardian",
    "nytimes",
    "wsj",
    "ft",
    "bloomberg",
    "sky news",
    "bbc news",
    "world news",
    "latest news",
    "breaking news",
    "ap news",
    "the associated press",
    "the guardian",
    "new york times",
    "wall street journal",
    "financial times",
];

fn stop_words() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| STOP_WORDS.iter().copied().collect())
}

/// Whether `keyword` should be kept: not a stopword, not purely numeric, not a publisher name.
pub fn is_valid_keyword(keyword: &str) -> bool {
    let lower = keyword.to_lowercase();
    if stop_words().contains(lower.as_str()) {
        return false;
    }
    if !lower.is_empty() && lower.chars().all(|c| c.is_ascii_digit() || c.is_whitespace()) {
        return false;
    }
    if PUBLISHER_NAMES.iter().any(|p| lower.contains(p)) {
        return false;
    }
    true
}
