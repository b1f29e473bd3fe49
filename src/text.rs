//! Feedback text normalization

use regex::Regex;
use std::sync::LazyLock;

/// Naive non-greedy tag matcher. Not an HTML parser: no nesting awareness.
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<.*?>").unwrap());

/// Strip markup tags and lowercase the remainder.
///
/// Missing text normalizes to an empty string so that downstream matching
/// never sees a null.
pub fn normalize(text: Option<&str>) -> String {
    match text {
        Some(raw) => strip_tags(raw).to_lowercase(),
        None => String::new(),
    }
}

/// Remove every `<...>` span from `text`.
pub fn strip_tags(text: &str) -> String {
    TAG_RE.replace_all(text, "").into_owned()
}
