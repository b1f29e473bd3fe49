//! Substring term matching and corpus frequency counting

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::vocabulary::Vocabulary;

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w+\b").unwrap());

/// Separator placed between corpus entries before counting.
const CORPUS_SEPARATOR: &str = " ";

/// A ranked `(term, count)` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermCount {
    pub term: String,
    pub count: usize,
}

impl TermCount {
    pub fn new(term: impl Into<String>, count: usize) -> Self {
        Self {
            term: term.into(),
            count,
        }
    }
}

/// True iff some vocabulary term occurs as a literal substring of `text`.
///
/// Both sides are expected to be lowercase already. No word boundaries are
/// enforced, so "tab" matches inside "table".
pub fn matches_any(text: &str, vocabulary: &Vocabulary) -> bool {
    vocabulary
        .terms()
        .iter()
        .any(|term| text.contains(term.as_str()))
}

/// Count non-overlapping literal occurrences of every vocabulary term across
/// the corpus.
///
/// Zero counts are dropped. The result is ordered by count, highest first;
/// equal counts keep vocabulary order.
pub fn count_terms<S: AsRef<str>>(corpus: &[S], vocabulary: &Vocabulary) -> Vec<TermCount> {
    let haystack = join_corpus(corpus);

    let mut counts: Vec<TermCount> = vocabulary
        .terms()
        .iter()
        .map(|term| TermCount::new(term.clone(), haystack.matches(term.as_str()).count()))
        .filter(|tc| tc.count > 0)
        .collect();

    // sort_by is stable, so ties stay in vocabulary order
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Most common `\w+` tokens in the corpus, highest first.
///
/// Ties are ordered by first appearance. At most `limit` entries are returned.
pub fn word_frequencies<S: AsRef<str>>(corpus: &[S], limit: usize) -> Vec<TermCount> {
    let haystack = join_corpus(corpus);

    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<TermCount> = Vec::new();
    for word in WORD_RE.find_iter(&haystack) {
        match seen.get(word.as_str()) {
            Some(&idx) => counts[idx].count += 1,
            None => {
                seen.insert(word.as_str(), counts.len());
                counts.push(TermCount::new(word.as_str(), 1));
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}

fn join_corpus<S: AsRef<str>>(corpus: &[S]) -> String {
    corpus
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join(CORPUS_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab(terms: &[&str]) -> Vocabulary {
        Vocabulary::new("test", "is_test", terms)
    }

    #[test]
    fn test_matches_any() {
        let v = vocab(&["complex", "hard to"]);
        assert!(matches_any("the ui is too complex", &v));
        assert!(matches_any("it was hard to find", &v));
        assert!(!matches_any("works great", &v));
        assert!(!matches_any("", &v));
    }

    #[test]
    fn test_matches_any_has_no_word_boundaries() {
        let v = vocab(&["big"]);
        assert!(matches_any("the biggest problem", &v));
    }

    #[test]
    fn test_matches_any_ignores_vocabulary_order() {
        let forward = vocab(&["menu", "search", "tab"]);
        let backward = vocab(&["tab", "search", "menu"]);
        for text in ["open the menu", "no signal here", "search and tab"] {
            assert_eq!(matches_any(text, &forward), matches_any(text, &backward));
        }
    }

    #[test]
    fn test_count_terms_ranks_by_count() {
        let v = vocab(&["search", "pagination"]);
        let corpus = ["search and pagination, search again"];
        assert_eq!(
            count_terms(&corpus, &v),
            vec![TermCount::new("search", 2), TermCount::new("pagination", 1)]
        );
    }

    #[test]
    fn test_count_terms_drops_zero_counts_and_breaks_ties_by_vocabulary_order() {
        let v = vocab(&["tab", "menu", "button", "search"]);
        let corpus = ["menu then tab", "search"];
        assert_eq!(
            count_terms(&corpus, &v),
            vec![
                TermCount::new("tab", 1),
                TermCount::new("menu", 1),
                TermCount::new("search", 1),
            ]
        );

        let reordered = vocab(&["search", "menu", "tab"]);
        let terms: Vec<String> = count_terms(&corpus, &reordered)
            .into_iter()
            .map(|tc| tc.term)
            .collect();
        assert_eq!(terms, vec!["search", "menu", "tab"]);
    }

    #[test]
    fn test_count_terms_is_row_order_independent() {
        let v = vocab(&["search", "menu", "filter"]);
        let a = ["search menu", "filter search", "menu"];
        let b = ["menu", "filter search", "search menu"];
        assert_eq!(count_terms(&a, &v), count_terms(&b, &v));
    }

    #[test]
    fn test_count_terms_counts_non_overlapping() {
        let v = vocab(&["aa"]);
        assert_eq!(count_terms(&["aaaa a"], &v), vec![TermCount::new("aa", 2)]);
    }

    #[test]
    fn test_count_terms_empty_corpus() {
        let v = vocab(&["search"]);
        let corpus: Vec<String> = Vec::new();
        assert!(count_terms(&corpus, &v).is_empty());
    }

    #[test]
    fn test_word_frequencies() {
        let corpus = ["the menu is slow", "the search is slow", "menu"];
        let words = word_frequencies(&corpus, 3);
        assert_eq!(
            words,
            vec![
                TermCount::new("the", 2),
                TermCount::new("menu", 2),
                TermCount::new("is", 2),
            ]
        );
        assert_eq!(word_frequencies(&corpus, 15).len(), 5);
    }
}
