//! Row classification: derives one boolean column per vocabulary

use polars::prelude::*;
use std::cell::RefCell;
use std::collections::HashMap;
use tracing::debug;

use crate::data::{require_columns, FEEDBACK};
use crate::error::FeedbackResult;
use crate::matcher::matches_any;
use crate::text::normalize;
use crate::vocabulary::Vocabulary;

/// Memo table for normalized text and per-vocabulary match results.
///
/// Unbounded and never evicted: entries live as long as the owning
/// `Classifier`, which in turn lives for one session's bounded input.
/// Match results are keyed by the vocabulary's terms, not its name.
#[derive(Debug, Default)]
pub struct TextCache {
    normalized: HashMap<Option<String>, String>,
    matches: HashMap<Vec<String>, HashMap<String, bool>>,
}

impl TextCache {
    pub fn normalize(&mut self, raw: Option<&str>) -> String {
        let key = raw.map(str::to_string);
        self.normalized
            .entry(key)
            .or_insert_with(|| normalize(raw))
            .clone()
    }

    pub fn matches_any(&mut self, text: &str, vocabulary: &Vocabulary) -> bool {
        let terms = vocabulary.terms();
        if !self.matches.contains_key(terms) {
            self.matches.insert(terms.to_vec(), HashMap::new());
        }
        match self.matches.get_mut(terms) {
            Some(results) => *results
                .entry(text.to_string())
                .or_insert_with(|| matches_any(text, vocabulary)),
            None => matches_any(text, vocabulary),
        }
    }

    /// Number of memoized normalizations and matches.
    pub fn len(&self) -> usize {
        self.normalized.len() + self.matches.values().map(HashMap::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Applies a fixed set of vocabularies to the `Feedback` column of a table.
#[derive(Debug)]
pub struct Classifier {
    vocabularies: Vec<Vocabulary>,
    cache: Option<RefCell<TextCache>>,
}

impl Classifier {
    pub fn new(vocabularies: Vec<Vocabulary>) -> Self {
        Self {
            vocabularies,
            cache: None,
        }
    }

    /// Memoize normalization and matching across calls.
    pub fn with_cache(mut self) -> Self {
        self.cache = Some(RefCell::new(TextCache::default()));
        self
    }

    /// Entries held by the memo cache, if caching is enabled.
    pub fn cache_len(&self) -> Option<usize> {
        self.cache.as_ref().map(|cache| cache.borrow().len())
    }

    /// Normalize one feedback value, through the cache when enabled.
    pub fn normalize(&self, raw: Option<&str>) -> String {
        match &self.cache {
            Some(cache) => cache.borrow_mut().normalize(raw),
            None => normalize(raw),
        }
    }

    fn matches(&self, text: &str, vocabulary: &Vocabulary) -> bool {
        match &self.cache {
            Some(cache) => cache.borrow_mut().matches_any(text, vocabulary),
            None => matches_any(text, vocabulary),
        }
    }

    /// Attach one boolean column per vocabulary to a copy of `df`.
    ///
    /// Existing derived columns are replaced, so classifying an already
    /// classified table yields the same flags. Fails with a `SchemaError`
    /// when `Feedback` is missing.
    pub fn classify(&self, df: &DataFrame) -> FeedbackResult<DataFrame> {
        require_columns(df, &[FEEDBACK])?;

        let feedback = df.column(FEEDBACK)?.cast(&DataType::String)?;
        let texts: Vec<String> = feedback
            .str()?
            .into_iter()
            .map(|raw| self.normalize(raw))
            .collect();

        let mut classified = df.clone();
        for vocabulary in &self.vocabularies {
            let flags: Vec<bool> = texts
                .iter()
                .map(|text| self.matches(text, vocabulary))
                .collect();
            let matched = flags.iter().filter(|&&flag| flag).count();
            debug!(
                "Vocabulary '{}' matched {} of {} rows",
                vocabulary.name(),
                matched,
                flags.len()
            );
            classified.with_column(Series::new(vocabulary.column().into(), flags))?;
        }

        Ok(classified)
    }
}
