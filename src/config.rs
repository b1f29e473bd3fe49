//! Vocabulary configuration loaded from TOML
//!
//! ```toml
//! [ux]
//! terms = ["confusing", "hard to", "ui"]
//!
//! [ui_components]
//! enabled = false
//!
//! [product_features]
//! terms = ["reports", "dashboard"]
//! ```
//!
//! Sections that are left out keep the built-in term lists.

use serde::Deserialize;
use std::path::Path;
use tracing::info;

use crate::error::{FeedbackError, FeedbackResult};
use crate::vocabulary::{Vocabulary, VocabularySet};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct VocabularyFile {
    ux: Option<TermSection>,
    ui_components: Option<TermSection>,
    product_features: Option<TermSection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TermSection {
    #[serde(default = "enabled_by_default")]
    enabled: bool,
    terms: Option<Vec<String>>,
}

fn enabled_by_default() -> bool {
    true
}

/// Read a vocabulary file from disk
pub fn load_vocabularies(path: impl AsRef<Path>) -> FeedbackResult<VocabularySet> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let vocabularies = parse_vocabularies(&content)?;
    info!(
        "Loaded vocabularies from {}: {} UX terms",
        path.display(),
        vocabularies.ux.len()
    );
    Ok(vocabularies)
}

/// Parse vocabulary TOML, falling back to the built-in lists per section
pub fn parse_vocabularies(content: &str) -> FeedbackResult<VocabularySet> {
    let file: VocabularyFile =
        toml::from_str(content).map_err(|e| FeedbackError::Configuration(e.to_string()))?;
    let defaults = VocabularySet::default();

    let ux = match file.ux {
        Some(section) if !section.enabled => {
            return Err(FeedbackError::Configuration(
                "the ux vocabulary cannot be disabled".to_string(),
            ))
        }
        Some(section) => resolve(section, defaults.ux)
            .ok_or_else(|| FeedbackError::Configuration("ux vocabulary has no terms".to_string()))?,
        None => defaults.ux,
    };

    Ok(VocabularySet {
        ux,
        ui_components: optional(file.ui_components, defaults.ui_components),
        product_features: optional(file.product_features, defaults.product_features),
    })
}

fn optional(section: Option<TermSection>, default: Option<Vocabulary>) -> Option<Vocabulary> {
    match (section, default) {
        (None, default) => default,
        (Some(section), Some(default)) => resolve(section, default),
        (Some(_), None) => None,
    }
}

/// Apply a section on top of a built-in vocabulary. Disabled or empty
/// sections yield `None`.
fn resolve(section: TermSection, default: Vocabulary) -> Option<Vocabulary> {
    if !section.enabled {
        return None;
    }
    let vocabulary = match section.terms {
        Some(terms) => Vocabulary::new(default.name(), default.column(), terms),
        None => default,
    };
    (!vocabulary.is_empty()).then_some(vocabulary)
}
