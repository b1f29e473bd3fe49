//! Term vocabularies used for lexical classification

use serde::{Deserialize, Serialize};

use crate::data::{IS_UI_COMPONENT_RELATED, IS_UX_RELATED};

/// Broad UX/UI signal terms.
pub const UX_TERMS: &[&str] = &[
    "ux",
    "ui",
    "user experience",
    "user interface",
    "usability",
    "intuitive",
    "confusing",
    "confused",
    "complex",
    "complicated",
    "cluttered",
    "clunky",
    "hard to",
    "difficult to",
    "easy to use",
    "user friendly",
    "user-friendly",
    "navigate",
    "navigation",
    "layout",
    "design",
    "look and feel",
    "interface",
    "too many clicks",
    "learning curve",
    "frustrating",
    "outdated",
    "accessibility",
    "workflow",
    "can't find",
    "cannot find",
];

/// Concrete interface elements.
pub const UI_COMPONENT_TERMS: &[&str] = &[
    "search",
    "button",
    "navigation",
    "pagination",
    "menu",
    "dropdown",
    "filter",
    "sidebar",
    "toolbar",
    "modal",
    "tab",
    "form",
    "checkbox",
    "icon",
    "scroll",
    "table",
    "calendar",
    "notification",
];

/// Product areas customers mention in feedback.
pub const PRODUCT_FEATURE_TERMS: &[&str] = &[
    "users",
    "courses",
    "learning paths",
    "reports",
    "dashboard",
    "integrations",
    "billing",
];

/// An ordered set of lowercase terms plus the derived column it drives.
///
/// Terms are lowercased and de-duplicated on construction; the first
/// occurrence keeps its position, so declaration order stays the tie-break
/// order for ranked counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    name: String,
    column: String,
    terms: Vec<String>,
}

impl Vocabulary {
    pub fn new<I, S>(name: impl Into<String>, column: impl Into<String>, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ordered: Vec<String> = Vec::new();
        for term in terms {
            let term = term.as_ref().trim().to_lowercase();
            if term.is_empty() || ordered.contains(&term) {
                continue;
            }
            ordered.push(term);
        }

        Self {
            name: name.into(),
            column: column.into(),
            terms: ordered,
        }
    }

    /// The built-in UX/UI vocabulary, driving `is_ux_related`.
    pub fn ux() -> Self {
        Self::new("ux", IS_UX_RELATED, UX_TERMS)
    }

    /// The built-in UI component vocabulary, driving `is_ui_component_related`.
    pub fn ui_components() -> Self {
        Self::new("ui_components", IS_UI_COMPONENT_RELATED, UI_COMPONENT_TERMS)
    }

    /// The built-in product feature vocabulary, driving `mentions_product_feature`.
    pub fn product_features() -> Self {
        Self::new(
            "product_features",
            "mentions_product_feature",
            PRODUCT_FEATURE_TERMS,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the boolean column the classifier attaches for this vocabulary.
    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// The vocabularies one pipeline run works with.
///
/// Only `ux` is mandatory. A missing optional vocabulary means the matching
/// column and the metrics built on it are simply absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularySet {
    pub ux: Vocabulary,
    pub ui_components: Option<Vocabulary>,
    pub product_features: Option<Vocabulary>,
}

impl VocabularySet {
    /// Vocabularies that become classifier columns.
    pub fn classifying(&self) -> Vec<Vocabulary> {
        let mut vocabularies = vec![self.ux.clone()];
        if let Some(ui) = &self.ui_components {
            vocabularies.push(ui.clone());
        }
        vocabularies
    }

    pub fn without_ui_components(mut self) -> Self {
        self.ui_components = None;
        self
    }
}

impl Default for VocabularySet {
    fn default() -> Self {
        Self {
            ux: Vocabulary::ux(),
            ui_components: Some(Vocabulary::ui_components()),
            product_features: Some(Vocabulary::product_features()),
        }
    }
}
