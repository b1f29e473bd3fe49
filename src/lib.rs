//! FeedbackForge: keyword-driven UX/UI feedback classification and churn impact analysis
//!
//! This library classifies customer feedback rows by substring matching against
//! fixed vocabularies, then aggregates the business impact (ARR lost, churned
//! customers, term frequencies) of UX/UI-related feedback using Polars.

pub mod aggregate;
pub mod classify;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod filter;
pub mod matcher;
pub mod text;
pub mod viz;
pub mod vocabulary;

// Re-export public items for easier access
pub use aggregate::{
    arr_by_term, arr_lost_and_customer_count, churn_breakdown_by_classification, summarize,
    summarize_notes, top_terms, ux_arr_exposure, AggregateReport, ArrLoss, ChurnBreakdown,
    NotesReport, SummaryOptions, TermArr,
};
pub use classify::{Classifier, TextCache};
pub use cli::Args;
pub use config::load_vocabularies;
pub use data::{load_and_prepare_table, read_and_prepare_table, TableKind};
pub use error::{FeedbackError, FeedbackResult};
pub use filter::{apply_filters, observed_sources, FilterSpec, Selection};
pub use matcher::{count_terms, matches_any, word_frequencies, TermCount};
pub use text::normalize;
pub use viz::generate_visualization_report;
pub use vocabulary::{Vocabulary, VocabularySet};

/// Common result type used by the application layer
pub type Result<T> = anyhow::Result<T>;
