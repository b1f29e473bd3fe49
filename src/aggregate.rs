//! Business impact aggregation over classified feedback tables
//!
//! Every revenue and headcount figure is deduplicated by customer: a customer
//! who left several feedback rows contributes the ARR of their first row,
//! once.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::data::{has_columns, require_columns, ARR, CHURNED, CUSTOMER, FEEDBACK, IS_UX_RELATED};
use crate::error::FeedbackResult;
use crate::matcher::{count_terms, word_frequencies, TermCount};
use crate::text::normalize;
use crate::vocabulary::{Vocabulary, VocabularySet};

/// Default length of the most-common-words lists
pub const DEFAULT_WORD_LIMIT: usize = 15;

const CUSTOMERS: &str = "customers";

/// Revenue total and distinct customers behind it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrLoss {
    pub total_arr: f64,
    pub customer_count: usize,
}

/// Distinct churned customers per UX classification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChurnBreakdown {
    pub ux_related: usize,
    pub not_ux_related: usize,
}

impl ChurnBreakdown {
    pub fn total(&self) -> usize {
        self.ux_related + self.not_ux_related
    }
}

/// ARR attributed to one vocabulary term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermArr {
    pub term: String,
    pub arr: f64,
    pub customers: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryOptions {
    /// Entries kept in each most-common-words list.
    pub word_limit: usize,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            word_limit: DEFAULT_WORD_LIMIT,
        }
    }
}

/// Everything the presentation layer renders for a primary feedback table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateReport {
    pub rows: usize,
    pub ux_related_rows: usize,
    /// ARR and customers lost to churn on UX-related feedback.
    pub arr_lost: ArrLoss,
    /// ARR of every customer with UX-related feedback, churned or not.
    pub ux_arr_exposure: ArrLoss,
    pub churn_breakdown: ChurnBreakdown,
    pub top_ux_terms: Vec<TermCount>,
    pub top_ui_component_terms: Option<Vec<TermCount>>,
    pub arr_by_ui_component: Option<Vec<TermArr>>,
    pub arr_by_product_feature: Option<Vec<TermArr>>,
    pub common_words: Vec<TermCount>,
    pub ux_common_words: Vec<TermCount>,
}

/// Report for a notes table; revenue features are `None` when the columns
/// they need are absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotesReport {
    pub rows: usize,
    pub ux_related_rows: usize,
    pub top_ux_terms: Vec<TermCount>,
    pub top_ui_component_terms: Option<Vec<TermCount>>,
    pub common_words: Vec<TermCount>,
    pub arr_lost: Option<ArrLoss>,
    pub churn_breakdown: Option<ChurnBreakdown>,
}

/// ARR and distinct customers lost among churned, UX-related rows.
///
/// Rows are deduplicated by `Customer` before summing; the first row of each
/// customer supplies the ARR.
pub fn arr_lost_and_customer_count(df: &DataFrame) -> FeedbackResult<ArrLoss> {
    require_columns(df, &[CUSTOMER, ARR, CHURNED, IS_UX_RELATED])?;

    let churned_ux = df
        .clone()
        .lazy()
        .filter(col(CHURNED).eq(lit(true)).and(col(IS_UX_RELATED).eq(lit(true))));
    customer_arr(churned_ux)
}

/// Distinct churned customers, grouped by `is_ux_related`.
pub fn churn_breakdown_by_classification(df: &DataFrame) -> FeedbackResult<ChurnBreakdown> {
    require_columns(df, &[CUSTOMER, CHURNED, IS_UX_RELATED])?;

    let grouped = df
        .clone()
        .lazy()
        .filter(col(CHURNED).eq(lit(true)).and(col(CUSTOMER).is_not_null()))
        .group_by([col(IS_UX_RELATED)])
        .agg([col(CUSTOMER).n_unique().alias(CUSTOMERS)])
        .collect()?;

    let keys = grouped.column(IS_UX_RELATED)?.bool()?;
    let counts = grouped.column(CUSTOMERS)?.cast(&DataType::UInt64)?;
    let counts = counts.u64()?;

    let mut breakdown = ChurnBreakdown::default();
    for (key, count) in keys.into_iter().zip(counts.into_iter()) {
        let count = count.unwrap_or(0) as usize;
        match key {
            Some(true) => breakdown.ux_related = count,
            Some(false) => breakdown.not_ux_related = count,
            None => {}
        }
    }
    Ok(breakdown)
}

/// Ranked vocabulary term counts over one text column of `df`.
pub fn top_terms(
    df: &DataFrame,
    vocabulary: &Vocabulary,
    column: &str,
) -> FeedbackResult<Vec<TermCount>> {
    let corpus = normalized_column(df, column)?;
    Ok(count_terms(&corpus, vocabulary))
}

/// Most common words in one text column of `df`.
pub fn common_words(df: &DataFrame, column: &str, limit: usize) -> FeedbackResult<Vec<TermCount>> {
    let corpus = normalized_column(df, column)?;
    Ok(word_frequencies(&corpus, limit))
}

/// ARR and distinct customers across all UX-related rows, churned or not.
pub fn ux_arr_exposure(df: &DataFrame) -> FeedbackResult<ArrLoss> {
    require_columns(df, &[CUSTOMER, ARR, IS_UX_RELATED])?;
    customer_arr(df.clone().lazy().filter(col(IS_UX_RELATED).eq(lit(true))))
}

/// ARR of the customers whose feedback mentions each vocabulary term.
///
/// Terms nobody mentions are omitted. The list is ordered by ARR, highest
/// first; ties keep vocabulary order.
pub fn arr_by_term(df: &DataFrame, vocabulary: &Vocabulary) -> FeedbackResult<Vec<TermArr>> {
    require_columns(df, &[FEEDBACK, CUSTOMER, ARR])?;
    let texts = normalized_column(df, FEEDBACK)?;

    let mut impacts = Vec::new();
    for term in vocabulary.terms() {
        let mentions: Vec<bool> = texts.iter().map(|text| text.contains(term.as_str())).collect();
        if !mentions.iter().any(|&m| m) {
            continue;
        }

        let mask = BooleanChunked::from_slice("mentions".into(), &mentions);
        let impact = customer_arr(df.filter(&mask)?.lazy())?;
        impacts.push(TermArr {
            term: term.clone(),
            arr: impact.total_arr,
            customers: impact.customer_count,
        });
    }

    impacts.sort_by(|a, b| b.arr.total_cmp(&a.arr));
    Ok(impacts)
}

/// Compute the full report for a classified primary table.
///
/// The schema is checked once up front: either every metric is produced or
/// a `SchemaError` is returned.
pub fn summarize(
    df: &DataFrame,
    vocabularies: &VocabularySet,
    options: &SummaryOptions,
) -> FeedbackResult<AggregateReport> {
    require_columns(df, &[FEEDBACK, ARR, CHURNED, CUSTOMER, IS_UX_RELATED])?;

    let ux_subset = ux_rows(df)?;
    let report = AggregateReport {
        rows: df.height(),
        ux_related_rows: ux_subset.height(),
        arr_lost: arr_lost_and_customer_count(df)?,
        ux_arr_exposure: ux_arr_exposure(df)?,
        churn_breakdown: churn_breakdown_by_classification(df)?,
        top_ux_terms: top_terms(df, &vocabularies.ux, FEEDBACK)?,
        top_ui_component_terms: vocabularies
            .ui_components
            .as_ref()
            .map(|vocab| top_terms(df, vocab, FEEDBACK))
            .transpose()?,
        arr_by_ui_component: vocabularies
            .ui_components
            .as_ref()
            .map(|vocab| arr_by_term(df, vocab))
            .transpose()?,
        arr_by_product_feature: vocabularies
            .product_features
            .as_ref()
            .map(|vocab| arr_by_term(df, vocab))
            .transpose()?,
        common_words: common_words(df, FEEDBACK, options.word_limit)?,
        ux_common_words: common_words(&ux_subset, FEEDBACK, options.word_limit)?,
    };

    info!(
        "Summarized {} rows: {} UX-related, {:.2} ARR lost across {} customers",
        report.rows,
        report.ux_related_rows,
        report.arr_lost.total_arr,
        report.arr_lost.customer_count
    );
    Ok(report)
}

/// Compute what a notes table supports. Only `Feedback` and the UX flag are
/// required.
pub fn summarize_notes(
    df: &DataFrame,
    vocabularies: &VocabularySet,
    options: &SummaryOptions,
) -> FeedbackResult<NotesReport> {
    require_columns(df, &[FEEDBACK, IS_UX_RELATED])?;

    let arr_lost = if has_columns(df, &[CUSTOMER, ARR, CHURNED]) {
        Some(arr_lost_and_customer_count(df)?)
    } else {
        debug!("Notes table lacks revenue columns; skipping ARR lost");
        None
    };
    let churn_breakdown = if has_columns(df, &[CUSTOMER, CHURNED]) {
        Some(churn_breakdown_by_classification(df)?)
    } else {
        debug!("Notes table lacks churn columns; skipping churn breakdown");
        None
    };

    Ok(NotesReport {
        rows: df.height(),
        ux_related_rows: ux_rows(df)?.height(),
        top_ux_terms: top_terms(df, &vocabularies.ux, FEEDBACK)?,
        top_ui_component_terms: vocabularies
            .ui_components
            .as_ref()
            .map(|vocab| top_terms(df, vocab, FEEDBACK))
            .transpose()?,
        common_words: common_words(df, FEEDBACK, options.word_limit)?,
        arr_lost,
        churn_breakdown,
    })
}

/// Keep the first row per customer and total their ARR.
///
/// Rows without a customer id cannot be deduplicated and are skipped.
fn customer_arr(rows: LazyFrame) -> FeedbackResult<ArrLoss> {
    let rows = rows.collect()?;
    let anonymous = rows.column(CUSTOMER)?.null_count();
    if anonymous > 0 {
        warn!("Skipping {} rows without a {} id", anonymous, CUSTOMER);
    }

    let per_customer = rows
        .lazy()
        .filter(col(CUSTOMER).is_not_null())
        .group_by([col(CUSTOMER)])
        .agg([col(ARR).cast(DataType::Float64).first()])
        .collect()?;

    let total_arr = per_customer.column(ARR)?.f64()?.sum().unwrap_or(0.0);
    Ok(ArrLoss {
        total_arr,
        customer_count: per_customer.height(),
    })
}

fn ux_rows(df: &DataFrame) -> FeedbackResult<DataFrame> {
    Ok(df
        .clone()
        .lazy()
        .filter(col(IS_UX_RELATED).eq(lit(true)))
        .collect()?)
}

fn normalized_column(df: &DataFrame, column: &str) -> FeedbackResult<Vec<String>> {
    require_columns(df, &[column])?;
    let text = df.column(column)?.cast(&DataType::String)?;
    Ok(text.str()?.into_iter().map(normalize).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Classifier;
    use crate::data::SOURCE;
    use crate::error::FeedbackError;

    fn classified(df: DataFrame) -> DataFrame {
        Classifier::new(VocabularySet::default().classifying())
            .classify(&df)
            .unwrap()
    }

    fn single_row(churned: bool) -> DataFrame {
        classified(
            df!(
                FEEDBACK => ["The UI is too complex"],
                ARR => [100.0],
                CHURNED => [churned],
                CUSTOMER => ["C1"],
                SOURCE => ["email"]
            )
            .unwrap(),
        )
    }

    fn mixed() -> DataFrame {
        classified(
            df!(
                FEEDBACK => [
                    "Navigation is confusing",
                    "The search is confusing too",
                    "Pricing went up",
                    "Too expensive",
                    "Search results are slow",
                    "Love the reports"
                ],
                ARR => [50.0, 80.0, 200.0, 200.0, 30.0, 10.0],
                CHURNED => [true, true, true, true, false, false],
                CUSTOMER => ["C1", "C1", "C2", "C3", "C4", "C5"],
                SOURCE => ["email", "chat", "email", "survey", "chat", "email"]
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_rows_without_customer_are_not_folded_together() {
        let df = classified(
            df!(
                FEEDBACK => ["Confusing menu", "Cluttered layout", "Confusing layout"],
                ARR => [500.0, 100.0, 40.0],
                CHURNED => [true, true, true],
                CUSTOMER => [None, None, Some("C1")],
                SOURCE => ["email", "email", "chat"]
            )
            .unwrap(),
        );

        let loss = arr_lost_and_customer_count(&df).unwrap();
        assert_eq!(loss.total_arr, 40.0);
        assert_eq!(loss.customer_count, 1);

        let breakdown = churn_breakdown_by_classification(&df).unwrap();
        assert_eq!(breakdown.ux_related, 1);
    }

    #[test]
    fn test_churned_ux_row_counts_once() {
        let loss = arr_lost_and_customer_count(&single_row(true)).unwrap();
        assert_eq!(
            loss,
            ArrLoss {
                total_arr: 100.0,
                customer_count: 1
            }
        );
    }

    #[test]
    fn test_retained_customer_loses_nothing() {
        let loss = arr_lost_and_customer_count(&single_row(false)).unwrap();
        assert_eq!(loss.total_arr, 0.0);
        assert_eq!(loss.customer_count, 0);
    }

    #[test]
    fn test_duplicate_customer_arr_is_not_summed() {
        let loss = arr_lost_and_customer_count(&mixed()).unwrap();
        assert_eq!(loss.customer_count, 1);
        assert_eq!(loss.total_arr, 50.0);
    }

    #[test]
    fn test_missing_arr_is_a_schema_error() {
        let df = classified(
            df!(
                FEEDBACK => ["The UI is too complex"],
                CHURNED => [true],
                CUSTOMER => ["C1"]
            )
            .unwrap(),
        );
        let err = arr_lost_and_customer_count(&df).unwrap_err();
        assert!(matches!(err, FeedbackError::Schema { .. }));
        assert_eq!(err.missing_columns(), Some(&["ARR".to_string()][..]));

        let err = summarize(&df, &VocabularySet::default(), &SummaryOptions::default()).unwrap_err();
        assert_eq!(err.missing_columns(), Some(&["ARR".to_string()][..]));
    }

    #[test]
    fn test_unclassified_table_is_a_schema_error() {
        let df = df!(
            FEEDBACK => ["slow"],
            ARR => [1.0],
            CHURNED => [true],
            CUSTOMER => ["C1"]
        )
        .unwrap();
        let err = churn_breakdown_by_classification(&df).unwrap_err();
        assert_eq!(err.missing_columns(), Some(&[IS_UX_RELATED.to_string()][..]));
    }

    #[test]
    fn test_churn_breakdown_counts_distinct_customers() {
        let breakdown = churn_breakdown_by_classification(&mixed()).unwrap();
        assert_eq!(breakdown.ux_related, 1);
        assert_eq!(breakdown.not_ux_related, 2);
        assert_eq!(breakdown.total(), 3);
    }

    #[test]
    fn test_churn_breakdown_reports_empty_groups() {
        let breakdown = churn_breakdown_by_classification(&single_row(false)).unwrap();
        assert_eq!(breakdown.ux_related, 0);
        assert_eq!(breakdown.not_ux_related, 0);
    }

    #[test]
    fn test_top_terms() {
        let terms = top_terms(&mixed(), &Vocabulary::ui_components(), FEEDBACK).unwrap();
        assert_eq!(
            terms,
            vec![TermCount::new("search", 2), TermCount::new("navigation", 1)]
        );
    }

    #[test]
    fn test_top_terms_requires_column() {
        let err = top_terms(&mixed(), &Vocabulary::ux(), "Notes").unwrap_err();
        assert_eq!(err.missing_columns(), Some(&["Notes".to_string()][..]));
    }

    #[test]
    fn test_ux_arr_exposure_includes_retained_customers() {
        let exposure = ux_arr_exposure(&mixed()).unwrap();
        assert_eq!(exposure.customer_count, 1);
        assert_eq!(exposure.total_arr, 50.0);
    }

    #[test]
    fn test_arr_by_term_deduplicates_customers() {
        let impacts = arr_by_term(&mixed(), &Vocabulary::ui_components()).unwrap();
        assert_eq!(
            impacts,
            vec![
                TermArr {
                    term: "search".to_string(),
                    arr: 110.0,
                    customers: 2
                },
                TermArr {
                    term: "navigation".to_string(),
                    arr: 50.0,
                    customers: 1
                },
            ]
        );
    }

    #[test]
    fn test_summarize() {
        let report = summarize(&mixed(), &VocabularySet::default(), &SummaryOptions::default()).unwrap();
        assert_eq!(report.rows, 6);
        assert_eq!(report.ux_related_rows, 2);
        assert_eq!(report.arr_lost.total_arr, 50.0);
        assert_eq!(report.churn_breakdown.not_ux_related, 2);
        assert_eq!(
            report.top_ux_terms,
            vec![TermCount::new("confusing", 2), TermCount::new("navigation", 1)]
        );
        assert!(report.top_ui_component_terms.is_some());
        assert_eq!(
            report.arr_by_product_feature,
            Some(vec![TermArr {
                term: "reports".to_string(),
                arr: 10.0,
                customers: 1
            }])
        );
        assert_eq!(report.common_words.len(), DEFAULT_WORD_LIMIT);
        assert_eq!(
            &report.ux_common_words[..2],
            &[TermCount::new("is", 2), TermCount::new("confusing", 2)]
        );
    }

    #[test]
    fn test_summarize_without_ui_components() {
        let vocabularies = VocabularySet::default().without_ui_components();
        let report = summarize(&mixed(), &vocabularies, &SummaryOptions::default()).unwrap();
        assert!(report.top_ui_component_terms.is_none());
        assert!(report.arr_by_ui_component.is_none());
    }

    #[test]
    fn test_summarize_notes_degrades_without_revenue_columns() {
        let notes = classified(df!(FEEDBACK => ["The menu layout is cluttered", "Thanks!"]).unwrap());
        let report = summarize_notes(&notes, &VocabularySet::default(), &SummaryOptions::default()).unwrap();
        assert_eq!(report.rows, 2);
        assert_eq!(report.ux_related_rows, 1);
        assert!(report.arr_lost.is_none());
        assert!(report.churn_breakdown.is_none());
        assert_eq!(
            report.top_ui_component_terms,
            Some(vec![TermCount::new("menu", 1)])
        );
    }
}
