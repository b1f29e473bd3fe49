//! Composable row filters over a classified feedback table

use polars::prelude::*;
use std::collections::BTreeSet;
use tracing::debug;

use crate::data::{has_column, CHURNED, IS_UX_RELATED, SOURCE};
use crate::error::FeedbackResult;

/// Selection state of one multi-select facet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<T: Ord> {
    /// No predicate on this facet.
    Any,
    /// Keep only rows whose value is in the set. An empty set keeps nothing.
    Only(BTreeSet<T>),
}

impl<T: Ord> Default for Selection<T> {
    fn default() -> Self {
        Selection::Any
    }
}

impl<T: Ord> Selection<T> {
    pub fn only<I: IntoIterator<Item = T>>(values: I) -> Self {
        Selection::Only(values.into_iter().collect())
    }

    pub fn none() -> Self {
        Selection::Only(BTreeSet::new())
    }
}

/// The active predicates for one filtered view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub churn_states: Selection<bool>,
    pub sources: Selection<String>,
    pub ux_only: bool,
}

impl FilterSpec {
    pub fn with_churn_states<I: IntoIterator<Item = bool>>(mut self, states: I) -> Self {
        self.churn_states = Selection::only(states);
        self
    }

    pub fn with_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources = Selection::only(sources.into_iter().map(Into::into));
        self
    }

    pub fn ux_only(mut self, ux_only: bool) -> Self {
        self.ux_only = ux_only;
        self
    }

    /// Combined predicate for the columns `df` actually has, or `None` when
    /// nothing needs filtering.
    fn predicate(&self, df: &DataFrame) -> Option<Expr> {
        let mut predicates: Vec<Expr> = Vec::new();

        if let Selection::Only(states) = &self.churn_states {
            if has_column(df, CHURNED) {
                predicates.push(any_of(
                    states.iter().map(|state| col(CHURNED).eq(lit(*state))),
                ));
            } else {
                debug!("Skipping churn filter: no {} column", CHURNED);
            }
        }

        if let Selection::Only(sources) = &self.sources {
            if has_column(df, SOURCE) {
                predicates.push(any_of(
                    sources.iter().map(|source| col(SOURCE).eq(lit(source.as_str()))),
                ));
            } else {
                debug!("Skipping source filter: no {} column", SOURCE);
            }
        }

        if self.ux_only {
            if has_column(df, IS_UX_RELATED) {
                predicates.push(col(IS_UX_RELATED).eq(lit(true)));
            } else {
                debug!("Skipping UX-only filter: table is not classified");
            }
        }

        predicates.into_iter().reduce(|acc, p| acc.and(p))
    }
}

/// OR together equality checks; an empty selection matches nothing.
fn any_of<I: Iterator<Item = Expr>>(checks: I) -> Expr {
    checks.reduce(|acc, e| acc.or(e)).unwrap_or(lit(false))
}

/// Apply `spec` conjunctively and return the surviving rows as a new table.
///
/// Facets whose column is absent from `df` are skipped. Rows with a null in a
/// filtered column never match.
pub fn apply_filters(df: &DataFrame, spec: &FilterSpec) -> FeedbackResult<DataFrame> {
    let filtered = match spec.predicate(df) {
        Some(predicate) => df.clone().lazy().filter(predicate).collect()?,
        None => df.clone(),
    };
    debug!("Filter kept {} of {} rows", filtered.height(), df.height());
    Ok(filtered)
}

/// Distinct non-null `Source` values, sorted. Empty when the column is absent.
pub fn observed_sources(df: &DataFrame) -> FeedbackResult<Vec<String>> {
    if !has_column(df, SOURCE) {
        return Ok(Vec::new());
    }

    let sources = df.column(SOURCE)?.cast(&DataType::String)?;
    let distinct: BTreeSet<String> = sources
        .str()?
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect();
    Ok(distinct.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{CUSTOMER, FEEDBACK};

    fn table() -> DataFrame {
        df!(
            CUSTOMER => ["C1", "C2", "C3", "C4"],
            FEEDBACK => ["menu", "slow", "ui", "fine"],
            CHURNED => [true, false, true, false],
            SOURCE => ["email", "chat", "chat", "survey"],
            IS_UX_RELATED => [true, false, true, false]
        )
        .unwrap()
    }

    fn customers(df: &DataFrame) -> Vec<String> {
        df.column(CUSTOMER)
            .unwrap()
            .str()
            .unwrap()
            .into_no_null_iter()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_default_spec_keeps_everything() {
        let df = apply_filters(&table(), &FilterSpec::default()).unwrap();
        assert_eq!(df.height(), 4);
    }

    #[test]
    fn test_facets_combine_conjunctively() {
        let spec = FilterSpec::default()
            .with_churn_states([true])
            .with_sources(["chat", "survey"]);
        let df = apply_filters(&table(), &spec).unwrap();
        assert_eq!(customers(&df), vec!["C3"]);
    }

    #[test]
    fn test_ux_only() {
        let spec = FilterSpec::default().ux_only(true);
        let df = apply_filters(&table(), &spec).unwrap();
        assert_eq!(customers(&df), vec!["C1", "C3"]);
    }

    #[test]
    fn test_empty_selection_matches_nothing() {
        let spec = FilterSpec {
            churn_states: Selection::none(),
            ..FilterSpec::default()
        };
        assert_eq!(apply_filters(&table(), &spec).unwrap().height(), 0);

        let spec = FilterSpec::default().with_sources(Vec::<String>::new());
        assert_eq!(apply_filters(&table(), &spec).unwrap().height(), 0);
    }

    #[test]
    fn test_absent_columns_are_skipped() {
        let notes = df!(FEEDBACK => ["menu is hidden", "ok"]).unwrap();
        let spec = FilterSpec::default()
            .with_churn_states([true])
            .with_sources(["email"])
            .ux_only(true);
        let df = apply_filters(&notes, &spec).unwrap();
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let input = table();
        let spec = FilterSpec::default().with_churn_states([false]);
        let df = apply_filters(&input, &spec).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(input.height(), 4);
    }

    #[test]
    fn test_observed_sources() {
        assert_eq!(
            observed_sources(&table()).unwrap(),
            vec!["chat", "email", "survey"]
        );
        let notes = df!(FEEDBACK => ["x"]).unwrap();
        assert!(observed_sources(&notes).unwrap().is_empty());
    }
}
