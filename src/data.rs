//! Feedback table loading, schema checks and column coercion using Polars

use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{FeedbackError, FeedbackResult};

pub const FEEDBACK: &str = "Feedback";
pub const ARR: &str = "ARR";
pub const CHURNED: &str = "Churned";
pub const CUSTOMER: &str = "Customer";
pub const SOURCE: &str = "Source";

/// Derived column set by the UX vocabulary
pub const IS_UX_RELATED: &str = "is_ux_related";
/// Derived column set by the UI component vocabulary
pub const IS_UI_COMPONENT_RELATED: &str = "is_ui_component_related";

/// Which shape of table is being loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// Feedback with revenue context: every column is required.
    Primary,
    /// Free-form notes: only `Feedback` is required.
    Notes,
}

impl TableKind {
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            TableKind::Primary => &[FEEDBACK, ARR, CHURNED, CUSTOMER, SOURCE],
            TableKind::Notes => &[FEEDBACK],
        }
    }
}

/// Load a CSV file and prepare it for classification
///
/// # Arguments
/// * `file_path` - Path to the CSV file
/// * `kind` - Which schema the table must satisfy
///
/// # Returns
/// * A `DataFrame` with coerced column types, or a `SchemaError` naming the
///   missing columns
pub fn load_and_prepare_table(
    file_path: impl AsRef<Path>,
    kind: TableKind,
) -> FeedbackResult<DataFrame> {
    let file_path = file_path.as_ref();
    info!("Loading {:?} table from {}", kind, file_path.display());
    let bytes = std::fs::read(file_path)?;
    read_and_prepare_table(bytes, kind)
}

/// Parse CSV content already held in memory and prepare it for classification
pub fn read_and_prepare_table(bytes: Vec<u8>, kind: TableKind) -> FeedbackResult<DataFrame> {
    let df = parse_csv(bytes)?;
    prepare_table(df, kind)
}

/// Check the schema gate for `kind` and coerce the known columns to the
/// types the rest of the pipeline expects.
pub fn prepare_table(mut df: DataFrame, kind: TableKind) -> FeedbackResult<DataFrame> {
    require_columns(&df, kind.required_columns())?;

    for name in [FEEDBACK, CUSTOMER, SOURCE] {
        if has_column(&df, name) {
            let as_text = df.column(name)?.cast(&DataType::String)?;
            df.with_column(as_text)?;
        }
    }

    if has_column(&df, CHURNED) {
        let churned = coerce_flags(df.column(CHURNED)?)?;
        df.with_column(churned)?;
    }

    if has_column(&df, ARR) {
        let arr = coerce_amounts(df.column(ARR)?)?;
        df.with_column(arr)?;
    }

    debug!("Prepared table: {:?}", df.shape());
    Ok(df)
}

/// Fail with a `SchemaError` listing every column in `required` that `df`
/// lacks.
pub fn require_columns(df: &DataFrame, required: &[&str]) -> FeedbackResult<()> {
    let missing: Vec<String> = required
        .iter()
        .filter(|name| !has_column(df, name))
        .map(|name| name.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(FeedbackError::Schema { missing })
    }
}

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_index(name).is_some()
}

pub fn has_columns(df: &DataFrame, names: &[&str]) -> bool {
    names.iter().all(|name| has_column(df, name))
}

fn parse_csv(bytes: Vec<u8>) -> FeedbackResult<DataFrame> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(FeedbackError::MalformedInput("file is empty".to_string()));
    }

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
        .map_err(|e| FeedbackError::MalformedInput(e.to_string()))
}

/// Coerce a churn-like column to Boolean. Unrecognized values become null.
fn coerce_flags(column: &Column) -> FeedbackResult<Series> {
    if column.dtype() == &DataType::Boolean {
        return Ok(column.as_materialized_series().clone());
    }

    let text = column.cast(&DataType::String)?;
    let flags: Vec<Option<bool>> = text.str()?.into_iter().map(|v| v.and_then(parse_flag)).collect();
    Ok(Series::new(column.name().clone(), flags))
}

/// Coerce a revenue column to Float64, tolerating currency formatting.
///
/// Negative and unparsable amounts become null.
fn coerce_amounts(column: &Column) -> FeedbackResult<Series> {
    let amounts: Vec<Option<f64>> = if column.dtype() == &DataType::String {
        column
            .str()?
            .into_iter()
            .map(|v| v.and_then(parse_amount))
            .collect()
    } else {
        column
            .cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            .map(|v| v.and_then(valid_amount))
            .collect()
    };

    let rejected = amounts
        .iter()
        .filter(|v| v.is_none())
        .count()
        .saturating_sub(column.null_count());
    if rejected > 0 {
        warn!("Nulled {} invalid or negative {} values", rejected, column.name());
    }
    Ok(Series::new(column.name().clone(), amounts))
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "0" => Some(false),
        other => other.parse::<f64>().ok().map(|v| v != 0.0),
    }
}

fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '$' && *c != ',')
        .collect();
    cleaned.parse::<f64>().ok().and_then(valid_amount)
}

fn valid_amount(amount: f64) -> Option<f64> {
    (amount.is_finite() && amount >= 0.0).then_some(amount)
}
