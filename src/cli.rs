//! Command-line interface definitions and argument parsing

use clap::Parser;

use crate::aggregate::{SummaryOptions, DEFAULT_WORD_LIMIT};
use crate::filter::{FilterSpec, Selection};

/// UX/UI feedback impact analysis: classify feedback and measure churned ARR
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the primary feedback CSV (Feedback, ARR, Churned, Customer, Source)
    #[arg(short, long, default_value = "feedback.csv")]
    pub input: String,

    /// Optional notes CSV; only a Feedback column is required
    #[arg(short, long)]
    pub notes: Option<String>,

    /// Churn states to keep, comma-separated: "true", "false" or both.
    /// An empty value keeps nothing
    #[arg(long)]
    pub churned: Option<String>,

    /// Sources to keep; repeat the flag or separate with commas
    #[arg(short, long, value_delimiter = ',')]
    pub source: Vec<String>,

    /// Keep only UX/UI-related feedback
    #[arg(long)]
    pub ux_only: bool,

    /// TOML file overriding the built-in vocabularies
    #[arg(long, env = "FEEDBACKFORGE_VOCABULARY")]
    pub vocabulary: Option<String>,

    /// Skip the UI component vocabulary
    #[arg(long)]
    pub no_ui_components: bool,

    /// Number of entries in the most-common-words lists
    #[arg(short, long, default_value_t = DEFAULT_WORD_LIMIT)]
    pub top: usize,

    /// Directory for the SVG charts
    #[arg(short, long, default_value = "feedback_report")]
    pub output_dir: String,

    /// Do not render charts
    #[arg(long)]
    pub no_charts: bool,

    /// Print the report as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Log level used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Build the filter selection from the churn, source and UX-only flags
    pub fn filter_spec(&self) -> crate::Result<FilterSpec> {
        let churn_states = match &self.churned {
            Some(raw) => Selection::only(parse_churn_states(raw)?),
            None => Selection::Any,
        };

        let sources = if self.source.is_empty() {
            Selection::Any
        } else {
            Selection::only(
                self.source
                    .iter()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty()),
            )
        };

        Ok(FilterSpec {
            churn_states,
            sources,
            ux_only: self.ux_only,
        })
    }

    pub fn summary_options(&self) -> SummaryOptions {
        SummaryOptions {
            word_limit: self.top,
        }
    }
}

/// Parse "true,false"-style churn states. Blank input selects nothing.
fn parse_churn_states(raw: &str) -> crate::Result<Vec<bool>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| match part.to_lowercase().as_str() {
            "true" | "yes" | "churned" => Ok(true),
            "false" | "no" | "retained" => Ok(false),
            _ => Err(anyhow::anyhow!("Invalid churn state: {}", part)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> Args {
        Args::parse_from(["feedbackforge", "--input", "test.csv"])
    }

    #[test]
    fn test_default_filter_spec() {
        let spec = args().filter_spec().unwrap();
        assert_eq!(spec, FilterSpec::default());
        assert_eq!(args().summary_options().word_limit, DEFAULT_WORD_LIMIT);
    }

    #[test]
    fn test_filter_spec_from_flags() {
        let args = Args::parse_from([
            "feedbackforge",
            "--churned",
            "true",
            "--source",
            "email,chat",
            "--source",
            "survey",
            "--ux-only",
        ]);
        let spec = args.filter_spec().unwrap();
        assert_eq!(
            spec,
            FilterSpec::default()
                .with_churn_states([true])
                .with_sources(["chat", "email", "survey"])
                .ux_only(true)
        );
    }

    #[test]
    fn test_parse_churn_states() {
        let mut args = args();
        args.churned = Some("True, false".to_string());
        assert_eq!(
            args.filter_spec().unwrap().churn_states,
            Selection::only([true, false])
        );

        args.churned = Some(String::new());
        assert_eq!(args.filter_spec().unwrap().churn_states, Selection::none());

        args.churned = Some("maybe".to_string());
        assert!(args.filter_spec().is_err());
    }
}
