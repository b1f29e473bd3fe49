//! FeedbackForge: UX/UI feedback impact CLI
//!
//! This is the main entrypoint that orchestrates table loading, classification,
//! filtering, aggregation, and chart rendering.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use feedbackforge::{
    apply_filters, load_and_prepare_table, load_vocabularies, observed_sources, summarize,
    summarize_notes, viz, AggregateReport, Args, Classifier, FilterSpec, NotesReport,
    SummaryOptions, TableKind, VocabularySet,
};
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::{error, info};

/// Everything `--json` prints
#[derive(Serialize)]
struct ReportEnvelope<'a> {
    generated_at: DateTime<Utc>,
    input: &'a str,
    notes_input: Option<&'a str>,
    report: &'a AggregateReport,
    notes: Option<&'a NotesReport>,
}

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    init_logging(&args.log_level, args.json);

    if args.verbose && !args.json {
        println!("FeedbackForge - UX/UI Feedback Impact Analysis");
        println!("==============================================\n");
    }

    run_pipeline(&args)
}

/// Initialize the tracing subscriber. JSON mode keeps stdout clean.
fn init_logging(level: &str, json_output: bool) {
    use tracing_subscriber::EnvFilter;

    let effective_level = if json_output { "error" } else { level };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Run the full analysis on the primary table and, if given, the notes table
fn run_pipeline(args: &Args) -> Result<()> {
    let start_time = Instant::now();

    let vocabularies = load_vocabulary_set(args)?;
    let filter = args.filter_spec()?;
    let options = args.summary_options();
    let classifier = Classifier::new(vocabularies.classifying()).with_cache();

    // The two tables are independent: a failure in one is reported without
    // hiding the other
    let primary = analyze_primary(args, &classifier, &vocabularies, &filter, &options)
        .with_context(|| format!("Failed to analyze feedback table {}", args.input));

    let notes = match &args.notes {
        Some(path) => match analyze_notes(path, &classifier, &vocabularies, &filter, &options)
            .with_context(|| format!("Failed to analyze notes table {}", path))
        {
            Ok(report) => Some(report),
            Err(e) => {
                error!("{:#}", e);
                eprintln!("Error: {:#}", e);
                None
            }
        },
        None => None,
    };

    let report = match primary {
        Ok(report) => report,
        Err(e) => {
            if let Some(notes) = &notes {
                if !args.json {
                    viz::print_notes_summary(notes);
                }
            }
            return Err(e);
        }
    };

    if args.json {
        let envelope = ReportEnvelope {
            generated_at: Utc::now(),
            input: &args.input,
            notes_input: args.notes.as_deref(),
            report: &report,
            notes: notes.as_ref(),
        };
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    } else {
        viz::print_report_summary(&report);
        if let Some(notes) = &notes {
            viz::print_notes_summary(notes);
        }
    }

    if !args.no_charts {
        let viz_start = Instant::now();
        let written =
            viz::generate_visualization_report(&report, notes.as_ref(), Path::new(&args.output_dir))?;
        info!(
            "Wrote {} charts to {} in {:.2}s",
            written.len(),
            args.output_dir,
            viz_start.elapsed().as_secs_f64()
        );
        if args.verbose && !args.json {
            for path in &written {
                println!("  Chart saved to: {}", path.display());
            }
        }
    }

    if !args.json {
        println!("\n=== Analysis Complete ===");
        println!(
            "Total processing time: {:.2}s",
            start_time.elapsed().as_secs_f64()
        );
    }

    Ok(())
}

fn load_vocabulary_set(args: &Args) -> Result<VocabularySet> {
    let vocabularies = match &args.vocabulary {
        Some(path) => load_vocabularies(path)
            .with_context(|| format!("Failed to load vocabulary file {}", path))?,
        None => VocabularySet::default(),
    };

    Ok(if args.no_ui_components {
        vocabularies.without_ui_components()
    } else {
        vocabularies
    })
}

/// Load, classify, filter and summarize the primary feedback table
fn analyze_primary(
    args: &Args,
    classifier: &Classifier,
    vocabularies: &VocabularySet,
    filter: &FilterSpec,
    options: &SummaryOptions,
) -> Result<AggregateReport> {
    // Step 1: Load and check the table
    let data_start = Instant::now();
    let table = load_and_prepare_table(&args.input, TableKind::Primary)?;
    info!(
        "Loaded {} feedback rows in {:.2}s",
        table.height(),
        data_start.elapsed().as_secs_f64()
    );
    if args.verbose && !args.json {
        println!("Step 1: Loaded {} rows from {}", table.height(), args.input);
        println!("  Sources: {}", observed_sources(&table)?.join(", "));
    }

    // Step 2: Classify
    let classified = classifier.classify(&table)?;

    // Step 3: Filter
    let filtered = apply_filters(&classified, filter)?;
    if args.verbose && !args.json {
        println!(
            "Step 2: Classified and filtered: {} of {} rows kept",
            filtered.height(),
            classified.height()
        );
    }

    // Step 4: Aggregate
    Ok(summarize(&filtered, vocabularies, options)?)
}

/// Load, classify, filter and summarize a notes table
fn analyze_notes(
    path: &str,
    classifier: &Classifier,
    vocabularies: &VocabularySet,
    filter: &FilterSpec,
    options: &SummaryOptions,
) -> Result<NotesReport> {
    let table = load_and_prepare_table(path, TableKind::Notes)?;
    let classified = classifier.classify(&table)?;
    let filtered = apply_filters(&classified, filter)?;
    info!("Notes: {} of {} rows kept", filtered.height(), table.height());
    Ok(summarize_notes(&filtered, vocabularies, options)?)
}
