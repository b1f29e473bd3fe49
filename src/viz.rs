//! Chart rendering with Plotters and console summaries of aggregate reports

use plotters::prelude::*;
use std::path::{Path, PathBuf};

use crate::aggregate::{AggregateReport, ChurnBreakdown, NotesReport, TermArr};
use crate::matcher::TermCount;

const BAR_COLOR: RGBColor = RGBColor(31, 119, 180);
const CHURN_COLORS: [RGBColor; 2] = [RGBColor(127, 127, 127), RGBColor(214, 39, 40)];

/// Render a horizontal bar chart of ranked term counts, highest at the top
///
/// # Arguments
/// * `terms` - Ranked `(term, count)` pairs
/// * `title` - Chart caption
/// * `output_path` - Path of the SVG file to write
pub fn create_term_chart(terms: &[TermCount], title: &str, output_path: &Path) -> crate::Result<()> {
    let entries: Vec<(String, f64)> = terms
        .iter()
        .map(|tc| (tc.term.clone(), tc.count as f64))
        .collect();
    draw_horizontal_bars(&entries, title, "Mentions", &[BAR_COLOR], output_path)
}

/// Render ARR attributed to each term as a horizontal bar chart
pub fn create_arr_impact_chart(
    impacts: &[TermArr],
    title: &str,
    output_path: &Path,
) -> crate::Result<()> {
    let entries: Vec<(String, f64)> = impacts
        .iter()
        .map(|impact| (impact.term.clone(), impact.arr))
        .collect();
    draw_horizontal_bars(&entries, title, "ARR (USD)", &[BAR_COLOR], output_path)
}

/// Render churned customers split by UX/UI relatedness
pub fn create_churn_breakdown_chart(
    breakdown: &ChurnBreakdown,
    output_path: &Path,
) -> crate::Result<()> {
    let entries = vec![
        ("Not UX/UI-related".to_string(), breakdown.not_ux_related as f64),
        ("UX/UI-related".to_string(), breakdown.ux_related as f64),
    ];
    draw_horizontal_bars(
        &entries,
        "Churned Customers: UX/UI vs. Non-UX/UI",
        "Churned customers",
        &CHURN_COLORS,
        output_path,
    )
}

fn draw_horizontal_bars(
    entries: &[(String, f64)],
    title: &str,
    x_desc: &str,
    colors: &[RGBColor],
    output_path: &Path,
) -> crate::Result<()> {
    if entries.is_empty() {
        anyhow::bail!("Nothing to plot for '{}'", title);
    }

    let n = entries.len();
    let max_value = entries.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max).max(1.0);
    let height = 140 + 32 * n as u32;

    let root = SVGBackend::new(output_path, (800, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(180)
        .build_cartesian_2d(0f64..(max_value * 1.1), (0..n).into_segmented())?;

    // Segment 0 is the bottom row; the first entry belongs at the top
    let label_for = |value: &SegmentValue<usize>| match value {
        SegmentValue::CenterOf(idx) if *idx < n => entries[n - 1 - idx].0.clone(),
        _ => String::new(),
    };

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(n)
        .y_label_formatter(&label_for)
        .x_desc(x_desc)
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart.draw_series(entries.iter().enumerate().map(|(i, (_, value))| {
        let row = n - 1 - i;
        let color = colors[i % colors.len()];
        Rectangle::new(
            [
                (0.0, SegmentValue::Exact(row)),
                (*value, SegmentValue::Exact(row + 1)),
            ],
            color.filled(),
        )
    }))?;

    root.present()?;
    Ok(())
}

/// Write every chart the report supports into `output_dir`
///
/// Empty rankings are skipped. Returns the paths that were written.
pub fn generate_visualization_report(
    report: &AggregateReport,
    notes: Option<&NotesReport>,
    output_dir: &Path,
) -> crate::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)?;
    let mut written = Vec::new();

    let path = output_dir.join("churn_breakdown.svg");
    create_churn_breakdown_chart(&report.churn_breakdown, &path)?;
    written.push(path);

    let term_charts = [
        ("common_words.svg", "Most Common Terms in All Feedback", Some(&report.common_words)),
        (
            "ux_common_words.svg",
            "Top Terms in UX/UI-Related Feedback",
            Some(&report.ux_common_words),
        ),
        ("ux_terms.svg", "UX/UI Vocabulary Mentions", Some(&report.top_ux_terms)),
        (
            "ui_components.svg",
            "UI Elements Mentioned in Feedback",
            report.top_ui_component_terms.as_ref(),
        ),
        (
            "notes_ux_terms.svg",
            "UX/UI Vocabulary Mentions in Notes",
            notes.map(|n| &n.top_ux_terms),
        ),
    ];
    for (file_name, title, terms) in term_charts {
        if let Some(terms) = terms.filter(|t| !t.is_empty()) {
            let path = output_dir.join(file_name);
            create_term_chart(terms, title, &path)?;
            written.push(path);
        }
    }

    let impact_charts = [
        (
            "arr_by_ui_element.svg",
            "ARR Impact by UI Element",
            report.arr_by_ui_component.as_ref(),
        ),
        (
            "arr_by_feature.svg",
            "ARR Impact by Feature",
            report.arr_by_product_feature.as_ref(),
        ),
    ];
    for (file_name, title, impacts) in impact_charts {
        if let Some(impacts) = impacts.filter(|i| !i.is_empty()) {
            let path = output_dir.join(file_name);
            create_arr_impact_chart(impacts, title, &path)?;
            written.push(path);
        }
    }

    Ok(written)
}

/// Print the primary report to the console
pub fn print_report_summary(report: &AggregateReport) {
    println!("\n=== UX/UI Feedback Impact ===");
    println!("Feedback rows: {}", report.rows);
    println!("UX/UI-related rows: {}", report.ux_related_rows);
    println!(
        "ARR lost to churned UX/UI customers: {} ({} customers)",
        format_currency(report.arr_lost.total_arr),
        report.arr_lost.customer_count
    );
    println!(
        "Total ARR from UX/UI-related customers: {} ({} customers)",
        format_currency(report.ux_arr_exposure.total_arr),
        report.ux_arr_exposure.customer_count
    );

    println!("\nChurned customers:");
    println!("  UX/UI-related:     {}", report.churn_breakdown.ux_related);
    println!("  Not UX/UI-related: {}", report.churn_breakdown.not_ux_related);

    print_term_counts("Top UX/UI terms", &report.top_ux_terms);
    if let Some(terms) = &report.top_ui_component_terms {
        print_term_counts("Top UI elements", terms);
    }
    if let Some(impacts) = &report.arr_by_ui_component {
        print_arr_impacts("ARR impact by UI element", impacts);
    }
    if let Some(impacts) = &report.arr_by_product_feature {
        print_arr_impacts("ARR impact by feature", impacts);
    }
    print_term_counts("Most common terms", &report.common_words);
    print_term_counts("Most common terms in UX/UI feedback", &report.ux_common_words);
}

/// Print the notes report to the console
pub fn print_notes_summary(notes: &NotesReport) {
    println!("\n=== Notes ===");
    println!("Notes: {} ({} UX/UI-related)", notes.rows, notes.ux_related_rows);
    if let Some(loss) = &notes.arr_lost {
        println!(
            "ARR lost: {} ({} customers)",
            format_currency(loss.total_arr),
            loss.customer_count
        );
    }
    if let Some(breakdown) = &notes.churn_breakdown {
        println!(
            "Churned customers: {} UX/UI-related, {} not",
            breakdown.ux_related, breakdown.not_ux_related
        );
    }
    print_term_counts("Top UX/UI terms", &notes.top_ux_terms);
    if let Some(terms) = &notes.top_ui_component_terms {
        print_term_counts("Top UI elements", terms);
    }
    print_term_counts("Most common terms", &notes.common_words);
}

fn print_term_counts(heading: &str, terms: &[TermCount]) {
    println!("\n{}:", heading);
    if terms.is_empty() {
        println!("  (none)");
    }
    for tc in terms {
        println!("  {:<24} {:>6}", tc.term, tc.count);
    }
}

fn print_arr_impacts(heading: &str, impacts: &[TermArr]) {
    println!("\n{}:", heading);
    if impacts.is_empty() {
        println!("  (none)");
    }
    for impact in impacts {
        println!(
            "  {:<24} {:>16} ({} customers)",
            impact.term,
            format_currency(impact.arr),
            impact.customers
        );
    }
}

/// Format a dollar amount with thousands separators, e.g. `$1,234.50`
pub fn format_currency(amount: f64) -> String {
    let formatted = format!("{:.2}", amount.abs());
    let (whole, cents) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::new();
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, cents)
}
