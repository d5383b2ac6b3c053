//! Console report generation.
//!
//! This module renders the insights printout (Markdown or JSON) and the
//! raw data preview.

use crate::config::ColumnNames;
use crate::models::{InsightsReport, Insights, PivotTable, ReportMetadata, TimeEntry, TopLabel};
use anyhow::Result;

/// Generate the complete Markdown insights report.
pub fn generate_markdown_insights(report: &InsightsReport) -> String {
    let mut output = String::new();

    output.push_str("# Pivot Report Insights\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_key_insights_section(&report.insights));

    for table in &report.totals {
        output.push_str(&generate_totals_section(table));
    }

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** {}\n", metadata.source_file));
    section.push_str(&format!("- **Sheet:** {}\n", metadata.sheet));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Entries:** {}\n", metadata.entries));
    section.push_str(&format!("- **Team Members:** {}\n", metadata.team_members));
    if let Some(ref output) = metadata.output_file {
        section.push_str(&format!("- **Workbook:** {}\n", output));
    }
    section.push('\n');

    section
}

fn describe(top: &Option<TopLabel>) -> String {
    match top {
        Some(top) => format!("{} ({:.2} h)", top.label, top.hours),
        None => "n/a".to_string(),
    }
}

/// Generate the key insights bullets.
fn generate_key_insights_section(insights: &Insights) -> String {
    let mut section = String::new();

    section.push_str("## Key Insights\n\n");
    section.push_str(&format!(
        "- 🥇 **Top client by hours:** {}\n",
        describe(&insights.top_client)
    ));
    section.push_str(&format!(
        "- 🛠️ **Top activity by hours:** {}\n",
        describe(&insights.top_activity)
    ));
    section.push_str(&format!(
        "- 👤 **Top team member by hours:** {}\n",
        describe(&insights.top_member)
    ));
    section.push_str(&format!(
        "- 📅 **Week with most logged hours:** {}\n",
        describe(&insights.busiest_week)
    ));
    section.push_str(&format!(
        "- ⚠️ **Entries with 0 hours logged:** {}\n",
        insights.zero_hour_entries
    ));
    if insights.unparsed_time_entries > 0 {
        section.push_str(&format!(
            "- ❓ **Entries with unreadable time:** {}\n",
            insights.unparsed_time_entries
        ));
    }
    section.push_str(&format!(
        "- ⏱️ **Total hours:** {:.2}\n\n",
        insights.total_hours
    ));

    section
}

/// Generate a totals table for one dimension.
fn generate_totals_section(table: &PivotTable) -> String {
    if table.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str(&format!("### {}\n\n", table.title()));
    section.push_str("| Row Labels | Sum of Hours |\n");
    section.push_str("|:---|---:|\n");
    for row in &table.rows {
        section.push_str(&format!("| {} | {:.2} |\n", row.label, row.hours));
    }
    section.push('\n');

    section
}

/// Generate a JSON insights report.
pub fn generate_json_insights(report: &InsightsReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Render the first `rows` entries as a plain text table headed by the
/// configured column names.
pub fn generate_preview(entries: &[TimeEntry], columns: &ColumnNames, rows: usize) -> String {
    const MAX_WIDTH: usize = 30;

    let headers = [
        columns.member.as_str(),
        columns.client.as_str(),
        columns.week.as_str(),
        columns.activity.as_str(),
        columns.comments.as_str(),
        columns.time.as_str(),
        "Hours",
    ];

    let body: Vec<[String; 7]> = entries
        .iter()
        .take(rows)
        .map(|e| {
            [
                opt(&e.member),
                opt(&e.client),
                opt(&e.week),
                opt(&e.activity),
                e.comments.clone().unwrap_or_default(),
                e.minutes.map(|m| m.to_string()).unwrap_or_default(),
                e.hours().map(|h| format!("{:.2}", h)).unwrap_or_default(),
            ]
        })
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &body {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count().min(MAX_WIDTH));
        }
    }

    let mut output = String::new();
    output.push_str(&render_row(&headers, &widths, MAX_WIDTH));
    output.push('\n');
    output.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    output.push('\n');
    for row in &body {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        output.push_str(&render_row(&cells, &widths, MAX_WIDTH));
        output.push('\n');
    }

    output
}

fn render_row(cells: &[&str], widths: &[usize], max_width: usize) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let clipped: String = cell.chars().take(max_width).collect();
            format!("{:<width$}", clipped, width = *width)
        })
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}

fn opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}
