//! Hour aggregation and statistics.
//!
//! This module groups time entries along categorical dimensions and
//! computes the summary figures shown in the report.

use crate::models::{
    CrossTab, Dimension, Insights, Label, PivotRow, PivotTable, TimeEntry, TopLabel,
};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// Round a figure to `decimals` places, ties to even.
pub fn round_hours(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round_ties_even() / factor
}

/// Sum of all known hours.
pub fn grand_total(entries: &[TimeEntry]) -> f64 {
    entries.iter().filter_map(TimeEntry::hours).sum()
}

/// Sum hours per label of `dimension`.
///
/// Entries without a label are left out; entries without hours count as zero.
pub fn group_sum(entries: &[TimeEntry], dimension: Dimension) -> PivotTable {
    let mut sums: BTreeMap<&Label, f64> = BTreeMap::new();

    for entry in entries {
        if let Some(label) = entry.label(dimension) {
            *sums.entry(label).or_default() += entry.hours().unwrap_or(0.0);
        }
    }

    PivotTable {
        dimension,
        rows: sums
            .into_iter()
            .map(|(label, hours)| PivotRow {
                label: label.clone(),
                hours,
            })
            .collect(),
    }
}

/// Copy of `table` with every figure rounded.
pub fn rounded(table: &PivotTable, decimals: u32) -> PivotTable {
    PivotTable {
        dimension: table.dimension,
        rows: table
            .rows
            .iter()
            .map(|r| PivotRow {
                label: r.label.clone(),
                hours: round_hours(r.hours, decimals),
            })
            .collect(),
    }
}

/// Sum hours by two dimensions, with row, column and grand totals.
pub fn cross_tab(entries: &[TimeEntry], rows: Dimension, columns: Dimension) -> CrossTab {
    let mut row_set: BTreeSet<&Label> = BTreeSet::new();
    let mut col_set: BTreeSet<&Label> = BTreeSet::new();
    let mut sums: BTreeMap<(&Label, &Label), f64> = BTreeMap::new();

    for entry in entries {
        let (Some(r), Some(c)) = (entry.label(rows), entry.label(columns)) else {
            continue;
        };
        row_set.insert(r);
        col_set.insert(c);
        *sums.entry((r, c)).or_default() += entry.hours().unwrap_or(0.0);
    }

    let row_labels: Vec<&Label> = row_set.into_iter().collect();
    let column_labels: Vec<&Label> = col_set.into_iter().collect();

    let cells: Vec<Vec<Option<f64>>> = row_labels
        .iter()
        .map(|r| {
            column_labels
                .iter()
                .map(|c| sums.get(&(*r, *c)).copied())
                .collect()
        })
        .collect();

    let row_totals: Vec<f64> = cells
        .iter()
        .map(|row| row.iter().flatten().sum())
        .collect();
    let column_totals: Vec<f64> = (0..column_labels.len())
        .map(|c| cells.iter().filter_map(|row| row[c]).sum())
        .collect();
    let grand_total = row_totals.iter().sum();

    CrossTab {
        rows,
        columns,
        row_labels: row_labels.into_iter().cloned().collect(),
        column_labels: column_labels.into_iter().cloned().collect(),
        cells,
        row_totals,
        column_totals,
        grand_total,
    }
}

/// Distinct team members in order of first appearance.
pub fn team_members(entries: &[TimeEntry]) -> Vec<Label> {
    let mut seen: BTreeSet<&Label> = BTreeSet::new();
    let mut members = Vec::new();

    for member in entries.iter().filter_map(|e| e.member.as_ref()) {
        if seen.insert(member) {
            members.push(member.clone());
        }
    }

    members
}

/// Entries logged by `member`, sorted by client then week.
///
/// The sort is stable and places missing values last.
pub fn member_details<'a>(entries: &'a [TimeEntry], member: &Label) -> Vec<&'a TimeEntry> {
    let mut rows: Vec<&TimeEntry> = entries
        .iter()
        .filter(|e| e.member.as_ref() == Some(member))
        .collect();

    rows.sort_by(|a, b| {
        missing_last(a.client.as_ref(), b.client.as_ref())
            .then_with(|| missing_last(a.week.as_ref(), b.week.as_ref()))
    });

    rows
}

fn missing_last(a: Option<&Label>, b: Option<&Label>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Label with the most hours; ties go to the first label in sorted order.
pub fn top_label(table: &PivotTable) -> Option<TopLabel> {
    let mut best: Option<&PivotRow> = None;

    for row in &table.rows {
        match best {
            Some(current) if row.hours <= current.hours => {}
            _ => best = Some(row),
        }
    }

    best.map(|row| TopLabel {
        label: row.label.clone(),
        hours: row.hours,
    })
}

/// Compute the headline figures of a time log.
pub fn insights(entries: &[TimeEntry]) -> Insights {
    Insights {
        top_client: top_label(&group_sum(entries, Dimension::Client)),
        top_activity: top_label(&group_sum(entries, Dimension::Activity)),
        top_member: top_label(&group_sum(entries, Dimension::Member)),
        busiest_week: top_label(&group_sum(entries, Dimension::Week)),
        zero_hour_entries: entries.iter().filter(|e| e.hours() == Some(0.0)).count(),
        unparsed_time_entries: entries.iter().filter(|e| e.minutes.is_none()).count(),
        team_members: team_members(entries).len(),
        total_entries: entries.len(),
        total_hours: grand_total(entries),
    }
}
