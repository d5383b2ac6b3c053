//! Data models for the pivot reporter.
//!
//! This module contains the core data structures used throughout
//! the application for representing time entries, aggregates, and reports.

use chrono::{DateTime, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Minutes in one hour; the only unit conversion the reporter applies.
pub const MINUTES_PER_HOUR: f64 = 60.0;

/// A categorical cell value (client, week, activity or member).
///
/// Spreadsheet cells may hold numbers (week numbers, numeric client codes),
/// dates (week-commencing cells) or text. Numbers sort first, then dates,
/// then text; each kind in its natural order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Number(f64),
    Date(NaiveDateTime),
    Text(String),
}

impl Label {
    /// Build a text label, treating blank strings as missing.
    ///
    /// Non-blank text is kept verbatim, so `"Acme "` and `"Acme"` are
    /// distinct labels.
    pub fn text(s: &str) -> Option<Self> {
        if s.trim().is_empty() {
            None
        } else {
            Some(Label::Text(s.to_string()))
        }
    }

    /// Build a numeric label, treating NaN as missing.
    pub fn number(n: f64) -> Option<Self> {
        if n.is_nan() {
            None
        } else {
            Some(Label::Number(n))
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Label::Number(_) => 0,
            Label::Date(_) => 1,
            Label::Text(_) => 2,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Label::Number(n) => write!(f, "{}", n),
            Label::Date(dt) if dt.time() == NaiveTime::MIN => write!(f, "{}", dt.format("%Y-%m-%d")),
            Label::Date(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            Label::Text(s) => write!(f, "{}", s),
        }
    }
}

impl Ord for Label {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Label::Number(a), Label::Number(b)) => a.total_cmp(b),
            (Label::Date(a), Label::Date(b)) => a.cmp(b),
            (Label::Text(a), Label::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Label {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Label {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Label {}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Label::Text(s.to_string())
    }
}

impl From<NaiveDateTime> for Label {
    fn from(dt: NaiveDateTime) -> Self {
        Label::Date(dt)
    }
}

impl From<f64> for Label {
    fn from(n: f64) -> Self {
        Label::Number(n)
    }
}

/// Categorical dimension an aggregate can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Client,
    Activity,
    Week,
    Member,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Client => write!(f, "Client"),
            Dimension::Activity => write!(f, "Activity"),
            Dimension::Week => write!(f, "Week"),
            Dimension::Member => write!(f, "Member"),
        }
    }
}

impl Dimension {
    /// Title of the Summary block for this dimension.
    pub fn totals_title(&self) -> String {
        format!("{} Totals", self)
    }
}

/// One row of the time log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    /// Team member the entry was logged by (the source file name).
    pub member: Option<Label>,
    /// Client the time was spent on.
    pub client: Option<Label>,
    /// Week identifier.
    pub week: Option<Label>,
    /// Activity name.
    pub activity: Option<Label>,
    /// Free-text comment.
    pub comments: Option<String>,
    /// Logged time in minutes; `None` when the cell was not numeric.
    pub minutes: Option<f64>,
}

impl TimeEntry {
    /// Logged time converted to hours.
    pub fn hours(&self) -> Option<f64> {
        self.minutes.map(|m| m / MINUTES_PER_HOUR)
    }

    /// The label this entry carries for a dimension.
    pub fn label(&self, dimension: Dimension) -> Option<&Label> {
        match dimension {
            Dimension::Client => self.client.as_ref(),
            Dimension::Activity => self.activity.as_ref(),
            Dimension::Week => self.week.as_ref(),
            Dimension::Member => self.member.as_ref(),
        }
    }
}

/// One row of a single-dimension aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotRow {
    pub label: Label,
    pub hours: f64,
}

/// Sum of hours grouped by one dimension, sorted by label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotTable {
    pub dimension: Dimension,
    pub rows: Vec<PivotRow>,
}

impl PivotTable {
    /// Block title, e.g. "Client Totals".
    pub fn title(&self) -> String {
        self.dimension.totals_title()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Sum of hours grouped by two dimensions, with margins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossTab {
    pub rows: Dimension,
    pub columns: Dimension,
    pub row_labels: Vec<Label>,
    pub column_labels: Vec<Label>,
    /// `cells[r][c]` is `None` when no entry falls into that pair.
    pub cells: Vec<Vec<Option<f64>>>,
    pub row_totals: Vec<f64>,
    pub column_totals: Vec<f64>,
    pub grand_total: f64,
}

impl CrossTab {
    /// Sheet title, e.g. "Member x Client".
    pub fn title(&self) -> String {
        format!("{} x {}", self.rows, self.columns)
    }
}

/// A label with its hour total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopLabel {
    pub label: Label,
    pub hours: f64,
}

/// Headline figures about a time log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    pub top_client: Option<TopLabel>,
    pub top_activity: Option<TopLabel>,
    pub top_member: Option<TopLabel>,
    pub busiest_week: Option<TopLabel>,
    /// Entries whose hours are exactly zero.
    pub zero_hour_entries: usize,
    /// Entries whose time cell could not be read as a number.
    pub unparsed_time_entries: usize,
    pub team_members: usize,
    pub total_entries: usize,
    pub total_hours: f64,
}

/// Metadata about a generated report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Path of the input workbook.
    pub source_file: String,
    /// Sheet the entries were read from.
    pub sheet: String,
    /// Date and time of the run.
    pub generated_at: DateTime<Utc>,
    /// Number of entries loaded.
    pub entries: usize,
    /// Number of distinct team members.
    pub team_members: usize,
    /// Output workbook, if one was written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
    /// Duration of the run in seconds.
    pub duration_seconds: f64,
}

/// Everything printed by `--insights`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightsReport {
    pub metadata: ReportMetadata,
    pub insights: Insights,
    pub totals: Vec<PivotTable>,
}
