//! Time log loader.
//!
//! Reads the time-tracking sheet of an `.xlsx` workbook with calamine,
//! locates the configured columns by header text and converts every row
//! into a [`TimeEntry`].

use crate::config::ColumnNames;
use crate::error::{ReportError, ReportResult};
use crate::models::{Label, TimeEntry};
use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use std::path::Path;
use tracing::{debug, info, warn};

/// Entries read from one sheet.
#[derive(Debug, Clone)]
pub struct LoadedSheet {
    /// Sheet the entries came from.
    pub sheet: String,
    /// Header cells in sheet order.
    pub headers: Vec<String>,
    /// Entries in sheet order.
    pub entries: Vec<TimeEntry>,
}

/// Position of each input column inside the header row.
#[derive(Debug, Clone, PartialEq)]
struct ColumnIndex {
    member: usize,
    client: usize,
    week: usize,
    activity: usize,
    comments: Option<usize>,
    time: usize,
}

impl ColumnIndex {
    /// Locate columns by trimmed header text.
    fn locate(sheet: &str, headers: &[String], names: &ColumnNames) -> ReportResult<Self> {
        let find = |name: &str| headers.iter().position(|h| h == name.trim());

        let mut missing = Vec::new();
        let mut required = |name: &String| {
            let idx = find(name);
            if idx.is_none() {
                missing.push(name.clone());
            }
            idx.unwrap_or(0)
        };

        let index = ColumnIndex {
            member: required(&names.member),
            client: required(&names.client),
            week: required(&names.week),
            activity: required(&names.activity),
            time: required(&names.time),
            comments: find(&names.comments),
        };

        if !missing.is_empty() {
            return Err(ReportError::MissingColumns {
                sheet: sheet.to_string(),
                columns: missing,
            });
        }

        if index.comments.is_none() {
            warn!(
                "Column '{}' not found; comments will be left empty",
                names.comments
            );
        }

        Ok(index)
    }
}

/// Load every time entry from `sheet` of the workbook at `path`.
pub fn load_entries(path: &Path, sheet: &str, names: &ColumnNames) -> ReportResult<LoadedSheet> {
    info!("Opening workbook: {}", path.display());

    let mut workbook: Xlsx<_> = open_workbook(path).map_err(|e| ReportError::Open {
        path: path.display().to_string(),
        source: e,
    })?;

    let available = workbook.sheet_names();
    if !available.iter().any(|s| s == sheet) {
        return Err(ReportError::MissingSheet {
            sheet: sheet.to_string(),
            available,
        });
    }

    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| ReportError::Open {
            path: path.display().to_string(),
            source: e,
        })?;

    parse_range(sheet, &range, names)
}

/// Convert a sheet range (header row first) into entries.
pub fn parse_range(sheet: &str, range: &Range<Data>, names: &ColumnNames) -> ReportResult<LoadedSheet> {
    let mut rows = range.rows();

    let headers: Vec<String> = match rows.next() {
        Some(row) => row.iter().map(header_text).collect(),
        None => return Err(ReportError::EmptySheet(sheet.to_string())),
    };
    debug!("Headers: {:?}", headers);

    let columns = ColumnIndex::locate(sheet, &headers, names)?;

    let mut entries = Vec::new();
    let mut skipped = 0usize;

    for row in rows {
        if row.iter().all(is_blank) {
            skipped += 1;
            continue;
        }

        let cell = |idx: usize| row.get(idx).unwrap_or(&Data::Empty);

        entries.push(TimeEntry {
            member: cell_label(cell(columns.member)),
            client: cell_label(cell(columns.client)),
            week: cell_label(cell(columns.week)),
            activity: cell_label(cell(columns.activity)),
            comments: columns.comments.and_then(|idx| cell_text(cell(idx))),
            minutes: cell_number(cell(columns.time)),
        });
    }

    if skipped > 0 {
        debug!("Skipped {} blank rows", skipped);
    }
    info!("Loaded {} entries from sheet '{}'", entries.len(), sheet);

    Ok(LoadedSheet {
        sheet: sheet.to_string(),
        headers,
        entries,
    })
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Categorical value of a cell; blanks and errors are missing.
fn cell_label(cell: &Data) -> Option<Label> {
    match cell {
        Data::String(s) | Data::DurationIso(s) => Label::text(s),
        Data::DateTimeIso(s) => parse_iso_datetime(s).map(Label::Date).or_else(|| Label::text(s)),
        Data::Float(f) => Label::number(*f),
        Data::Int(i) => Label::number(*i as f64),
        Data::DateTime(dt) if dt.is_duration() => Label::number(dt.as_f64()),
        Data::DateTime(dt) => serial_to_datetime(dt.as_f64())
            .map(Label::Date)
            .or_else(|| Label::number(dt.as_f64())),
        Data::Bool(b) => Some(Label::Text(if *b { "TRUE" } else { "FALSE" }.to_string())),
        Data::Error(_) | Data::Empty => None,
    }
}

/// Convert an Excel serial date (1900 date system) to a datetime.
fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }

    // Excel counts a nonexistent 1900-02-29 as serial 60.
    let epoch_day = if serial < 60.0 { 31 } else { 30 };
    let epoch = NaiveDate::from_ymd_opt(1899, 12, epoch_day)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;

    epoch.checked_add_signed(TimeDelta::try_milliseconds(millis)?)
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Free text of a cell.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) if s.trim().is_empty() => None,
        Data::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Numeric value of a cell; anything that does not read as a number is missing.
fn cell_number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) if !f.is_nan() => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rust_xlsxwriter::{Format, Workbook};
    use std::path::PathBuf;

    /// Write a small time log fixture and return its path.
    pub(crate) fn write_fixture(dir: &Path) -> PathBuf {
        let path = dir.join("timesheets.xlsx");
        let mut workbook = Workbook::new();

        let other = workbook.add_worksheet();
        other.set_name("Notes").unwrap();
        other.write_string(0, 0, "ignore me").unwrap();

        let sheet = workbook.add_worksheet();
        sheet.set_name("Aggregate Data").unwrap();
        let headers = ["Source.Name", "Client", "Week", "Activity Name", "Comments", "Time"];
        for (col, header) in headers.iter().enumerate() {
            sheet.write_string(0, col as u16, *header).unwrap();
        }

        let rows: [(&str, &str, f64, &str, &str, Option<f64>); 5] = [
            ("ana.xlsx", "Acme", 2.0, "Design", "wireframes", Some(90.0)),
            ("ben.xlsx", "Globex", 1.0, "Build", "", Some(120.0)),
            ("ana.xlsx", "Acme", 1.0, "Build", "api", Some(30.0)),
            ("ben.xlsx", "Acme", 2.0, "Design", "review", None),
            ("ana.xlsx", "Globex", 2.0, "Meetings", "sync", Some(0.0)),
        ];
        for (i, (member, client, week, activity, comment, minutes)) in rows.iter().enumerate() {
            let r = (i + 1) as u32;
            sheet.write_string(r, 0, *member).unwrap();
            sheet.write_string(r, 1, *client).unwrap();
            sheet.write_number(r, 2, *week).unwrap();
            sheet.write_string(r, 3, *activity).unwrap();
            if !comment.is_empty() {
                sheet.write_string(r, 4, *comment).unwrap();
            }
            match minutes {
                Some(m) => sheet.write_number(r, 5, *m).unwrap(),
                None => sheet.write_string(r, 5, "n/a").unwrap(),
            };
        }

        workbook.save(&path).unwrap();
        path
    }

    #[test]
    fn test_load_fixture() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path());

        let loaded = load_entries(&path, "Aggregate Data", &ColumnNames::default()).unwrap();
        assert_eq!(loaded.entries.len(), 5);
        assert_eq!(loaded.headers[0], "Source.Name");

        let first = &loaded.entries[0];
        assert_eq!(first.member, Some(Label::from("ana.xlsx")));
        assert_eq!(first.week, Some(Label::from(2.0)));
        assert_eq!(first.comments.as_deref(), Some("wireframes"));
        assert_eq!(first.hours(), Some(1.5));

        assert_eq!(loaded.entries[1].comments, None);
        assert_eq!(loaded.entries[3].minutes, None);
        assert_eq!(loaded.entries[4].hours(), Some(0.0));
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_date_formatted_week() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dated.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Aggregate Data").unwrap();
        let headers = ["Source.Name", "Client", "Week", "Activity Name", "Time"];
        for (col, header) in headers.iter().enumerate() {
            sheet.write_string(0, col as u16, *header).unwrap();
        }
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        sheet.write_string(1, 0, "ana.xlsx").unwrap();
        sheet.write_string(1, 1, "Acme").unwrap();
        sheet
            .write_datetime_with_format(1, 2, &date(2024, 1, 1), &date_format)
            .unwrap();
        sheet.write_string(1, 3, "Build").unwrap();
        sheet.write_number(1, 4, 60.0).unwrap();
        workbook.save(&path).unwrap();

        let loaded = load_entries(&path, "Aggregate Data", &ColumnNames::default()).unwrap();
        let week = loaded.entries[0].week.clone().unwrap();
        assert_eq!(week, Label::Date(date(2024, 1, 1)));
        assert_eq!(week.to_string(), "2024-01-01");
    }

    #[test]
    fn test_serial_dates() {
        assert_eq!(serial_to_datetime(45292.0), Some(date(2024, 1, 1)));
        assert_eq!(serial_to_datetime(1.0), Some(date(1900, 1, 1)));
        assert_eq!(serial_to_datetime(61.0), Some(date(1900, 3, 1)));
        assert_eq!(
            serial_to_datetime(45292.5),
            Some(date(2024, 1, 1) + TimeDelta::try_hours(12).unwrap())
        );
        assert_eq!(serial_to_datetime(-1.0), None);
    }

    #[test]
    fn test_iso_cells_become_dates() {
        assert_eq!(
            cell_label(&Data::DateTimeIso("2024-01-08T00:00:00".to_string())),
            Some(Label::Date(date(2024, 1, 8)))
        );
        assert_eq!(
            cell_label(&Data::DateTimeIso("2024-01-08".to_string())),
            Some(Label::Date(date(2024, 1, 8)))
        );
        assert_eq!(
            cell_label(&Data::String("2024-01-08".to_string())),
            Some(Label::from("2024-01-08"))
        );
    }

    #[test]
    fn test_label_cells_keep_spacing() {
        assert_eq!(
            cell_label(&Data::String("Acme ".to_string())),
            Some(Label::from("Acme "))
        );
        assert_eq!(cell_label(&Data::String("  ".to_string())), None);
    }

    #[test]
    fn test_missing_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path());

        let err = load_entries(&path, "Raw", &ColumnNames::default()).unwrap_err();
        match err {
            ReportError::MissingSheet { sheet, available } => {
                assert_eq!(sheet, "Raw");
                assert!(available.contains(&"Aggregate Data".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_columns_are_all_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path());

        let names = ColumnNames {
            time: "Minutes".to_string(),
            week: "Week No".to_string(),
            ..ColumnNames::default()
        };
        let err = load_entries(&path, "Aggregate Data", &names).unwrap_err();
        match err {
            ReportError::MissingColumns { columns, .. } => {
                assert_eq!(columns, vec!["Week No".to_string(), "Minutes".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"not a zip").unwrap();

        let err = load_entries(&path, "Aggregate Data", &ColumnNames::default()).unwrap_err();
        assert!(matches!(err, ReportError::Open { .. }));
    }

    #[test]
    fn test_parse_range_coercion() {
        let mut range = Range::new((0, 0), (3, 5));
        let headers = ["Source.Name", "Client", "Week", "Activity Name", "Comments", "Time"];
        for (col, h) in headers.iter().enumerate() {
            range.set_value((0, col as u32), Data::String(h.to_string()));
        }
        range.set_value((1, 0), Data::String("ana".to_string()));
        range.set_value((1, 1), Data::String("  ".to_string()));
        range.set_value((1, 2), Data::Int(7));
        range.set_value((1, 5), Data::String(" 45 ".to_string()));
        // row 2 stays blank
        range.set_value((3, 0), Data::String("ben".to_string()));
        range.set_value((3, 5), Data::Bool(true));

        let loaded = parse_range("Aggregate Data", &range, &ColumnNames::default()).unwrap();
        assert_eq!(loaded.entries.len(), 2);

        let first = &loaded.entries[0];
        assert_eq!(first.client, None);
        assert_eq!(first.week, Some(Label::from(7.0)));
        assert_eq!(first.minutes, Some(45.0));

        assert_eq!(loaded.entries[1].minutes, None);
    }

    #[test]
    fn test_comments_column_optional() {
        let mut range = Range::new((0, 0), (1, 4));
        let headers = ["Source.Name", "Client", "Week", "Activity Name", "Time"];
        for (col, h) in headers.iter().enumerate() {
            range.set_value((0, col as u32), Data::String(h.to_string()));
        }
        range.set_value((1, 0), Data::String("ana".to_string()));
        range.set_value((1, 4), Data::Float(60.0));

        let loaded = parse_range("Aggregate Data", &range, &ColumnNames::default()).unwrap();
        assert_eq!(loaded.entries[0].comments, None);
        assert_eq!(loaded.entries[0].hours(), Some(1.0));
    }

    #[test]
    fn test_empty_range() {
        let range: Range<Data> = Range::empty();
        let err = parse_range("Aggregate Data", &range, &ColumnNames::default()).unwrap_err();
        assert!(matches!(err, ReportError::EmptySheet(_)));
    }
}
