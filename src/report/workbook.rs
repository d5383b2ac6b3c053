//! Excel workbook generation.
//!
//! Writes the Summary sheet (client, activity and week totals plus a grand
//! total), an optional Charts sheet, one sheet per cross-tab and one detail
//! sheet per team member.

use crate::analysis::{cross_tab, grand_total, group_sum, member_details, round_hours, rounded, team_members};
use crate::config::{ColumnNames, Config};
use crate::error::ReportResult;
use crate::models::{CrossTab, Dimension, Label, PivotTable, TimeEntry};
use rust_xlsxwriter::{Chart, ChartType, Format, Workbook, Worksheet};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

const SUMMARY_SHEET: &str = "Summary";
const CHARTS_SHEET: &str = "Charts";
const DETAILS_SUFFIX: &str = "_Details";
const GRAND_TOTAL: &str = "Grand Total";
const DATE_FORMAT: &str = "yyyy-mm-dd";
/// Excel's limit on sheet name length.
const MAX_SHEET_NAME: usize = 31;

/// Dimensions of the Summary blocks, in sheet order.
const SUMMARY_DIMENSIONS: [Dimension; 3] = [Dimension::Client, Dimension::Activity, Dimension::Week];

/// Settings for workbook generation.
#[derive(Debug, Clone)]
pub struct WorkbookOptions {
    pub decimals: u32,
    pub member_name_len: usize,
    pub highlight: u32,
    pub include_charts: bool,
    pub crosstabs: Vec<(Dimension, Dimension)>,
    pub columns: ColumnNames,
}

impl Default for WorkbookOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for WorkbookOptions {
    fn from(config: &Config) -> Self {
        Self {
            decimals: config.report.decimals,
            member_name_len: config.report.member_name_len,
            highlight: config.report.highlight_rgb(),
            include_charts: config.report.include_charts,
            crosstabs: config.report.crosstabs.clone(),
            columns: config.input.columns.clone(),
        }
    }
}

/// Result of writing a workbook.
#[derive(Debug, Clone)]
pub struct WrittenReport {
    /// Sheet names in workbook order.
    pub sheets: Vec<String>,
}

/// Rows a Summary block occupies, for chart references.
#[derive(Debug, Clone, Copy, PartialEq)]
struct BlockRange {
    dimension: Dimension,
    first_row: u32,
    last_row: u32,
}

/// Reusable cell formats.
struct Formats {
    title: Format,
    header: Format,
    hours: Format,
    total_label: Format,
    total_hours: Format,
    date: Format,
    header_date: Format,
}

impl Formats {
    fn new(highlight: u32) -> Self {
        Self {
            title: Format::new().set_bold().set_background_color(highlight),
            header: Format::new().set_bold(),
            hours: Format::new().set_num_format("0.00"),
            total_label: Format::new().set_bold().set_background_color(highlight),
            total_hours: Format::new()
                .set_bold()
                .set_background_color(highlight)
                .set_num_format("0.00"),
            date: Format::new().set_num_format(DATE_FORMAT),
            header_date: Format::new().set_bold().set_num_format(DATE_FORMAT),
        }
    }
}

/// Hands out unique, Excel-safe sheet names.
#[derive(Debug, Default)]
pub struct SheetNamer {
    used: HashSet<String>,
}

impl SheetNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `base` (sanitized), adding `_2`, `_3`, ... on collision.
    ///
    /// Excel compares sheet names case-insensitively.
    pub fn claim(&mut self, base: &str) -> String {
        let base = sanitize_sheet_name(base);
        let mut candidate = base.clone();
        let mut n = 2;

        while self.used.contains(&candidate.to_lowercase()) {
            let suffix = format!("_{}", n);
            let keep = MAX_SHEET_NAME - suffix.chars().count();
            candidate = format!("{}{}", truncate_chars(&base, keep), suffix);
            n += 1;
        }

        self.used.insert(candidate.to_lowercase());
        candidate
    }

    /// Detail sheet name for a member: first `len` characters plus `_Details`.
    pub fn claim_member(&mut self, member: &Label, len: usize) -> String {
        let name = member.to_string();
        let prefix = truncate_chars(&name, len.min(MAX_SHEET_NAME - DETAILS_SUFFIX.len()));
        self.claim(&format!("{}{}", prefix, DETAILS_SUFFIX))
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Replace characters Excel rejects in sheet names and enforce the length limit.
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            c => c,
        })
        .collect();

    let mut cleaned = truncate_chars(&cleaned, MAX_SHEET_NAME);
    if cleaned.starts_with('\'') {
        cleaned.replace_range(..1, "_");
    }
    if cleaned.ends_with('\'') {
        cleaned.pop();
        cleaned.push('_');
    }
    if cleaned.trim().is_empty() {
        cleaned = "Sheet".to_string();
    }
    cleaned
}

/// Builds the pivot report workbook.
pub struct ReportWriter {
    options: WorkbookOptions,
    formats: Formats,
}

impl ReportWriter {
    pub fn new(options: WorkbookOptions) -> Self {
        let formats = Formats::new(options.highlight);
        Self { options, formats }
    }

    /// Build the workbook and save it to `path`.
    pub fn write(&self, entries: &[TimeEntry], path: &Path) -> ReportResult<WrittenReport> {
        let (mut workbook, sheets) = self.build(entries)?;
        workbook.save(path)?;
        info!("Saved workbook with {} sheets to {}", sheets.len(), path.display());
        Ok(WrittenReport { sheets })
    }

    /// Build the workbook in memory.
    pub fn build(&self, entries: &[TimeEntry]) -> ReportResult<(Workbook, Vec<String>)> {
        let mut workbook = Workbook::new();
        let mut namer = SheetNamer::new();
        let mut sheets = Vec::new();

        let summary_name = namer.claim(SUMMARY_SHEET);
        let summary = workbook.add_worksheet();
        summary.set_name(&summary_name)?;
        let blocks = self.write_summary(summary, entries)?;
        sheets.push(summary_name.clone());

        if self.options.include_charts {
            let charts_name = namer.claim(CHARTS_SHEET);
            let charts = workbook.add_worksheet();
            charts.set_name(&charts_name)?;
            self.write_charts(charts, &summary_name, &blocks)?;
            sheets.push(charts_name);
        }

        for &(rows, columns) in &self.options.crosstabs {
            let tab = cross_tab(entries, rows, columns);
            let name = namer.claim(&tab.title());
            let sheet = workbook.add_worksheet();
            sheet.set_name(&name)?;
            self.write_cross_tab(sheet, &tab)?;
            sheets.push(name);
        }

        for member in team_members(entries) {
            let name = namer.claim_member(&member, self.options.member_name_len);
            let rows = member_details(entries, &member);
            debug!("Writing {} rows for {} to '{}'", rows.len(), member, name);

            let sheet = workbook.add_worksheet();
            sheet.set_name(&name)?;
            self.write_details(sheet, &rows)?;
            sheets.push(name);
        }

        Ok((workbook, sheets))
    }

    /// Write the three total blocks and the grand total row.
    fn write_summary(&self, sheet: &mut Worksheet, entries: &[TimeEntry]) -> ReportResult<Vec<BlockRange>> {
        let mut row: u32 = 0;
        let mut blocks = Vec::new();

        for dimension in SUMMARY_DIMENSIONS {
            let table = rounded(&group_sum(entries, dimension), self.options.decimals);
            if let Some(block) = self.write_pivot_block(sheet, &mut row, &table)? {
                blocks.push(block);
            }
        }

        let total = round_hours(grand_total(entries), self.options.decimals);
        sheet.write_string_with_format(row, 0, GRAND_TOTAL, &self.formats.total_label)?;
        sheet.write_number_with_format(row, 1, total, &self.formats.total_hours)?;

        sheet.set_column_width(0, 30)?;
        sheet.set_column_width(1, 14)?;

        Ok(blocks)
    }

    /// Title row, header row, one row per label, blank separator row.
    fn write_pivot_block(
        &self,
        sheet: &mut Worksheet,
        row: &mut u32,
        table: &PivotTable,
    ) -> ReportResult<Option<BlockRange>> {
        sheet.write_string_with_format(*row, 0, table.title(), &self.formats.title)?;
        *row += 1;

        sheet.write_string(*row, 0, "Row Labels")?;
        sheet.write_string(*row, 1, "Sum of Hours")?;
        *row += 1;

        let first_row = *row;
        for pivot_row in &table.rows {
            self.write_label(sheet, *row, 0, &pivot_row.label, false)?;
            sheet.write_number_with_format(*row, 1, pivot_row.hours, &self.formats.hours)?;
            *row += 1;
        }
        let block = if table.is_empty() {
            None
        } else {
            Some(BlockRange {
                dimension: table.dimension,
                first_row,
                last_row: *row - 1,
            })
        };

        *row += 1;
        Ok(block)
    }

    /// Doughnut charts of the client and activity blocks.
    fn write_charts(&self, sheet: &mut Worksheet, summary: &str, blocks: &[BlockRange]) -> ReportResult<()> {
        let charted = blocks
            .iter()
            .filter(|b| matches!(b.dimension, Dimension::Client | Dimension::Activity));

        let mut anchor_row: u32 = 1;
        for block in charted {
            let mut chart = Chart::new(ChartType::Doughnut);
            chart
                .add_series()
                .set_name("Hours")
                .set_categories((summary, block.first_row, 0, block.last_row, 0))
                .set_values((summary, block.first_row, 1, block.last_row, 1));
            let title = format!("Distribution of Hours by {}", block.dimension);
            chart.title().set_name(title.as_str());
            chart.set_hole_size(30);

            sheet.insert_chart(anchor_row, 1, &chart)?;
            anchor_row += 18;
        }

        Ok(())
    }

    /// Two-dimensional totals with a Grand Total column and row.
    fn write_cross_tab(&self, sheet: &mut Worksheet, tab: &CrossTab) -> ReportResult<()> {
        let decimals = self.options.decimals;
        let total_col = (tab.column_labels.len() + 1) as u16;

        let corner = format!("{} / {}", tab.rows, tab.columns);
        sheet.write_string_with_format(0, 0, &corner, &self.formats.title)?;
        for (c, label) in tab.column_labels.iter().enumerate() {
            self.write_label(sheet, 0, (c + 1) as u16, label, true)?;
        }
        sheet.write_string_with_format(0, total_col, GRAND_TOTAL, &self.formats.total_label)?;

        for (r, label) in tab.row_labels.iter().enumerate() {
            let row = (r + 1) as u32;
            self.write_label(sheet, row, 0, label, false)?;
            for (c, cell) in tab.cells[r].iter().enumerate() {
                if let Some(hours) = cell {
                    sheet.write_number_with_format(
                        row,
                        (c + 1) as u16,
                        round_hours(*hours, decimals),
                        &self.formats.hours,
                    )?;
                }
            }
            sheet.write_number_with_format(
                row,
                total_col,
                round_hours(tab.row_totals[r], decimals),
                &self.formats.total_hours,
            )?;
        }

        let total_row = (tab.row_labels.len() + 1) as u32;
        sheet.write_string_with_format(total_row, 0, GRAND_TOTAL, &self.formats.total_label)?;
        for (c, total) in tab.column_totals.iter().enumerate() {
            sheet.write_number_with_format(
                total_row,
                (c + 1) as u16,
                round_hours(*total, decimals),
                &self.formats.total_hours,
            )?;
        }
        sheet.write_number_with_format(
            total_row,
            total_col,
            round_hours(tab.grand_total, decimals),
            &self.formats.total_hours,
        )?;

        sheet.set_column_width(0, 30)?;
        sheet.set_freeze_panes(1, 1)?;
        Ok(())
    }

    /// One member's entries: client, week, activity, comments, minutes, hours.
    fn write_details(&self, sheet: &mut Worksheet, rows: &[&TimeEntry]) -> ReportResult<()> {
        let columns = &self.options.columns;
        let headers = [
            columns.client.as_str(),
            columns.week.as_str(),
            columns.activity.as_str(),
            columns.comments.as_str(),
            columns.time.as_str(),
            "Hours",
        ];
        for (c, header) in headers.iter().enumerate() {
            sheet.write_string_with_format(0, c as u16, *header, &self.formats.header)?;
        }

        for (i, entry) in rows.iter().enumerate() {
            let row = (i + 1) as u32;
            if let Some(ref client) = entry.client {
                self.write_label(sheet, row, 0, client, false)?;
            }
            if let Some(ref week) = entry.week {
                self.write_label(sheet, row, 1, week, false)?;
            }
            if let Some(ref activity) = entry.activity {
                self.write_label(sheet, row, 2, activity, false)?;
            }
            if let Some(ref comments) = entry.comments {
                sheet.write_string(row, 3, comments)?;
            }
            if let Some(minutes) = entry.minutes {
                sheet.write_number(row, 4, minutes)?;
            }
            if let Some(hours) = entry.hours() {
                sheet.write_number(row, 5, hours)?;
            }
        }

        sheet.set_column_width(0, 24)?;
        sheet.set_column_width(2, 24)?;
        sheet.set_column_width(3, 40)?;
        sheet.set_freeze_panes(1, 0)?;
        Ok(())
    }

    /// Write a label as a number, date or string cell.
    fn write_label(
        &self,
        sheet: &mut Worksheet,
        row: u32,
        col: u16,
        label: &Label,
        header: bool,
    ) -> ReportResult<()> {
        let formats = &self.formats;
        match label {
            Label::Number(n) if header => sheet.write_number_with_format(row, col, *n, &formats.header)?,
            Label::Number(n) => sheet.write_number(row, col, *n)?,
            Label::Date(dt) => {
                let format = if header { &formats.header_date } else { &formats.date };
                sheet.write_datetime_with_format(row, col, dt, format)?
            }
            Label::Text(s) if header => sheet.write_string_with_format(row, col, s, &formats.header)?,
            Label::Text(s) => sheet.write_string(row, col, s)?,
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColumnNames;
    use crate::loader::{load_entries, tests::write_fixture};
    use calamine::{open_workbook, Data, Reader, Xlsx};

    fn fixture_entries(dir: &Path) -> Vec<TimeEntry> {
        let path = write_fixture(dir);
        load_entries(&path, "Aggregate Data", &ColumnNames::default())
            .unwrap()
            .entries
    }

    fn cell(range: &calamine::Range<Data>, row: u32, col: u32) -> Data {
        range.get_value((row, col)).cloned().unwrap_or(Data::Empty)
    }

    /// Read one part of the written xlsx package.
    fn package_part(path: &Path, name: &str) -> Option<String> {
        use std::io::Read;

        let file = std::fs::File::open(path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        let mut part = archive.by_name(name).ok()?;
        let mut xml = String::new();
        part.read_to_string(&mut xml).unwrap();
        Some(xml)
    }

    /// Body of the first `<tag ...>...</tag>` element.
    fn element_body<'a>(xml: &'a str, tag: &str) -> &'a str {
        let open = xml.find(&format!("<{}", tag)).unwrap();
        let start = open + xml[open..].find('>').unwrap() + 1;
        let end = xml.find(&format!("</{}>", tag)).unwrap();
        &xml[start..end]
    }

    /// Children named `tag` inside an element body, in order.
    fn children<'a>(body: &'a str, tag: &str) -> Vec<&'a str> {
        body.split(&format!("<{}", tag)).skip(1).collect()
    }

    fn attr<'a>(element: &'a str, name: &str) -> Option<&'a str> {
        let key = format!(" {}=\"", name);
        let start = element.find(&key)? + key.len();
        let len = element[start..].find('"')?;
        Some(&element[start..start + len])
    }

    /// (bold, fill rgb) of the style applied to `cell_ref` in a sheet part.
    fn cell_style(sheet_xml: &str, styles_xml: &str, cell_ref: &str) -> (bool, Option<String>) {
        let open = sheet_xml.find(&format!("<c r=\"{}\"", cell_ref)).unwrap();
        let tag = &sheet_xml[open..open + sheet_xml[open..].find('>').unwrap()];
        let xf_index: usize = attr(tag, "s").unwrap_or("0").parse().unwrap();

        let xfs = children(element_body(styles_xml, "cellXfs"), "xf ");
        let xf = xfs[xf_index];
        let font_id: usize = attr(xf, "fontId").unwrap().parse().unwrap();
        let fill_id: usize = attr(xf, "fillId").unwrap().parse().unwrap();

        let fonts = children(element_body(styles_xml, "fonts"), "font");
        let fills = children(element_body(styles_xml, "fills"), "fill");
        let fill = fills[fill_id];

        let bold = fonts[font_id].contains("<b/>");
        let solid = fill.contains("patternType=\"solid\"");
        (bold, attr(fill, "rgb").filter(|_| solid).map(String::from))
    }

    #[test]
    fn test_sanitize_sheet_name() {
        assert_eq!(sanitize_sheet_name("a/b:c*d?"), "a_b_c_d_");
        assert_eq!(sanitize_sheet_name("'quoted'"), "_quoted_");
        assert_eq!(sanitize_sheet_name(&"x".repeat(40)).len(), 31);
        assert_eq!(sanitize_sheet_name("   "), "Sheet");
    }

    #[test]
    fn test_member_sheet_names() {
        let mut namer = SheetNamer::new();
        let long = Label::from("Alexandria Ocasio.xlsx");
        assert_eq!(namer.claim_member(&long, 15), "Alexandria Ocas_Details");

        let same_prefix = Label::from("Alexandria Ocasio-Cortez.xlsx");
        assert_eq!(namer.claim_member(&same_prefix, 15), "Alexandria Ocas_Details_2");

        let short = Label::from("ana");
        assert_eq!(namer.claim_member(&short, 15), "ana_Details");
        assert_eq!(namer.claim("ANA_details"), "ANA_details_2");
    }

    #[test]
    fn test_sheet_order() {
        let dir = tempfile::tempdir().unwrap();
        let entries = fixture_entries(dir.path());

        let writer = ReportWriter::new(WorkbookOptions::default());
        let (_, sheets) = writer.build(&entries).unwrap();
        assert_eq!(
            sheets,
            vec![
                "Summary",
                "Member x Client",
                "Client x Week",
                "ana.xlsx_Details",
                "ben.xlsx_Details",
            ]
        );

        let options = WorkbookOptions {
            include_charts: true,
            crosstabs: vec![],
            ..WorkbookOptions::default()
        };
        let (_, sheets) = ReportWriter::new(options).build(&entries).unwrap();
        assert_eq!(sheets[..2], ["Summary", "Charts"]);
    }

    #[test]
    fn test_summary_sheet_contents() {
        let dir = tempfile::tempdir().unwrap();
        let entries = fixture_entries(dir.path());
        let out = dir.path().join("report.xlsx");

        let options = WorkbookOptions {
            include_charts: true,
            ..WorkbookOptions::default()
        };
        ReportWriter::new(options).write(&entries, &out).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&out).unwrap();
        let summary = workbook.worksheet_range("Summary").unwrap();

        assert_eq!(cell(&summary, 0, 0), Data::String("Client Totals".to_string()));
        assert_eq!(cell(&summary, 1, 0), Data::String("Row Labels".to_string()));
        assert_eq!(cell(&summary, 1, 1), Data::String("Sum of Hours".to_string()));
        assert_eq!(cell(&summary, 2, 0), Data::String("Acme".to_string()));
        assert_eq!(cell(&summary, 2, 1), Data::Float(2.0));
        assert_eq!(cell(&summary, 3, 0), Data::String("Globex".to_string()));
        assert_eq!(cell(&summary, 4, 0), Data::Empty);
        assert_eq!(cell(&summary, 5, 0), Data::String("Activity Totals".to_string()));
        assert_eq!(cell(&summary, 7, 0), Data::String("Build".to_string()));
        assert_eq!(cell(&summary, 7, 1), Data::Float(2.5));
        assert_eq!(cell(&summary, 11, 0), Data::String("Week Totals".to_string()));
        assert_eq!(cell(&summary, 13, 0), Data::Float(1.0));
        assert_eq!(cell(&summary, 13, 1), Data::Float(2.5));
        assert_eq!(cell(&summary, 16, 0), Data::String("Grand Total".to_string()));
        assert_eq!(cell(&summary, 16, 1), Data::Float(4.0));
    }

    #[test]
    fn test_detail_sheet_contents() {
        let dir = tempfile::tempdir().unwrap();
        let entries = fixture_entries(dir.path());
        let out = dir.path().join("report.xlsx");

        ReportWriter::new(WorkbookOptions::default())
            .write(&entries, &out)
            .unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&out).unwrap();
        let details = workbook.worksheet_range("ana.xlsx_Details").unwrap();

        assert_eq!(cell(&details, 0, 0), Data::String("Client".to_string()));
        assert_eq!(cell(&details, 0, 5), Data::String("Hours".to_string()));
        // sorted by client, then week
        assert_eq!(cell(&details, 1, 0), Data::String("Acme".to_string()));
        assert_eq!(cell(&details, 1, 1), Data::Float(1.0));
        assert_eq!(cell(&details, 1, 4), Data::Float(30.0));
        assert_eq!(cell(&details, 1, 5), Data::Float(0.5));
        assert_eq!(cell(&details, 2, 3), Data::String("wireframes".to_string()));
        assert_eq!(cell(&details, 3, 0), Data::String("Globex".to_string()));
        assert_eq!(cell(&details, 3, 5), Data::Float(0.0));

        let ben = workbook.worksheet_range("ben.xlsx_Details").unwrap();
        // unparsed time leaves Time and Hours blank
        assert_eq!(cell(&ben, 1, 0), Data::String("Acme".to_string()));
        assert_eq!(cell(&ben, 1, 4), Data::Empty);
        assert_eq!(cell(&ben, 1, 5), Data::Empty);
    }

    #[test]
    fn test_summary_highlight_styles() {
        let dir = tempfile::tempdir().unwrap();
        let entries = fixture_entries(dir.path());
        let out = dir.path().join("report.xlsx");

        ReportWriter::new(WorkbookOptions::default())
            .write(&entries, &out)
            .unwrap();

        let sheet = package_part(&out, "xl/worksheets/sheet1.xml").unwrap();
        let styles = package_part(&out, "xl/styles.xml").unwrap();
        let highlighted = (true, Some("FFD9E1F2".to_string()));

        // Client, Activity and Week titles, then the Grand Total label and value
        for cell_ref in ["A1", "A6", "A12", "A17", "B17"] {
            assert_eq!(cell_style(&sheet, &styles, cell_ref), highlighted, "{cell_ref}");
        }
        assert_eq!(cell_style(&sheet, &styles, "A3"), (false, None));
        assert_eq!(cell_style(&sheet, &styles, "A2"), (false, None));
    }

    #[test]
    fn test_charts_reference_summary_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let entries = fixture_entries(dir.path());
        let out = dir.path().join("report.xlsx");

        let options = WorkbookOptions {
            include_charts: true,
            ..WorkbookOptions::default()
        };
        ReportWriter::new(options).write(&entries, &out).unwrap();

        let client = package_part(&out, "xl/charts/chart1.xml").unwrap();
        let activity = package_part(&out, "xl/charts/chart2.xml").unwrap();
        assert!(package_part(&out, "xl/charts/chart3.xml").is_none());

        for chart in [&client, &activity] {
            assert!(chart.contains("<c:doughnutChart>"));
            assert!(chart.contains("<c:holeSize val=\"30\"/>"));
        }
        assert!(client.contains("Summary!$A$3:$A$4"));
        assert!(client.contains("Summary!$B$3:$B$4"));
        assert!(client.contains("Distribution of Hours by Client"));
        assert!(activity.contains("Summary!$A$8:$A$10"));
        assert!(activity.contains("Summary!$B$8:$B$10"));
        assert!(activity.contains("Distribution of Hours by Activity"));
    }

    #[test]
    fn test_date_labels_written_as_dates() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("report.xlsx");
        let week = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let entries = vec![TimeEntry {
            member: Some(Label::from("ana.xlsx")),
            client: Some(Label::from("Acme")),
            week: Some(Label::Date(week)),
            activity: Some(Label::from("Build")),
            comments: None,
            minutes: Some(60.0),
        }];

        ReportWriter::new(WorkbookOptions::default())
            .write(&entries, &out)
            .unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&out).unwrap();
        let summary = workbook.worksheet_range("Summary").unwrap();
        // Week Totals block starts at row 8: title, header, then the label
        match cell(&summary, 10, 0) {
            Data::DateTime(dt) => assert_eq!(dt.as_f64(), 45292.0),
            other => panic!("expected a date cell, got {other:?}"),
        }

        let tab = workbook.worksheet_range("Client x Week").unwrap();
        assert!(matches!(cell(&tab, 0, 1), Data::DateTime(_)));

        let details = workbook.worksheet_range("ana.xlsx_Details").unwrap();
        assert!(matches!(cell(&details, 1, 1), Data::DateTime(_)));
    }

    #[test]
    fn test_cross_tab_sheet_contents() {
        let dir = tempfile::tempdir().unwrap();
        let entries = fixture_entries(dir.path());
        let out = dir.path().join("report.xlsx");

        ReportWriter::new(WorkbookOptions::default())
            .write(&entries, &out)
            .unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&out).unwrap();
        let tab = workbook.worksheet_range("Member x Client").unwrap();

        assert_eq!(cell(&tab, 0, 0), Data::String("Member / Client".to_string()));
        assert_eq!(cell(&tab, 0, 1), Data::String("Acme".to_string()));
        assert_eq!(cell(&tab, 0, 3), Data::String("Grand Total".to_string()));
        assert_eq!(cell(&tab, 1, 0), Data::String("ana.xlsx".to_string()));
        assert_eq!(cell(&tab, 1, 1), Data::Float(2.0));
        assert_eq!(cell(&tab, 1, 2), Data::Float(0.0));
        assert_eq!(cell(&tab, 3, 0), Data::String("Grand Total".to_string()));
        assert_eq!(cell(&tab, 3, 3), Data::Float(4.0));
    }
}
