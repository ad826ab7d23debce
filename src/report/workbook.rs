//! Workbook output surface.
//!
//! Sheet builders address cells A1-style with 1-indexed rows and columns
//! ([`CellRef`], [`CellRange`]) and write through a [`WorkbookSink`]. The
//! production sink, [`XlsxWorkbook`], converts to the 0-indexed coordinates
//! `rust_xlsxwriter` expects.

use super::ReportError;
use super::styles;
use rust_xlsxwriter::{Chart, ChartLegendPosition, ChartType, Format, Image, Url, Workbook};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

// ============================================================================
// Addressing
// ============================================================================

/// Spreadsheet column letters for a 1-indexed column (`1` → `A`, `27` → `AA`).
pub fn column_letters(col: u16) -> String {
    let mut n = u32::from(col);
    let mut letters = Vec::new();
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        letters.push((b'A' + rem) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// A single cell, 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRef {
    pub row: u32,
    pub col: u16,
}

impl CellRef {
    pub const fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    pub fn offset(self, rows: u32, cols: u16) -> Self {
        Self::new(self.row + rows, self.col + cols)
    }

    /// 0-indexed `(row, col)` for the writer.
    fn zero_based(self) -> (u32, u16) {
        (self.row.saturating_sub(1), self.col.saturating_sub(1))
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letters(self.col), self.row)
    }
}

/// An inclusive rectangular range, 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    pub first: CellRef,
    pub last: CellRef,
}

impl CellRange {
    pub const fn new(first: CellRef, last: CellRef) -> Self {
        Self { first, last }
    }

    /// Cells `first_row..=last_row` of one column.
    pub const fn column(col: u16, first_row: u32, last_row: u32) -> Self {
        Self::new(CellRef::new(first_row, col), CellRef::new(last_row, col))
    }

    /// Cells `first_col..=last_col` of one row.
    pub const fn row(row: u32, first_col: u16, last_col: u16) -> Self {
        Self::new(CellRef::new(row, first_col), CellRef::new(row, last_col))
    }

    /// Absolute reference qualified with a sheet name, as used in formulas.
    pub fn absolute_in(&self, sheet: &str) -> String {
        format!(
            "'{}'!${}${}:${}${}",
            sheet,
            column_letters(self.first.col),
            self.first.row,
            column_letters(self.last.col),
            self.last.row
        )
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.first, self.last)
    }
}

// ============================================================================
// Cell content
// ============================================================================

/// A typed cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
}

/// Most characters a single cell can hold.
pub const MAX_CELL_CHARS: usize = 32_767;

/// Appended to text cut down to [`MAX_CELL_CHARS`].
pub const TRUNCATION_MARKER: &str = "\n... (truncated)";

impl CellValue {
    /// Width in characters of the value as a spreadsheet displays it.
    pub fn display_width(&self) -> usize {
        self.to_string().chars().count()
    }

    /// Cut text longer than [`MAX_CELL_CHARS`] on a char boundary and mark
    /// it. The flag is true when the value was cut.
    pub fn fit_to_cell(self) -> (Self, bool) {
        match self {
            Self::Text(text) if text.chars().count() > MAX_CELL_CHARS => {
                let keep = MAX_CELL_CHARS - TRUNCATION_MARKER.chars().count();
                let mut cut: String = text.chars().take(keep).collect();
                cut.push_str(TRUNCATION_MARKER);
                (Self::Text(cut), true)
            }
            other => (other, false),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(n) => write!(f, "{}", n),
            Self::Bool(true) => f.write_str("TRUE"),
            Self::Bool(false) => f.write_str("FALSE"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<usize> for CellValue {
    fn from(value: usize) -> Self {
        Self::Number(value as f64)
    }
}

/// Named cell styles. The sink maps each to a concrete format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Style {
    Title,
    Section,
    Header,
    Content,
    AltRow,
    Link,
    Critical,
    Warning,
    Moderate,
    Good,
}

impl Style {
    pub const ALL: [Style; 10] = [
        Style::Title,
        Style::Section,
        Style::Header,
        Style::Content,
        Style::AltRow,
        Style::Link,
        Style::Critical,
        Style::Warning,
        Style::Moderate,
        Style::Good,
    ];

    /// Body style for a 1-indexed row: even rows are shaded.
    pub fn for_row(row: u32) -> Self {
        if row % 2 == 0 { Self::AltRow } else { Self::Content }
    }

    /// Body style for the `index`-th entry of a list, counted from 0: the
    /// first entry is plain and every second one after it is shaded.
    pub fn for_index(index: usize) -> Self {
        if index % 2 == 1 { Self::AltRow } else { Self::Content }
    }
}

/// A single-series column chart over data on one sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnChart {
    pub title: String,
    pub series_name: String,
    /// Sheet holding the category and value cells
    pub data_sheet: String,
    pub categories: CellRange,
    pub values: CellRange,
    pub anchor: CellRef,
}

// ============================================================================
// Sink
// ============================================================================

/// Operations the report needs from a workbook backend.
pub trait WorkbookSink {
    fn add_sheet(&mut self, name: &str) -> Result<(), ReportError>;

    fn write(
        &mut self,
        sheet: &str,
        at: CellRef,
        value: &CellValue,
        style: Style,
    ) -> Result<(), ReportError>;

    fn merge(
        &mut self,
        sheet: &str,
        range: CellRange,
        text: &str,
        style: Style,
    ) -> Result<(), ReportError>;

    /// Write `text` at `at` as a link to cell A1 of `target_sheet`.
    fn link(
        &mut self,
        sheet: &str,
        at: CellRef,
        target_sheet: &str,
        text: &str,
        style: Style,
    ) -> Result<(), ReportError>;

    fn autofilter(&mut self, sheet: &str, range: CellRange) -> Result<(), ReportError>;

    fn set_column_width(&mut self, sheet: &str, col: u16, width: f64) -> Result<(), ReportError>;

    fn insert_image(
        &mut self,
        sheet: &str,
        at: CellRef,
        path: &Path,
        scale: (f64, f64),
    ) -> Result<(), ReportError>;

    fn insert_chart(&mut self, sheet: &str, chart: &ColumnChart) -> Result<(), ReportError>;

    fn save(&mut self, path: &Path) -> Result<(), ReportError>;
}

/// [`WorkbookSink`] writing an `.xlsx` file with `rust_xlsxwriter`.
pub struct XlsxWorkbook {
    workbook: Workbook,
    sheets: Vec<String>,
    formats: HashMap<Style, Format>,
}

impl XlsxWorkbook {
    pub fn new() -> Self {
        let formats = Style::ALL
            .iter()
            .map(|style| (*style, styles::format_for(*style)))
            .collect();

        Self {
            workbook: Workbook::new(),
            sheets: Vec::new(),
            formats,
        }
    }

    fn format(&self, style: Style) -> Format {
        self.formats
            .get(&style)
            .cloned()
            .unwrap_or_else(|| styles::format_for(style))
    }

    fn worksheet(
        &mut self,
        sheet: &str,
    ) -> Result<&mut rust_xlsxwriter::Worksheet, ReportError> {
        if !self.sheets.iter().any(|s| s == sheet) {
            return Err(ReportError::UnknownSheet(sheet.to_string()));
        }
        Ok(self.workbook.worksheet_from_name(sheet)?)
    }
}

impl Default for XlsxWorkbook {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkbookSink for XlsxWorkbook {
    fn add_sheet(&mut self, name: &str) -> Result<(), ReportError> {
        self.workbook.add_worksheet().set_name(name)?;
        self.sheets.push(name.to_string());
        Ok(())
    }

    fn write(
        &mut self,
        sheet: &str,
        at: CellRef,
        value: &CellValue,
        style: Style,
    ) -> Result<(), ReportError> {
        let format = self.format(style);
        let (row, col) = at.zero_based();
        let ws = self.worksheet(sheet)?;
        match value {
            CellValue::Text(text) => ws.write_string_with_format(row, col, text, &format)?,
            CellValue::Number(n) => ws.write_number_with_format(row, col, *n, &format)?,
            CellValue::Bool(b) => ws.write_boolean_with_format(row, col, *b, &format)?,
        };
        Ok(())
    }

    fn merge(
        &mut self,
        sheet: &str,
        range: CellRange,
        text: &str,
        style: Style,
    ) -> Result<(), ReportError> {
        let format = self.format(style);
        let (r1, c1) = range.first.zero_based();
        let (r2, c2) = range.last.zero_based();
        self.worksheet(sheet)?
            .merge_range(r1, c1, r2, c2, text, &format)?;
        Ok(())
    }

    fn link(
        &mut self,
        sheet: &str,
        at: CellRef,
        target_sheet: &str,
        text: &str,
        style: Style,
    ) -> Result<(), ReportError> {
        let format = self.format(style);
        let (row, col) = at.zero_based();
        let url = Url::new(format!("internal:'{}'!A1", target_sheet)).set_text(text);
        self.worksheet(sheet)?
            .write_url_with_format(row, col, url, &format)?;
        Ok(())
    }

    fn autofilter(&mut self, sheet: &str, range: CellRange) -> Result<(), ReportError> {
        let (r1, c1) = range.first.zero_based();
        let (r2, c2) = range.last.zero_based();
        self.worksheet(sheet)?.autofilter(r1, c1, r2, c2)?;
        Ok(())
    }

    fn set_column_width(&mut self, sheet: &str, col: u16, width: f64) -> Result<(), ReportError> {
        self.worksheet(sheet)?
            .set_column_width(col.saturating_sub(1), width)?;
        Ok(())
    }

    fn insert_image(
        &mut self,
        sheet: &str,
        at: CellRef,
        path: &Path,
        scale: (f64, f64),
    ) -> Result<(), ReportError> {
        let image = Image::new(path)?
            .set_scale_width(scale.0)
            .set_scale_height(scale.1);
        let (row, col) = at.zero_based();
        self.worksheet(sheet)?.insert_image(row, col, &image)?;
        Ok(())
    }

    fn insert_chart(&mut self, sheet: &str, definition: &ColumnChart) -> Result<(), ReportError> {
        let (cr1, cc1) = definition.categories.first.zero_based();
        let (cr2, cc2) = definition.categories.last.zero_based();
        let (vr1, vc1) = definition.values.first.zero_based();
        let (vr2, vc2) = definition.values.last.zero_based();

        let mut chart = Chart::new(ChartType::Column);
        chart
            .add_series()
            .set_name(definition.series_name.as_str())
            .set_categories((definition.data_sheet.as_str(), cr1, cc1, cr2, cc2))
            .set_values((definition.data_sheet.as_str(), vr1, vc1, vr2, vc2));
        chart.title().set_name(definition.title.as_str());
        chart.legend().set_position(ChartLegendPosition::Top);

        let (row, col) = definition.anchor.zero_based();
        self.worksheet(sheet)?.insert_chart(row, col, &chart)?;
        Ok(())
    }

    fn save(&mut self, path: &Path) -> Result<(), ReportError> {
        self.workbook.save(path)?;
        Ok(())
    }
}

// ============================================================================
// In-memory sink for tests
// ============================================================================
