//! Contents sheet: logo, title and a link to every other sheet.

use super::workbook::{CellRange, CellRef, Style, WorkbookSink};
use super::{Report, ReportError, Sheet};

const LOGO_SCALE: (f64, f64) = (0.28, 0.79);
const TITLE_ROW: u32 = 8;
const FIRST_LINK_ROW: u32 = 12;

pub fn write_contents<W: WorkbookSink>(
    report: &mut Report<W>,
    api_server: &str,
) -> Result<(), ReportError> {
    let sheet = Sheet::Contents;

    if let Some(logo) = report.options().logo.clone() {
        // A missing or unreadable logo never fails the report.
        if let Err(e) = report.image(sheet, CellRef::new(1, 1), &logo, LOGO_SCALE) {
            log::warn!("Could not insert logo from {}: {}", logo.display(), e);
        }
    }

    let title = report.options().title.clone();
    report.merge(sheet, CellRange::row(TITLE_ROW, 1, 3), &title, Style::Title)?;

    let generated = if api_server.is_empty() {
        format!("Generated {}", report.options().generated_at)
    } else {
        format!("Generated {} from {}", report.options().generated_at, api_server)
    };
    report.write(sheet, CellRef::new(TITLE_ROW + 1, 1), generated, Style::Content)?;

    report.write(sheet, CellRef::new(TITLE_ROW + 2, 1), "Contents", Style::Section)?;

    for (i, target) in Sheet::ALL.iter().skip(1).enumerate() {
        let at = CellRef::new(FIRST_LINK_ROW + i as u32, 1);
        report.link(sheet, at, *target, Style::Link)?;
    }

    Ok(())
}
