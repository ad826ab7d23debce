//! Report palette and cell formats.

use super::workbook::Style;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, FormatUnderline};

pub const HEADER_FILL: u32 = 0x4472C4;
pub const SECTION_FILL: u32 = 0xE2EFDA;
pub const ALT_ROW_FILL: u32 = 0xF5F5F5;
pub const CRITICAL_FILL: u32 = 0xFFCCCC;
pub const WARNING_FILL: u32 = 0xFFFFCC;
pub const MODERATE_FILL: u32 = 0xCCFFCC;
pub const GOOD_FILL: u32 = 0xD9EAD3;

const LINK_COLOR: u32 = 0x0563C1;

fn body() -> Format {
    Format::new()
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Top)
        .set_text_wrap()
}

/// Concrete format for a named style.
pub fn format_for(style: Style) -> Format {
    match style {
        Style::Title => Format::new()
            .set_bold()
            .set_font_size(16)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter),
        Style::Section => Format::new()
            .set_bold()
            .set_font_size(12)
            .set_background_color(Color::RGB(SECTION_FILL))
            .set_border(FormatBorder::Thin),
        Style::Header => Format::new()
            .set_bold()
            .set_font_color(Color::White)
            .set_background_color(Color::RGB(HEADER_FILL))
            .set_border(FormatBorder::Thin)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_text_wrap(),
        Style::Content => body(),
        Style::AltRow => body().set_background_color(Color::RGB(ALT_ROW_FILL)),
        Style::Link => Format::new()
            .set_font_color(Color::RGB(LINK_COLOR))
            .set_underline(FormatUnderline::Single),
        Style::Critical => body().set_background_color(Color::RGB(CRITICAL_FILL)),
        Style::Warning => body().set_background_color(Color::RGB(WARNING_FILL)),
        Style::Moderate => body().set_background_color(Color::RGB(MODERATE_FILL)),
        Style::Good => body().set_background_color(Color::RGB(GOOD_FILL)),
    }
}
