use std::fmt::Write as _;

use crate::model::Table;
use crate::options::Language;

const HEADING_CLASS: &str = "text-2xl font-bold mt-12 mb-4";
const TABLE_STYLE: &str = "border-collapse: collapse; width: 100%; font-family: Calibri; font-size: 14px; margin-bottom: 30px;";
const HEADER_ROW_STYLE: &str = "background:#f0f0f0;";
const HEADER_CELL_STYLE: &str = "padding: 12px; text-align: center;";
const PLACEHOLDER_CLASS: &str = "text-gray-500 text-xl";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
}

impl Alignment {
    /// Column 0 holds the product label; every other column is a price.
    #[must_use]
    pub const fn for_column(index: usize) -> Self {
        if index == 0 { Self::Left } else { Self::Right }
    }

    const fn as_css(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[must_use]
pub fn table_label(table: &Table, language: Language) -> String {
    format!("{} {}", language.table_label(), table.number)
}

fn render_table(html: &mut String, table: &Table, language: Language) {
    let _ = write!(
        html,
        "<h3 class=\"{HEADING_CLASS}\">{}</h3>",
        escape_html(&table_label(table, language))
    );
    let _ = write!(
        html,
        "<table border=\"1\" style=\"{TABLE_STYLE}\"><thead><tr style=\"{HEADER_ROW_STYLE}\">"
    );
    for cell in &table.header {
        let _ = write!(
            html,
            "<th style=\"{HEADER_CELL_STYLE}\">{}</th>",
            escape_html(cell)
        );
    }
    html.push_str("</tr></thead><tbody>");

    for row in &table.body {
        html.push_str("<tr>");
        for (index, cell) in row.iter().enumerate() {
            let _ = write!(
                html,
                "<td style=\"padding: 10px; text-align: {};\">{}</td>",
                Alignment::for_column(index).as_css(),
                escape_html(cell)
            );
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
}

/// Renders tables as one HTML fragment, or the localized placeholder when
/// there are none.
#[must_use]
pub fn render(tables: &[Table], language: Language) -> String {
    if tables.is_empty() {
        return format!(
            "<p class=\"{PLACEHOLDER_CLASS}\">{}</p>",
            escape_html(language.no_tables_message())
        );
    }

    let mut html = String::new();
    for table in tables {
        render_table(&mut html, table, language);
    }
    html
}

/// Wraps a fragment so spreadsheet applications treat pasted or downloaded
/// markup as a worksheet.
#[must_use]
pub fn spreadsheet_document(fragment: &str) -> String {
    format!(
        "<html xmlns:o=\"urn:schemas-microsoft-com:office:office\" xmlns:x=\"urn:schemas-microsoft-com:office:excel\"><head><meta charset=\"utf-8\"></head><body>{fragment}</body></html>"
    )
}
