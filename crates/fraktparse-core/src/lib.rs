//! Finds price tables in text recovered from freight-carrier PDFs and renders
//! them as spreadsheet-friendly HTML.
//!
//! The text pipeline is pure: classify lines, segment rows, build tables,
//! render. PDF reading is an adapter in front of it.

mod build;
mod classify;
mod csv_out;
mod detect;
mod error;
mod merge;
mod model;
mod options;
mod pdf_reader;
mod render;
mod segment;
mod warning;

use std::path::Path;

use tracing::debug;

use crate::csv_out::{write_csv, write_csv_to_string};
use crate::merge::merge_tables;

pub use build::TableBuilder;
pub use classify::{LineKind, classify, classify_line, source_lines};
pub use detect::candidate_blocks;
pub use error::ExtractError;
pub use model::{
    CandidateBlock, ExtractionReport, ExtractionResult, Row, SegmentStrategy, SourceLine, Table,
};
pub use options::{ExtractOptions, InputFormat, Language, PageSelection};
pub use pdf_reader::{read_pdf_text, read_pdf_text_from_bytes};
pub use render::{Alignment, render, spreadsheet_document, table_label};
pub use segment::{is_markdown_separator, segment};
pub use warning::{ExtractWarning, WarningCode};

/// Runs the full text pipeline. Never fails: text without tables yields an
/// empty result.
#[must_use]
pub fn extract_tables(text: &str, options: &ExtractOptions) -> ExtractionResult {
    let blocks = candidate_blocks(text, options);
    debug!(blocks = blocks.len(), "candidate blocks detected");

    let mut builder = TableBuilder::new(options);
    for block in &blocks {
        builder.build(block);
    }
    builder.finish()
}

/// Extracts and renders in one step.
#[must_use]
pub fn extract_to_html(text: &str, options: &ExtractOptions, language: Language) -> String {
    render(&extract_tables(text, options).tables, language)
}

/// Serializes tables into one merged CSV sheet.
pub fn tables_to_csv_string(
    tables: &[Table],
    delimiter: u8,
    language: Language,
) -> Result<String, ExtractError> {
    write_csv_to_string(&merge_tables(tables, language), delimiter)
}

pub fn write_tables_csv(
    path: &Path,
    tables: &[Table],
    delimiter: u8,
    language: Language,
) -> Result<(), ExtractError> {
    write_csv(path, &merge_tables(tables, language), delimiter)
}

pub fn extract_pdf_to_html(
    input_pdf: &Path,
    output_html: &Path,
    options: &ExtractOptions,
    language: Language,
) -> Result<ExtractionReport, ExtractError> {
    options.validate()?;

    let text = read_pdf_text(input_pdf, options.pages.as_ref())?;
    let result = extract_tables(&text, options);
    std::fs::write(output_html, render(&result.tables, language))?;
    Ok(result.report())
}

pub fn extract_pdf_bytes_to_html_string(
    input_pdf: &[u8],
    options: &ExtractOptions,
    language: Language,
) -> Result<(String, ExtractionReport), ExtractError> {
    options.validate()?;

    let text = read_pdf_text_from_bytes(input_pdf, options.pages.as_ref())?;
    let result = extract_tables(&text, options);
    Ok((render(&result.tables, language), result.report()))
}

#[cfg(test)]
mod tests {
    use super::{ExtractOptions, Language, extract_tables, tables_to_csv_string};

    #[test]
    fn csv_export_includes_header_rows_and_labels() {
        let text = "Vekt (kg)  Pris 2025\n1 kg  99\n5 kg  149";
        let result = extract_tables(text, &ExtractOptions::default());
        let csv = tables_to_csv_string(&result.tables, b',', Language::English)
            .expect("csv should serialize");
        assert_eq!(
            csv,
            "table_id,label,row_kind,col_1,col_2\n\
             1,Table 1,header,Vekt (kg),Pris 2025\n\
             1,Table 1,body,1 kg,99\n\
             1,Table 1,body,5 kg,149\n"
        );
    }

    #[test]
    fn report_counts_body_rows() {
        let text = "A  1\nB  2\nC  3\nprose\nD  4\nE  5\nF  6";
        let report = extract_tables(text, &ExtractOptions::default()).report();
        assert_eq!(report.table_count, 2);
        assert_eq!(report.row_count, 4);
    }
}
