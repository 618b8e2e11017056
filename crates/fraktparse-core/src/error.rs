use std::io;
use std::string::FromUtf8Error;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV export produced invalid UTF-8: {0}")]
    CsvEncoding(#[from] FromUtf8Error),

    #[error("failed to load PDF: {0}")]
    PdfLoad(#[from] lopdf::Error),

    #[error("a price table needs a header and at least one row, got min_block_lines={0}")]
    MinBlockLines(usize),

    #[error("fixed-width columns need a non-zero chunk width and column count (width={width}, columns={columns})")]
    FixedWidthGrid { width: usize, columns: usize },

    #[error("page marker at position {0} is empty and would discard every line")]
    EmptyPageMarker(usize),

    #[error("page selection matches none of the {page_count} page(s) in the PDF")]
    NoPagesSelected { page_count: usize },
}
