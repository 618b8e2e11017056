use crate::warning::ExtractWarning;

/// Ordered cell values of one table row.
pub type Row = Vec<String>;

/// One line of extracted document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// Zero-based line index in the document.
    pub position: usize,
    pub raw: String,
    pub trimmed: String,
}

impl SourceLine {
    #[must_use]
    pub fn new(position: usize, raw: &str) -> Self {
        Self {
            position,
            raw: raw.to_string(),
            trimmed: raw.trim().to_string(),
        }
    }
}

/// How a line is cut into cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentStrategy {
    /// Runs of two or more spaces (or a tab) separate cells.
    Whitespace,
    /// Markdown pipe rows.
    Delimiter,
    /// Fixed character chunks. Lossy; only used as a fallback.
    FixedWidth { width: usize, columns: usize },
}

impl SegmentStrategy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Whitespace => "whitespace",
            Self::Delimiter => "delimiter",
            Self::FixedWidth { .. } => "fixed_width",
        }
    }
}

/// Contiguous lines believed to form one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateBlock {
    pub lines: Vec<SourceLine>,
    pub strategy: SegmentStrategy,
}

impl CandidateBlock {
    #[must_use]
    pub fn start(&self) -> usize {
        self.lines.first().map_or(0, |line| line.position)
    }

    #[must_use]
    pub fn end(&self) -> usize {
        self.lines.last().map_or(0, |line| line.position)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// 1-based, assigned in document order.
    pub number: usize,
    pub header: Row,
    pub body: Vec<Row>,
    pub strategy: SegmentStrategy,
    pub start: usize,
    pub end: usize,
    pub confidence: f32,
}

impl Table {
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.body.len()
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.body
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.header.len()))
            .max()
            .unwrap_or(0)
    }

    /// Body rows whose cell count differs from the header's.
    #[must_use]
    pub fn ragged_rows(&self) -> usize {
        self.body
            .iter()
            .filter(|row| row.len() != self.header.len())
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExtractionResult {
    pub tables: Vec<Table>,
    pub warnings: Vec<ExtractWarning>,
}

impl ExtractionResult {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    #[must_use]
    pub fn report(&self) -> ExtractionReport {
        ExtractionReport {
            table_count: self.tables.len(),
            row_count: self.tables.iter().map(Table::row_count).sum(),
            warnings: self.warnings.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionReport {
    pub row_count: usize,
    pub table_count: usize,
    pub warnings: Vec<ExtractWarning>,
}
