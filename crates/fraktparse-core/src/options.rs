use std::collections::BTreeSet;
use std::str::FromStr;

use crate::error::ExtractError;

pub const DEFAULT_PAGE_MARKERS: [&str; 2] = ["Side", "Page"];
pub const DEFAULT_MIN_BLOCK_LINES: usize = 3;
pub const DEFAULT_FIXED_WIDTH: usize = 20;
pub const DEFAULT_FIXED_COLUMNS: usize = 4;

/// Which segmentation path the input text is allowed to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFormat {
    /// Markdown pipe tables where a separator row is present, plain text elsewhere.
    #[default]
    Auto,
    PlainText,
    Markdown,
}

impl FromStr for InputFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "text" | "plain" | "plaintext" => Ok(Self::PlainText),
            "markdown" | "md" => Ok(Self::Markdown),
            other => Err(format!(
                "unknown input format '{other}', expected auto, text or markdown"
            )),
        }
    }
}

/// Output language for table labels and the empty-result message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    Norwegian,
    English,
}

impl Language {
    #[must_use]
    pub const fn table_label(self) -> &'static str {
        match self {
            Self::Norwegian => "Tabell",
            Self::English => "Table",
        }
    }

    #[must_use]
    pub const fn no_tables_message(self) -> &'static str {
        match self {
            Self::Norwegian => "Ingen tabeller funnet i denne PDF-en.",
            Self::English => "No tables found in this PDF.",
        }
    }

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Norwegian => "nb",
            Self::English => "en",
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "nb" | "no" | "nn" | "norwegian" | "norsk" => Ok(Self::Norwegian),
            "en" | "english" => Ok(Self::English),
            other => Err(format!("unsupported language '{other}', expected nb or en")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSelection {
    pages: BTreeSet<u32>,
}

impl PageSelection {
    #[must_use]
    pub fn contains(&self, page: u32) -> bool {
        self.pages.contains(&page)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl FromStr for PageSelection {
    type Err = String;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let mut pages = BTreeSet::new();
        for token in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if let Some((start, end)) = token.split_once('-') {
                let start: u32 = start
                    .trim()
                    .parse()
                    .map_err(|_| format!("invalid page range start: '{start}'"))?;
                let end: u32 = end
                    .trim()
                    .parse()
                    .map_err(|_| format!("invalid page range end: '{end}'"))?;
                if start == 0 || end == 0 {
                    return Err("pages are 1-based".to_string());
                }
                if end < start {
                    return Err(format!(
                        "invalid range '{token}': end is smaller than start"
                    ));
                }
                pages.extend(start..=end);
            } else {
                let page: u32 = token
                    .parse()
                    .map_err(|_| format!("invalid page number: '{token}'"))?;
                if page == 0 {
                    return Err("pages are 1-based".to_string());
                }
                pages.insert(page);
            }
        }

        if pages.is_empty() {
            return Err("page selection cannot be empty".to_string());
        }

        Ok(Self { pages })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    pub pages: Option<PageSelection>,
    pub input_format: InputFormat,
    /// Lines containing any of these literals are page furniture.
    pub page_markers: Vec<String>,
    /// A plain-text block needs at least this many row-like lines.
    pub min_block_lines: usize,
    /// Re-cut single-column blocks into fixed-width chunks.
    pub fixed_width_fallback: bool,
    pub fixed_width: usize,
    pub fixed_columns: usize,
    pub delimiter: u8,
}

impl ExtractOptions {
    pub fn validate(&self) -> Result<(), ExtractError> {
        if self.min_block_lines < 2 {
            return Err(ExtractError::MinBlockLines(self.min_block_lines));
        }
        if self.fixed_width == 0 || self.fixed_columns == 0 {
            return Err(ExtractError::FixedWidthGrid {
                width: self.fixed_width,
                columns: self.fixed_columns,
            });
        }
        if let Some(position) = self
            .page_markers
            .iter()
            .position(|marker| marker.trim().is_empty())
        {
            return Err(ExtractError::EmptyPageMarker(position));
        }
        Ok(())
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            pages: None,
            input_format: InputFormat::Auto,
            page_markers: DEFAULT_PAGE_MARKERS.iter().map(ToString::to_string).collect(),
            min_block_lines: DEFAULT_MIN_BLOCK_LINES,
            fixed_width_fallback: false,
            fixed_width: DEFAULT_FIXED_WIDTH,
            fixed_columns: DEFAULT_FIXED_COLUMNS,
            delimiter: b',',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ExtractOptions, InputFormat, Language, PageSelection};
    use crate::error::ExtractError;
    use std::str::FromStr;

    #[test]
    fn parse_page_selection_range_and_single() {
        let selection = PageSelection::from_str("1-3,5").expect("selection should parse");
        assert!(selection.contains(1));
        assert!(selection.contains(2));
        assert!(selection.contains(3));
        assert!(selection.contains(5));
        assert!(!selection.contains(4));
    }

    #[test]
    fn reject_invalid_page_selection() {
        let err = PageSelection::from_str("3-1").expect_err("invalid range should fail");
        assert!(err.contains("invalid range"));
    }

    #[test]
    fn parse_input_format_aliases() {
        assert_eq!(InputFormat::from_str("md"), Ok(InputFormat::Markdown));
        assert_eq!(InputFormat::from_str(" Text "), Ok(InputFormat::PlainText));
        assert!(InputFormat::from_str("docx").is_err());
    }

    #[test]
    fn parse_language_codes() {
        assert_eq!(Language::from_str("no"), Ok(Language::Norwegian));
        assert_eq!(Language::from_str("EN"), Ok(Language::English));
        assert_eq!(Language::default().table_label(), "Tabell");
    }

    #[test]
    fn default_options_are_valid() {
        ExtractOptions::default()
            .validate()
            .expect("defaults should validate");
    }

    #[test]
    fn rejects_zero_fixed_width() {
        let options = ExtractOptions {
            fixed_width: 0,
            ..ExtractOptions::default()
        };
        let err = options.validate().expect_err("zero width should fail");
        assert!(matches!(
            err,
            ExtractError::FixedWidthGrid {
                width: 0,
                columns: 4
            }
        ));
    }

    #[test]
    fn rejects_blank_page_marker_and_short_blocks() {
        let options = ExtractOptions {
            page_markers: vec!["Side".to_string(), "  ".to_string()],
            ..ExtractOptions::default()
        };
        assert!(matches!(
            options.validate(),
            Err(ExtractError::EmptyPageMarker(1))
        ));

        let options = ExtractOptions {
            min_block_lines: 1,
            ..ExtractOptions::default()
        };
        assert!(matches!(
            options.validate(),
            Err(ExtractError::MinBlockLines(1))
        ));
    }
}
