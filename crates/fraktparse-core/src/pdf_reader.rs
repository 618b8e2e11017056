use std::collections::BTreeMap;
use std::path::Path;

use encoding_rs::{UTF_16BE, WINDOWS_1252};
use lopdf::Document;
use lopdf::Object;
use lopdf::content::Content;
use tracing::debug;

use crate::classify::{LineKind, classify_line};
use crate::error::ExtractError;
use crate::model::SourceLine;
use crate::options::PageSelection;
use crate::segment::split_on_space_runs;

#[derive(Debug, Clone, PartialEq, Eq)]
struct PageText {
    page_number: u32,
    text: String,
}

fn split_text_into_pages(raw_text: &str) -> Vec<String> {
    let mut pages = raw_text
        .split('\u{000C}')
        .map(str::to_string)
        .collect::<Vec<_>>();
    if pages.last().is_some_and(String::is_empty) {
        pages.pop();
    }
    pages
}

fn looks_decoding_broken(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }

    if text.contains("?Identity-H Unimplemented?") {
        return true;
    }

    let total = text.chars().count();
    let replacement = text.matches('\u{FFFD}').count();
    let control = text
        .chars()
        .filter(|ch| ch.is_control() && !matches!(ch, '\n' | '\r' | '\t'))
        .count();

    replacement * 8 > total || control * 5 > total
}

fn decode_pdf_bytes(encoding: Option<&str>, bytes: &[u8]) -> String {
    let decoded = Document::decode_text(encoding, bytes);
    if !looks_decoding_broken(&decoded) {
        return decoded;
    }

    if bytes.starts_with(&[0xFE, 0xFF]) {
        let (utf16, had_errors) = UTF_16BE.decode_without_bom_handling(&bytes[2..]);
        if !had_errors && !utf16.is_empty() {
            return utf16.into_owned();
        }
    }

    if let Some(name) = encoding {
        let lower = name.to_ascii_lowercase();

        if lower.contains("utf16")
            || lower.contains("ucs2")
            || lower.contains("identity-h")
            || lower.contains("unicode")
        {
            let (utf16, had_errors) = UTF_16BE.decode_without_bom_handling(bytes);
            if !had_errors && !utf16.is_empty() {
                return utf16.into_owned();
            }
        }

        if lower.contains("winansi") || lower.contains("1252") {
            let (latin, _, had_errors) = WINDOWS_1252.decode(bytes);
            if !had_errors && !latin.is_empty() {
                return latin.into_owned();
            }
        }
    }

    String::from_utf8_lossy(bytes).to_string()
}

/// Prefers candidates that yield many column-separated, price-like lines.
fn extraction_quality_score(text: &str) -> i64 {
    if text.trim().is_empty() {
        return i64::MIN / 4;
    }

    let no_markers: [String; 0] = [];
    let mut non_empty_lines = 0_i64;
    let mut multi_cell_lines = 0_i64;
    let mut row_like_lines = 0_i64;

    for (position, line) in text.lines().enumerate() {
        let line = SourceLine::new(position, line);
        if line.trimmed.is_empty() {
            continue;
        }

        non_empty_lines += 1;
        if split_on_space_runs(&line.trimmed).len() >= 2 {
            multi_cell_lines += 1;
        }
        if classify_line(&line, &no_markers) == LineKind::RowLike {
            row_like_lines += 1;
        }
    }

    let broken_penalty = if looks_decoding_broken(text) { 800 } else { 0 };
    multi_cell_lines * 50 + row_like_lines * 15 + non_empty_lines - broken_penalty
}

fn choose_best_text(candidates: &[String]) -> String {
    candidates
        .iter()
        .max_by_key(|text| extraction_quality_score(text))
        .cloned()
        .unwrap_or_default()
}

fn extract_text_from_page_content(document: &Document, page_id: lopdf::ObjectId) -> Option<String> {
    fn collect_text(text: &mut String, encoding: Option<&str>, operands: &[Object]) {
        for operand in operands {
            match operand {
                Object::String(bytes, _) => {
                    text.push_str(&decode_pdf_bytes(encoding, bytes));
                }
                Object::Array(items) => {
                    collect_text(text, encoding, items);
                    text.push(' ');
                }
                Object::Integer(value) => {
                    // Large negative kerning in a TJ array is a visual column gap.
                    if *value < -100 {
                        text.push_str("  ");
                    }
                }
                _ => {}
            }
        }
    }

    let raw_content = document.get_page_content(page_id).ok()?;
    let content = Content::decode(&raw_content).ok()?;
    let encodings = document
        .get_page_fonts(page_id)
        .into_iter()
        .map(|(name, font)| (name, font.get_font_encoding()))
        .collect::<BTreeMap<Vec<u8>, &str>>();

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_encoding = None;
    for operation in content.operations {
        match operation.operator.as_str() {
            "Tf" => {
                if let Some(font_name) = operation
                    .operands
                    .first()
                    .and_then(|operand| operand.as_name().ok())
                {
                    current_encoding = encodings.get(font_name).copied();
                }
            }
            "Tj" | "TJ" | "'" | "\"" => {
                collect_text(&mut current, current_encoding, &operation.operands);
            }
            "T*" | "Td" | "TD" | "ET" => {
                if !current.trim().is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
            }
            _ => {}
        }
    }

    if !current.trim().is_empty() {
        lines.push(current);
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

fn read_pages(
    document: &Document,
    extracted: Option<String>,
    page_selection: Option<&PageSelection>,
) -> Result<Vec<PageText>, ExtractError> {
    let pages_map = document.get_pages();

    let (pdf_extract_pages, pdf_extract_whole) = match extracted {
        Some(text) => {
            let pages = split_text_into_pages(&text);
            if pages.len() == pages_map.len() {
                (Some(pages), None)
            } else {
                (None, Some(text))
            }
        }
        None => (None, None),
    };

    let mut pages = Vec::new();
    for (index, (page_no, page_id)) in pages_map.iter().enumerate() {
        if page_selection.is_some_and(|selection| !selection.contains(*page_no)) {
            continue;
        }

        let mut candidates = Vec::new();
        if let Some(text) = pdf_extract_pages
            .as_ref()
            .and_then(|fallback| fallback.get(index).cloned())
            .filter(|text| !text.trim().is_empty())
        {
            candidates.push(text);
        }
        if let Some(text) = extract_text_from_page_content(document, *page_id) {
            candidates.push(text);
        }
        if let Some(text) = document
            .extract_text(&[*page_no])
            .ok()
            .filter(|text| !text.trim().is_empty())
        {
            candidates.push(text);
        }

        let local_best_score = candidates
            .iter()
            .map(|text| extraction_quality_score(text))
            .max()
            .unwrap_or(i64::MIN / 4);
        if index == 0 && local_best_score < 80 {
            if let Some(text) = pdf_extract_whole
                .as_ref()
                .filter(|text| !text.trim().is_empty())
            {
                candidates.push(text.clone());
            }
        }

        let text = choose_best_text(&candidates);
        debug!(
            page = *page_no,
            candidates = candidates.len(),
            "selected page text"
        );

        pages.push(PageText {
            page_number: *page_no,
            text,
        });
    }

    if pages.is_empty() {
        return Err(ExtractError::NoPagesSelected {
            page_count: pages_map.len(),
        });
    }

    Ok(pages)
}

fn join_pages(pages: &[PageText]) -> String {
    pages
        .iter()
        .map(|page| page.text.trim_end_matches('\n'))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Recovers line-oriented text from a PDF file, page by page.
pub fn read_pdf_text(
    input_pdf: &Path,
    page_selection: Option<&PageSelection>,
) -> Result<String, ExtractError> {
    let document = Document::load(input_pdf)?;
    let extracted = pdf_extract::extract_text(input_pdf)
        .inspect_err(|error| debug!(%error, "pdf-extract failed, using lopdf text only"))
        .ok();
    let pages = read_pages(&document, extracted, page_selection)?;
    debug!(
        pages = pages.len(),
        last_page = pages.last().map_or(0, |page| page.page_number),
        "read pdf text"
    );
    Ok(join_pages(&pages))
}

/// Same as [`read_pdf_text`] for an in-memory document.
pub fn read_pdf_text_from_bytes(
    input_pdf: &[u8],
    page_selection: Option<&PageSelection>,
) -> Result<String, ExtractError> {
    let document = Document::load_mem(input_pdf)?;
    let extracted = pdf_extract::extract_text_from_mem(input_pdf)
        .inspect_err(|error| debug!(%error, "pdf-extract failed, using lopdf text only"))
        .ok();
    let pages = read_pages(&document, extracted, page_selection)?;
    Ok(join_pages(&pages))
}

#[cfg(test)]
mod tests {
    use super::{
        PageText, choose_best_text, decode_pdf_bytes, join_pages, split_text_into_pages,
    };

    #[test]
    fn splits_form_feed_delimited_pages() {
        let pages = split_text_into_pages("p1\u{000C}p2\u{000C}");
        assert_eq!(pages, vec!["p1", "p2"]);
    }

    #[test]
    fn decodes_utf16_with_byte_order_mark() {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in "Pris øre".encode_utf16() {
            bytes.extend(unit.to_be_bytes());
        }
        assert_eq!(decode_pdf_bytes(Some("Identity-H"), &bytes), "Pris øre");
    }

    #[test]
    fn prefers_candidate_with_column_gaps() {
        let flat = "Produkt Sone Pris\nPakke A 99\nPall B 899".to_string();
        let columns = "Produkt  Sone  Pris\nPakke  A  99\nPall  B  899".to_string();
        assert_eq!(choose_best_text(&[flat, columns.clone()]), columns);
    }

    #[test]
    fn joins_pages_with_single_newlines() {
        let pages = vec![
            PageText {
                page_number: 1,
                text: "a  1\n".to_string(),
            },
            PageText {
                page_number: 2,
                text: "b  2".to_string(),
            },
        ];
        assert_eq!(join_pages(&pages), "a  1\nb  2");
    }
}
