use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::model::{Row, SegmentStrategy};

static MARKDOWN_SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\s|:-]*-[\s|:-]*$").expect("hardcoded separator regex is valid")
});

/// Cuts one line into ordered cells using `strategy`.
#[must_use]
pub fn segment(line: &str, strategy: SegmentStrategy) -> Row {
    match strategy {
        SegmentStrategy::Whitespace => split_on_space_runs(line),
        SegmentStrategy::Delimiter => split_on_pipes(line),
        SegmentStrategy::FixedWidth { width, columns } => {
            split_fixed_width(line, width, columns)
        }
    }
}

pub(crate) fn split_on_space_runs(line: &str) -> Row {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut whitespace_run = 0_usize;

    for ch in trimmed.chars() {
        if ch.is_whitespace() {
            whitespace_run += 1;
            if whitespace_run >= 2 {
                if !current.trim().is_empty() {
                    cells.push(current.trim().to_string());
                    current.clear();
                }
                continue;
            }
            current.push(ch);
            continue;
        }

        whitespace_run = 0;
        current.push(ch);
    }

    if !current.trim().is_empty() {
        cells.push(current.trim().to_string());
    }

    cells
}

pub(crate) fn split_on_pipes(line: &str) -> Row {
    if is_markdown_separator(line) {
        return Vec::new();
    }

    line.split('|')
        .map(strip_emphasis)
        .map(|cell| cell.trim().to_string())
        .filter(|cell| !cell.is_empty())
        .collect()
}

/// `|---|:---:|` style rows between a markdown header and its body.
#[must_use]
pub fn is_markdown_separator(line: &str) -> bool {
    MARKDOWN_SEPARATOR_RE.is_match(line)
}

fn strip_emphasis(cell: &str) -> String {
    cell.chars().filter(|ch| !matches!(ch, '*' | '_')).collect()
}

pub(crate) fn split_fixed_width(line: &str, width: usize, columns: usize) -> Row {
    let width = width.max(1);
    let columns = columns.max(1);
    let chars = line.trim().chars().collect::<Vec<_>>();

    let mut cells: Row = Vec::new();
    for (index, chunk) in chars.chunks(width).enumerate() {
        let piece = chunk.iter().collect::<String>();
        if index < columns {
            cells.push(piece);
        } else if let Some(last) = cells.last_mut() {
            last.push_str(&piece);
        }
    }

    cells
        .into_iter()
        .map(|cell| cell.trim().to_string())
        .filter(|cell| !cell.is_empty())
        .collect()
}

pub(crate) fn normalize_rows(rows: &[Row], width: usize) -> Vec<Row> {
    rows.iter()
        .map(|row| {
            let mut out = row.clone();
            out.resize(width, String::new());
            out
        })
        .collect()
}

pub(crate) fn modal_width(rows: &[Row]) -> usize {
    let mut freq = HashMap::new();
    for width in rows.iter().map(Vec::len) {
        *freq.entry(width).or_insert(0_usize) += 1;
    }

    freq.into_iter()
        .max_by_key(|(width, count)| (*count, *width))
        .map_or(0, |(width, _)| width)
}
