use tracing::debug;

use crate::model::{CandidateBlock, SegmentStrategy, SourceLine};
use crate::options::ExtractOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Blank lines, bare page numbers and page markers. Skipped.
    Noise,
    /// Mixes a digit with a letter; probably a price row.
    RowLike,
    /// Anything else. Closes the running block.
    Text,
}

enum ClassifierState {
    Idle,
    Accumulating(Vec<SourceLine>),
}

#[must_use]
pub fn source_lines(text: &str) -> Vec<SourceLine> {
    text.lines()
        .enumerate()
        .map(|(position, raw)| SourceLine::new(position, raw))
        .collect()
}

#[must_use]
pub fn classify_line(line: &SourceLine, page_markers: &[String]) -> LineKind {
    let text = line.trimmed.as_str();
    if text.is_empty()
        || text.chars().all(|ch| ch.is_ascii_digit())
        || page_markers
            .iter()
            .any(|marker| text.contains(marker.as_str()))
    {
        return LineKind::Noise;
    }

    let has_digit = text.chars().any(|ch| ch.is_ascii_digit());
    let has_letter = text.chars().any(char::is_alphabetic);
    if has_digit && has_letter {
        LineKind::RowLike
    } else {
        LineKind::Text
    }
}

/// Groups consecutive row-like lines into candidate blocks.
#[must_use]
pub fn classify(lines: &[SourceLine], options: &ExtractOptions) -> Vec<CandidateBlock> {
    let mut blocks = Vec::new();
    let mut state = ClassifierState::Idle;

    let flush = |run: Vec<SourceLine>, blocks: &mut Vec<CandidateBlock>| {
        if run.len() >= options.min_block_lines {
            blocks.push(CandidateBlock {
                lines: run,
                strategy: SegmentStrategy::Whitespace,
            });
        } else if let Some(first) = run.first() {
            debug!(
                start = first.position,
                lines = run.len(),
                "dropping short row-like run"
            );
        }
    };

    for line in lines {
        state = match (classify_line(line, &options.page_markers), state) {
            (LineKind::Noise, state) => state,
            (LineKind::RowLike, ClassifierState::Idle) => {
                ClassifierState::Accumulating(vec![line.clone()])
            }
            (LineKind::RowLike, ClassifierState::Accumulating(mut run)) => {
                run.push(line.clone());
                ClassifierState::Accumulating(run)
            }
            (LineKind::Text, ClassifierState::Idle) => ClassifierState::Idle,
            (LineKind::Text, ClassifierState::Accumulating(run)) => {
                flush(run, &mut blocks);
                ClassifierState::Idle
            }
        };
    }

    if let ClassifierState::Accumulating(run) = state {
        flush(run, &mut blocks);
    }

    blocks
}
