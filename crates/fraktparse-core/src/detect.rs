use tracing::debug;

use crate::classify::{LineKind, classify, classify_line, source_lines};
use crate::model::{CandidateBlock, SegmentStrategy, SourceLine};
use crate::options::{ExtractOptions, InputFormat};
use crate::segment::is_markdown_separator;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Section {
    Plain(Vec<SourceLine>),
    Markdown(Vec<SourceLine>),
}

fn is_pipe_line(line: &SourceLine) -> bool {
    line.trimmed.contains('|')
}

fn split_sections(lines: Vec<SourceLine>, format: InputFormat) -> Vec<Section> {
    if format == InputFormat::PlainText {
        return vec![Section::Plain(lines)];
    }

    let mut sections = Vec::new();
    let mut plain = Vec::new();
    let mut pipe_run: Vec<SourceLine> = Vec::new();

    let close_run =
        |run: Vec<SourceLine>, plain: &mut Vec<SourceLine>, sections: &mut Vec<Section>| {
            if run.is_empty() {
                return;
            }
            let has_separator = run.iter().any(|line| is_markdown_separator(&line.trimmed));
            if has_separator || format == InputFormat::Markdown {
                if !plain.is_empty() {
                    sections.push(Section::Plain(std::mem::take(plain)));
                }
                sections.push(Section::Markdown(run));
            } else {
                plain.extend(run);
            }
        };

    for line in lines {
        if is_pipe_line(&line) {
            pipe_run.push(line);
            continue;
        }

        close_run(std::mem::take(&mut pipe_run), &mut plain, &mut sections);
        if format == InputFormat::Auto {
            plain.push(line);
        }
    }
    close_run(pipe_run, &mut plain, &mut sections);

    if !plain.is_empty() {
        sections.push(Section::Plain(plain));
    }

    sections
}

/// Finds table candidates in document order, choosing a segmentation
/// strategy per block.
#[must_use]
pub fn candidate_blocks(text: &str, options: &ExtractOptions) -> Vec<CandidateBlock> {
    let mut blocks = Vec::new();
    for section in split_sections(source_lines(text), options.input_format) {
        match section {
            Section::Plain(lines) => blocks.extend(classify(&lines, options)),
            Section::Markdown(lines) => {
                let lines = lines
                    .into_iter()
                    .filter(|line| !is_markdown_separator(&line.trimmed))
                    .filter(|line| {
                        classify_line(line, &options.page_markers) != LineKind::Noise
                    })
                    .collect::<Vec<_>>();
                debug!(lines = lines.len(), "markdown table section");
                blocks.push(CandidateBlock {
                    lines,
                    strategy: SegmentStrategy::Delimiter,
                });
            }
        }
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::candidate_blocks;
    use crate::model::SegmentStrategy;
    use crate::options::{ExtractOptions, InputFormat};

    const MIXED: &str = "\
Bring  Sone 1  120
Bring  Sone 2  140
Bring  Sone 3  160

| Produkt | Pris |
|---|---:|
| Pakke | 99 |
";

    #[test]
    fn auto_detects_plain_and_markdown_blocks_in_order() {
        let blocks = candidate_blocks(MIXED, &ExtractOptions::default());
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].strategy, SegmentStrategy::Whitespace);
        assert_eq!(blocks[1].strategy, SegmentStrategy::Delimiter);
        assert_eq!(blocks[1].len(), 2, "separator row is discarded");
    }

    #[test]
    fn pipes_without_separator_stay_plain_text() {
        let text = "A | 1\nB | 2\nC | 3";
        let blocks = candidate_blocks(text, &ExtractOptions::default());
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].strategy, SegmentStrategy::Whitespace);
    }

    #[test]
    fn plain_text_mode_ignores_markdown_syntax() {
        let options = ExtractOptions {
            input_format: InputFormat::PlainText,
            ..ExtractOptions::default()
        };
        let blocks = candidate_blocks(MIXED, &options);
        assert!(
            blocks
                .iter()
                .all(|block| block.strategy == SegmentStrategy::Whitespace)
        );
    }

    #[test]
    fn markdown_mode_accepts_pipe_runs_and_skips_prose() {
        let options = ExtractOptions {
            input_format: InputFormat::Markdown,
            ..ExtractOptions::default()
        };
        let text = "Prisliste 2025\n| Vekt | Pris |\n| 1 kg | 99 |\n\nA  1\nB  2\nC  3";
        let blocks = candidate_blocks(text, &options);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].strategy, SegmentStrategy::Delimiter);
        assert_eq!(blocks[0].start(), 1);
    }

    #[test]
    fn page_marker_rows_are_dropped_from_markdown_tables() {
        let text = "| Produkt | Pris |\n|---|---|\n| Pakke | 99 |\n| Side 2 av 3 | |\n| Pall | 899 |";
        let blocks = candidate_blocks(text, &ExtractOptions::default());
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].len(), 3);
        assert!(
            blocks[0]
                .lines
                .iter()
                .all(|line| !line.trimmed.contains("Side"))
        );
    }
}
