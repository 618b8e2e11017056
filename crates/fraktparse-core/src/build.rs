use tracing::{debug, warn};

use crate::model::{CandidateBlock, ExtractionResult, Row, SegmentStrategy, Table};
use crate::options::ExtractOptions;
use crate::segment::{modal_width, segment};
use crate::warning::{ExtractWarning, WarningCode};

pub(crate) const LOW_CONFIDENCE_THRESHOLD: f32 = 0.60;
const FIXED_WIDTH_CONFIDENCE_CAP: f32 = 0.50;

#[allow(clippy::cast_precision_loss)]
fn table_confidence(rows: &[Row]) -> f32 {
    if rows.len() < 2 {
        return 0.0;
    }

    let modal = modal_width(rows);
    if modal == 0 {
        return 0.0;
    }

    let consistent =
        rows.iter().filter(|row| row.len() == modal).count() as f32 / rows.len() as f32;
    let max_width = rows.iter().map(Vec::len).max().unwrap_or(modal);
    let min_width = rows.iter().map(Vec::len).min().unwrap_or(modal);
    let uniformity = if max_width == 0 {
        0.0
    } else {
        1.0 - ((max_width - min_width) as f32 / max_width as f32)
    };

    (consistent * 0.75 + uniformity * 0.25).clamp(0.0, 1.0)
}

fn segment_block(block: &CandidateBlock, strategy: SegmentStrategy) -> Vec<Row> {
    block
        .lines
        .iter()
        .map(|line| segment(&line.raw, strategy))
        .filter(|row| !row.is_empty())
        .collect()
}

/// Turns candidate blocks into numbered tables.
pub struct TableBuilder<'a> {
    options: &'a ExtractOptions,
    tables: Vec<Table>,
    warnings: Vec<ExtractWarning>,
}

impl<'a> TableBuilder<'a> {
    #[must_use]
    pub fn new(options: &'a ExtractOptions) -> Self {
        Self {
            options,
            tables: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn wants_fixed_width(&self, block: &CandidateBlock, rows: &[Row]) -> bool {
        self.options.fixed_width_fallback
            && block.strategy == SegmentStrategy::Whitespace
            && rows.iter().all(|row| row.len() <= 1)
            && block
                .lines
                .iter()
                .any(|line| line.trimmed.chars().count() > self.options.fixed_width)
    }

    /// Builds one table from `block`. Blocks with fewer than two usable rows
    /// produce nothing.
    pub fn build(&mut self, block: &CandidateBlock) -> Option<&Table> {
        let mut strategy = block.strategy;
        let mut rows = segment_block(block, strategy);

        if self.wants_fixed_width(block, &rows) {
            strategy = SegmentStrategy::FixedWidth {
                width: self.options.fixed_width,
                columns: self.options.fixed_columns,
            };
            rows = segment_block(block, strategy);
        }

        if rows.len() < 2 {
            debug!(
                start = block.start(),
                rows = rows.len(),
                "block has too few usable rows"
            );
            return None;
        }

        let number = self.tables.len() + 1;
        let mut confidence = table_confidence(&rows);
        if let SegmentStrategy::FixedWidth { width, .. } = strategy {
            confidence = confidence.min(FIXED_WIDTH_CONFIDENCE_CAP);
            warn!(table = number, width, "falling back to fixed-width columns");
            self.warnings.push(
                ExtractWarning::new(
                    WarningCode::FixedWidthFallback,
                    format!("no column gaps found; split lines into {width}-character chunks"),
                )
                .with_table_id(number)
                .with_confidence(confidence),
            );
        }

        let mut rows = rows.into_iter();
        let header = rows.next().unwrap_or_default();
        let table = Table {
            number,
            header,
            body: rows.collect(),
            strategy,
            start: block.start(),
            end: block.end(),
            confidence,
        };

        let ragged = table.ragged_rows();
        if ragged > 0 {
            self.warnings.push(
                ExtractWarning::new(
                    WarningCode::RaggedRows,
                    format!("{ragged} row(s) differ in cell count from the header"),
                )
                .with_table_id(number),
            );
        }
        if confidence < LOW_CONFIDENCE_THRESHOLD {
            self.warnings.push(
                ExtractWarning::new(
                    WarningCode::LowConfidence,
                    "column structure is inconsistent; rendered as-is",
                )
                .with_table_id(number)
                .with_confidence(confidence),
            );
        }

        debug!(
            table = number,
            strategy = strategy.as_str(),
            rows = table.row_count(),
            confidence,
            "built table"
        );
        self.tables.push(table);
        self.tables.last()
    }

    #[must_use]
    pub fn finish(self) -> ExtractionResult {
        let mut warnings = self.warnings;
        if self.tables.is_empty() {
            warnings.push(ExtractWarning::new(
                WarningCode::NoTablesDetected,
                "no table rows were detected in the document text",
            ));
        }

        ExtractionResult {
            tables: self.tables,
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{TableBuilder, table_confidence};
    use crate::model::{CandidateBlock, SegmentStrategy, SourceLine};
    use crate::options::ExtractOptions;
    use crate::warning::WarningCode;

    fn block(lines: &[&str], strategy: SegmentStrategy) -> CandidateBlock {
        CandidateBlock {
            lines: lines
                .iter()
                .enumerate()
                .map(|(position, raw)| SourceLine::new(position + 10, raw))
                .collect(),
            strategy,
        }
    }

    #[test]
    fn first_row_becomes_header() {
        let options = ExtractOptions::default();
        let mut builder = TableBuilder::new(&options);
        let table = builder
            .build(&block(
                &["Vekt  Pris", "1 kg  99", "5 kg  149"],
                SegmentStrategy::Whitespace,
            ))
            .expect("table should build")
            .clone();

        assert_eq!(table.number, 1);
        assert_eq!(table.header, vec!["Vekt", "Pris"]);
        assert_eq!(table.body, vec![vec!["1 kg", "99"], vec!["5 kg", "149"]]);
        assert_eq!((table.start, table.end), (10, 12));
        assert!((table.confidence - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn single_usable_row_yields_nothing() {
        let options = ExtractOptions::default();
        let mut builder = TableBuilder::new(&options);
        let built = builder.build(&block(&["| A | B |", "|---|---|"], SegmentStrategy::Delimiter));
        assert!(built.is_none());

        let result = builder.finish();
        assert!(result.is_empty());
        assert_eq!(result.warnings[0].code, WarningCode::NoTablesDetected);
    }

    #[test]
    fn numbers_tables_in_build_order_skipping_rejected_blocks() {
        let options = ExtractOptions::default();
        let mut builder = TableBuilder::new(&options);
        let good = block(&["A  1", "B  2", "C  3"], SegmentStrategy::Whitespace);
        let bad = block(&["| x |"], SegmentStrategy::Delimiter);

        assert!(builder.build(&good).is_some());
        assert!(builder.build(&bad).is_none());
        assert!(builder.build(&good).is_some());

        let numbers = builder
            .finish()
            .tables
            .iter()
            .map(|table| table.number)
            .collect::<Vec<_>>();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn ragged_rows_pass_through_with_warning() {
        let options = ExtractOptions::default();
        let mut builder = TableBuilder::new(&options);
        builder.build(&block(
            &["Produkt  Sone 1  Sone 2", "Pakke  99", "Brev  12  15  18"],
            SegmentStrategy::Whitespace,
        ));
        let result = builder.finish();

        assert_eq!(result.tables[0].body[0], vec!["Pakke", "99"]);
        assert_eq!(result.tables[0].body[1].len(), 4);
        assert!(
            result
                .warnings
                .iter()
                .any(|warning| warning.code == WarningCode::RaggedRows)
        );
    }

    #[test]
    fn fixed_width_fallback_is_opt_in_and_low_confidence() {
        let lines = [
            "Pakke liten         Sone1 99",
            "Pakke stor          Sone2 199",
            "Pall                Sone3 899",
        ];
        let candidate = block(&lines, SegmentStrategy::Whitespace);

        let options = ExtractOptions::default();
        let mut builder = TableBuilder::new(&options);
        let table = builder.build(&candidate).expect("table").clone();
        assert_eq!(table.header.len(), 2);

        let options = ExtractOptions {
            fixed_width_fallback: true,
            ..ExtractOptions::default()
        };
        let single_column = [
            "Pakke liten xxxxxxxxSone1 99",
            "Pakke stor xxxxxxxxxSone2 199",
            "Pall xxxxxxxxxxxxxxxSone3 899",
        ];
        let mut builder = TableBuilder::new(&options);
        let table = builder
            .build(&block(&single_column, SegmentStrategy::Whitespace))
            .expect("fallback table")
            .clone();
        assert!(matches!(table.strategy, SegmentStrategy::FixedWidth { .. }));
        assert_eq!(table.header, vec!["Pakke liten xxxxxxxx", "Sone1 99"]);
        assert!(table.confidence <= 0.5);

        let result = builder.finish();
        assert!(
            result
                .warnings
                .iter()
                .any(|warning| warning.code == WarningCode::FixedWidthFallback)
        );
    }

    #[test]
    fn confidence_drops_for_inconsistent_widths() {
        let rows = vec![
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            vec!["1".to_string()],
            vec!["2".to_string(), "3".to_string()],
        ];
        assert!(table_confidence(&rows) < 0.6);
    }
}
