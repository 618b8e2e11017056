use crate::model::Table;
use crate::options::Language;
use crate::render::table_label;
use crate::segment::normalize_rows;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MergedOutput {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub table_count: usize,
    pub row_count: usize,
}

/// Flattens all tables into one sheet padded to the widest table. Header
/// rows are kept as data and tagged in the `row_kind` column.
pub(crate) fn merge_tables(tables: &[Table], language: Language) -> MergedOutput {
    let width = tables.iter().map(Table::width).max().unwrap_or(0);

    let mut headers = vec![
        "table_id".to_string(),
        "label".to_string(),
        "row_kind".to_string(),
    ];
    headers.extend((1..=width).map(|index| format!("col_{index}")));

    let mut rows = Vec::new();
    for table in tables {
        let label = table_label(table, language);
        let mut source = Vec::with_capacity(table.body.len() + 1);
        source.push(table.header.clone());
        source.extend(table.body.iter().cloned());

        for (index, data_row) in normalize_rows(&source, width).into_iter().enumerate() {
            let kind = if index == 0 { "header" } else { "body" };
            let mut row = Vec::with_capacity(width + 3);
            row.push(table.number.to_string());
            row.push(label.clone());
            row.push(kind.to_string());
            row.extend(data_row);
            rows.push(row);
        }
    }

    MergedOutput {
        headers,
        row_count: tables.iter().map(Table::row_count).sum(),
        table_count: tables.len(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use crate::merge::merge_tables;
    use crate::model::{SegmentStrategy, Table};
    use crate::options::Language;

    #[test]
    fn merges_and_pads_rows_to_global_schema() {
        let tables = vec![Table {
            number: 1,
            header: vec!["a".to_string(), "b".to_string()],
            body: vec![vec!["c".to_string()]],
            strategy: SegmentStrategy::Whitespace,
            start: 0,
            end: 1,
            confidence: 1.0,
        }];

        let merged = merge_tables(&tables, Language::Norwegian);
        assert_eq!(
            merged.headers,
            vec!["table_id", "label", "row_kind", "col_1", "col_2"]
        );
        assert_eq!(merged.rows[0], vec!["1", "Tabell 1", "header", "a", "b"]);
        assert_eq!(merged.rows[1], vec!["1", "Tabell 1", "body", "c", ""]);
        assert_eq!(merged.row_count, 1);
        assert_eq!(merged.table_count, 1);
    }
}
