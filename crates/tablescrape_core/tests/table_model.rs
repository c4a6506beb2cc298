use pretty_assertions::assert_eq;
use tablescrape_core::{
    preview_table, table_label, Cell, Column, Table, TableError, MAX_CELL_CHARS, MAX_PREVIEW_COLS,
    MAX_PREVIEW_ROWS,
};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[test]
fn ragged_columns_are_rejected() {
    let err = Table::new(vec![
        Column::new("a", vec![Cell::Int(1), Cell::Int(2)]),
        Column::new("b", vec![Cell::Int(3)]),
    ])
    .unwrap_err();
    assert_eq!(
        err,
        TableError::RaggedColumn {
            column: "b".into(),
            expected: 2,
            actual: 1
        }
    );
}

#[test]
fn text_rows_are_padded_and_typed_per_column() {
    let table = Table::from_text_rows(
        Some(strings(&["id", "score", "name"])),
        vec![
            strings(&["1", "2.5", "Ann"]),
            strings(&["2", "", "Bob"]),
            strings(&["3"]),
        ],
    );

    assert_eq!(table.row_count(), 3);
    assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["id", "score", "name"]);
    assert_eq!(table.cell(2, 0), Some(&Cell::Int(3)));
    assert_eq!(table.cell(0, 1), Some(&Cell::Float(2.5)));
    assert_eq!(table.cell(1, 1), Some(&Cell::Empty));
    assert_eq!(table.cell(0, 2), Some(&Cell::Text("Ann".into())));
    assert_eq!(table.cell(2, 2), Some(&Cell::Empty));
}

#[test]
fn mixed_column_stays_text() {
    let table = Table::from_text_rows(None, vec![strings(&["1"]), strings(&["n/a"])]);
    assert_eq!(table.cell(0, 0), Some(&Cell::Text("1".into())));
    assert_eq!(table.cell(1, 0), Some(&Cell::Text("n/a".into())));
}

#[test]
fn integers_wider_than_i64_keep_every_digit() {
    let table = Table::from_text_rows(
        Some(strings(&["id", "score"])),
        vec![
            strings(&["12345678901234567890", "1.5"]),
            strings(&["7", "2"]),
        ],
    );
    assert_eq!(
        table.cell(0, 0),
        Some(&Cell::Text("12345678901234567890".into()))
    );
    assert_eq!(table.cell(1, 0), Some(&Cell::Text("7".into())));
    assert_eq!(table.cell(0, 1), Some(&Cell::Float(1.5)));
    assert_eq!(table.cell(1, 1), Some(&Cell::Float(2.0)));
}

#[test]
fn missing_header_uses_positions() {
    let table = Table::from_text_rows(Some(strings(&["x"])), vec![strings(&["a", "b", "c"])]);
    assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["x", "1", "2"]);
}

#[test]
fn duplicate_names_are_allowed_but_detectable() {
    let table = Table::from_text_rows(Some(strings(&["a", "b", "a"])), vec![]);
    assert_eq!(table.column_count(), 3);
    assert_eq!(table.row_count(), 0);
    assert_eq!(table.duplicate_column_name(), Some("a"));
}

#[test]
fn cells_serialize_as_json_values() {
    let cells = vec![
        Cell::Empty,
        Cell::Int(7),
        Cell::Float(1.5),
        Cell::Float(f64::NAN),
        Cell::Text("x".into()),
    ];
    assert_eq!(
        serde_json::to_string(&cells).unwrap(),
        r#"[null,7,1.5,null,"x"]"#
    );
}

#[test]
fn preview_is_bounded() {
    let header: Vec<String> = (0..12).map(|i| format!("c{i}")).collect();
    let long = "x".repeat(MAX_CELL_CHARS + 20);
    let rows: Vec<Vec<String>> = (0..15)
        .map(|_| (0..12).map(|_| long.clone()).collect())
        .collect();
    let table = Table::from_text_rows(Some(header), rows);

    let preview = preview_table(0, &table);
    assert_eq!(preview.columns.len(), MAX_PREVIEW_COLS);
    assert_eq!(preview.rows.len(), MAX_PREVIEW_ROWS);
    assert!(preview.rows.iter().all(|r| r.len() == MAX_PREVIEW_COLS));
    assert_eq!(preview.rows[0][0].len(), MAX_CELL_CHARS);
    assert_eq!(preview.summary, "Previewing table 1: 15 rows × 12 cols");
    assert_eq!(table_label(2, &table), "Table 3: 15 rows × 12 cols");
}
