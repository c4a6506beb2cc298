use crate::Table;

pub const MAX_PREVIEW_ROWS: usize = 10;
pub const MAX_PREVIEW_COLS: usize = 8;
pub const MAX_CELL_CHARS: usize = 100;

/// The visible corner of a table, already rendered to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePreview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub summary: String,
}

/// Label used in the table list, e.g. `Table 1: 3 rows × 2 cols`.
pub fn table_label(index: usize, table: &Table) -> String {
    format!("Table {}: {}", index + 1, shape(table))
}

pub fn preview_table(index: usize, table: &Table) -> TablePreview {
    let columns = table
        .column_names()
        .take(MAX_PREVIEW_COLS)
        .map(|name| truncate_chars(name, MAX_CELL_CHARS))
        .collect();
    let rows = table
        .rows()
        .take(MAX_PREVIEW_ROWS)
        .map(|row| {
            row.into_iter()
                .take(MAX_PREVIEW_COLS)
                .map(|cell| truncate_chars(&cell.to_string(), MAX_CELL_CHARS))
                .collect()
        })
        .collect();
    TablePreview {
        columns,
        rows,
        summary: format!("Previewing table {}: {}", index + 1, shape(table)),
    }
}

fn shape(table: &Table) -> String {
    format!(
        "{} rows × {} cols",
        table.row_count(),
        table.column_count()
    )
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}
