use std::borrow::Cow;
use std::fmt;

use serde::{Serialize, Serializer};

/// Ordered tables found on one page.
pub type FetchResult = Vec<Table>;

/// A single cell value. Types are inferred per column at extraction time.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Numeric value, if the cell holds one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(v) => Some(*v as f64),
            Cell::Float(v) => Some(*v),
            Cell::Empty | Cell::Text(_) => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Int(v) => write!(f, "{v}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Empty => serializer.serialize_none(),
            Cell::Int(v) => serializer.serialize_i64(*v),
            Cell::Float(v) if v.is_finite() => serializer.serialize_f64(*v),
            Cell::Float(_) => serializer.serialize_none(),
            Cell::Text(s) => serializer.serialize_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    cells: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            cells,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("column {column:?} has {actual} cells, expected {expected}")]
    RaggedColumn {
        column: String,
        expected: usize,
        actual: usize,
    },
}

/// Named columns of equal length. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        let row_count = columns.first().map_or(0, |c| c.cells.len());
        if let Some(bad) = columns.iter().find(|c| c.cells.len() != row_count) {
            return Err(TableError::RaggedColumn {
                column: bad.name.clone(),
                expected: row_count,
                actual: bad.cells.len(),
            });
        }
        Ok(Self { columns, row_count })
    }

    /// Builds a table from raw cell text, padding short rows and inferring
    /// a cell type per column. Without a header the columns are named by
    /// position (`0`, `1`, ...), as are columns the header does not cover.
    pub fn from_text_rows(header: Option<Vec<String>>, rows: Vec<Vec<String>>) -> Self {
        let header = header.unwrap_or_default();
        let width = rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(header.len()))
            .max()
            .unwrap_or(0);

        let mut texts: Vec<Vec<String>> = vec![Vec::with_capacity(rows.len()); width];
        for row in rows {
            let len = row.len();
            for (idx, text) in row.into_iter().enumerate() {
                texts[idx].push(text);
            }
            for column in texts.iter_mut().skip(len) {
                column.push(String::new());
            }
        }

        let mut header = header.into_iter();
        let columns = texts
            .into_iter()
            .enumerate()
            .map(|(idx, column)| {
                let name = header.next().unwrap_or_else(|| idx.to_string());
                Column::new(name, infer_cells(column))
            })
            .collect::<Vec<_>>();
        let row_count = columns.first().map_or(0, |c| c.cells.len());
        Self { columns, row_count }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(Column::name)
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Cell> {
        self.columns.get(column)?.cells.get(row)
    }

    /// Iterates rows as borrowed cells in column order.
    pub fn rows(&self) -> impl Iterator<Item = Vec<&Cell>> + '_ {
        (0..self.row_count).map(move |row| self.columns.iter().map(|c| &c.cells[row]).collect())
    }

    /// First column name that occurs more than once.
    pub fn duplicate_column_name(&self) -> Option<&str> {
        self.columns.iter().enumerate().find_map(|(idx, column)| {
            self.columns[..idx]
                .iter()
                .any(|earlier| earlier.name == column.name)
                .then_some(column.name.as_str())
        })
    }
}

fn infer_cells(texts: Vec<String>) -> Vec<Cell> {
    let mut filled = texts.iter().filter(|t| !t.is_empty()).peekable();
    if filled.peek().is_none() {
        return texts.into_iter().map(|_| Cell::Empty).collect();
    }

    if filled.clone().all(|t| parse_int(t).is_some()) {
        return texts
            .iter()
            .map(|t| parse_int(t).map_or(Cell::Empty, Cell::Int))
            .collect();
    }
    // An integer too wide for i64 would lose digits as a float.
    if filled.all(|t| parse_float(t).is_some() && !is_wide_integer(t)) {
        return texts
            .iter()
            .map(|t| parse_float(t).map_or(Cell::Empty, Cell::Float))
            .collect();
    }
    texts
        .into_iter()
        .map(|t| if t.is_empty() { Cell::Empty } else { Cell::Text(t) })
        .collect()
}

fn parse_int(text: &str) -> Option<i64> {
    strip_thousands(text)?.parse().ok()
}

fn is_wide_integer(text: &str) -> bool {
    let Some(stripped) = strip_thousands(text) else {
        return false;
    };
    let digits = stripped.trim_start_matches(['-', '+']);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) && parse_int(text).is_none()
}

fn parse_float(text: &str) -> Option<f64> {
    // Keeps words like "inf" or "NaN" as text.
    if !text.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    strip_thousands(text)?.parse().ok()
}

/// Removes `,` separators when they sit between three-digit groups.
fn strip_thousands(text: &str) -> Option<Cow<'_, str>> {
    if !text.contains(',') {
        return Some(Cow::Borrowed(text));
    }
    let (int_part, frac) = match text.split_once('.') {
        Some((int_part, frac)) => (int_part, frac),
        None => (text, ""),
    };
    if frac.contains(',') {
        return None;
    }
    let digits = int_part
        .strip_prefix('-')
        .or_else(|| int_part.strip_prefix('+'))
        .unwrap_or(int_part);
    let mut groups = digits.split(',');
    let lead = groups.next()?;
    if lead.is_empty() || lead.len() > 3 || !lead.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !groups.all(|g| g.len() == 3 && g.bytes().all(|b| b.is_ascii_digit())) {
        return None;
    }
    Some(Cow::Owned(text.replace(',', "")))
}

#[cfg(test)]
mod tests {
    use super::{is_wide_integer, parse_float, parse_int, strip_thousands};

    #[test]
    fn thousands_separators_accepted_between_groups() {
        assert_eq!(parse_int("1,234,567"), Some(1_234_567));
        assert_eq!(parse_int("-12,000"), Some(-12_000));
        assert_eq!(parse_float("1,234.5"), Some(1234.5));
    }

    #[test]
    fn wide_integers_are_detected() {
        assert!(is_wide_integer("12345678901234567890"));
        assert!(is_wide_integer("-99,999,999,999,999,999,999"));
        assert!(!is_wide_integer("9223372036854775807"));
        assert!(!is_wide_integer("1.5"));
    }

    #[test]
    fn misplaced_commas_are_not_numbers() {
        assert!(strip_thousands("1,23").is_none());
        assert!(strip_thousands("12,3456").is_none());
        assert!(strip_thousands("a,bcd").is_none());
        assert_eq!(parse_int("3,14"), None);
    }

    #[test]
    fn words_are_not_floats() {
        assert_eq!(parse_float("inf"), None);
        assert_eq!(parse_float("NaN"), None);
        assert_eq!(parse_float("1e3"), Some(1000.0));
    }
}
