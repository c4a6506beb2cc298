use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use rust_xlsxwriter::{Workbook, XlsxError};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use tablescrape_core::{Cell, SaveTarget, Table};
use tablescrape_logging::scrape_info;

use crate::db::save_to_database;
use crate::{SaveCause, SaveError};

/// File encoding chosen from a destination path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Workbook,
    Json,
}

impl OutputFormat {
    /// Case-insensitive extension dispatch. No extension and unknown
    /// extensions both mean CSV.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("xlsx" | "xls") => OutputFormat::Workbook,
            Some("json") => OutputFormat::Json,
            _ => OutputFormat::Csv,
        }
    }
}

/// Saves to whichever destination `target` names.
pub fn save(table: &Table, target: &SaveTarget) -> Result<(), SaveError> {
    match target {
        SaveTarget::File(path) => save_table(table, path),
        SaveTarget::Database { kind, params } => save_to_database(table, *kind, params),
    }
}

/// Writes `table` to `path`, overwriting any existing file. The path is used
/// exactly as given. A failed write may leave a partial file behind.
pub fn save_table(table: &Table, path: &Path) -> Result<(), SaveError> {
    let format = OutputFormat::from_path(path);
    let result = match format {
        OutputFormat::Csv => write_csv(table, path),
        OutputFormat::Workbook => write_workbook(table, path),
        OutputFormat::Json => write_json(table, path),
    };
    result.map_err(|cause| SaveError::failed(path, cause))?;
    scrape_info!(
        "Saved {} rows × {} cols to {} as {:?}",
        table.row_count(),
        table.column_count(),
        path.display(),
        format
    );
    Ok(())
}

fn write_csv(table: &Table, path: &Path) -> Result<(), SaveCause> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(table.column_names())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|cell| cell.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

fn write_workbook(table: &Table, path: &Path) -> Result<(), SaveCause> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Sheet1")?;

    for (col_idx, column) in table.columns().iter().enumerate() {
        let col = u16::try_from(col_idx).map_err(|_| XlsxError::RowColumnLimitError)?;
        sheet.write_string(0, col, column.name())?;
        for (row_idx, cell) in column.cells().iter().enumerate() {
            let row = u32::try_from(row_idx + 1).map_err(|_| XlsxError::RowColumnLimitError)?;
            match cell {
                Cell::Empty => {}
                Cell::Int(_) | Cell::Float(_) => {
                    if let Some(value) = cell.as_f64().filter(|v| v.is_finite()) {
                        sheet.write_number(row, col, value)?;
                    }
                }
                Cell::Text(text) => {
                    sheet.write_string(row, col, text)?;
                }
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}

fn write_json(table: &Table, path: &Path) -> Result<(), SaveCause> {
    if let Some(name) = table.duplicate_column_name() {
        return Err(SaveCause::DuplicateColumn(name.to_string()));
    }
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut out, &Records(table))?;
    out.flush()?;
    Ok(())
}

/// A table serialized as an array of `{column: value}` objects.
struct Records<'a>(&'a Table);

struct Record<'a> {
    table: &'a Table,
    row: usize,
}

impl Serialize for Records<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.row_count()))?;
        for row in 0..self.0.row_count() {
            seq.serialize_element(&Record {
                table: self.0,
                row,
            })?;
        }
        seq.end()
    }
}

impl Serialize for Record<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let columns = self.table.columns();
        let mut map = serializer.serialize_map(Some(columns.len()))?;
        for column in columns {
            map.serialize_entry(column.name(), &column.cells()[self.row])?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::OutputFormat;
    use std::path::Path;

    #[test]
    fn extension_dispatch_is_case_insensitive() {
        assert_eq!(OutputFormat::from_path(Path::new("a.CSV")), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_path(Path::new("a.Xlsx")), OutputFormat::Workbook);
        assert_eq!(OutputFormat::from_path(Path::new("a.xls")), OutputFormat::Workbook);
        assert_eq!(OutputFormat::from_path(Path::new("a.JSON")), OutputFormat::Json);
    }

    #[test]
    fn missing_or_unknown_extension_means_csv() {
        assert_eq!(OutputFormat::from_path(Path::new("out")), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_path(Path::new("out.xyz")), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_path(Path::new(".hidden")), OutputFormat::Csv);
    }
}
