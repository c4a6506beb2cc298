use tablescrape_core::{DbKind, DbParams, Table};
use tablescrape_logging::scrape_warn;

use crate::SaveError;

/// Database export is not wired up for any backend. Nothing connects, and
/// the caller always receives `SaveError::NotImplemented`.
pub fn save_to_database(table: &Table, kind: DbKind, params: &DbParams) -> Result<(), SaveError> {
    scrape_warn!(
        "Refusing to save {} rows to {} table {:?} on {}: not implemented",
        table.row_count(),
        kind,
        params.table_name,
        params.host
    );
    Err(SaveError::NotImplemented { backend: kind })
}
