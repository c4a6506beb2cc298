use std::sync::Arc;

use crate::{SaveTarget, Table};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Retrieve every table at `url` in the background.
    FetchTables { url: String },
    /// Write one table to its destination in the background.
    SaveTable {
        table: Arc<Table>,
        target: SaveTarget,
    },
}
