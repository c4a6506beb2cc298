//! Tablescrape core: table data model and the pure controller state machine.
mod effect;
mod msg;
mod preview;
mod state;
mod table;
mod target;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use preview::{
    preview_table, table_label, TablePreview, MAX_CELL_CHARS, MAX_PREVIEW_COLS, MAX_PREVIEW_ROWS,
};
pub use state::AppState;
pub use table::{Cell, Column, FetchResult, Table, TableError};
pub use target::{DbKind, DbParams, SaveTarget, UnknownDbKind};
pub use update::update;
pub use view_model::{AppViewModel, StatusLevel, StatusLine};
