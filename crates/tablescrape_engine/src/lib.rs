//! Tablescrape engine: page retrieval, table extraction, saving and background tasks.
mod db;
mod decode;
mod fetch;
mod runner;
mod save;
mod tables;
mod types;

pub use db::save_to_database;
pub use decode::{decode_html, DecodeError, DecodedHtml};
pub use fetch::{fetch_tables, FetchSettings, PageFetcher, ReqwestFetcher, TableFetcher};
pub use runner::{run_background, TaskFailure, TaskHandle};
pub use save::{save, save_table, OutputFormat};
pub use tables::{HtmlTableExtractor, TableExtractor};
pub use types::{FailureKind, FetchError, FetchedPage, SaveCause, SaveError};
