use crate::{FetchResult, SaveTarget};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User asked to fetch tables from a URL.
    UrlSubmitted(String),
    /// Background fetch finished with zero or more tables.
    TablesFetched(FetchResult),
    /// Background fetch failed; carries the readable cause.
    FetchFailed(String),
    /// User picked a table from the list (0-based).
    TableSelected(usize),
    /// User asked to save the selected table.
    SaveRequested(SaveTarget),
    /// Background save finished; carries the destination description.
    SaveCompleted(String),
    /// Background save failed; carries the readable cause.
    SaveFailed(String),
    /// The chosen destination has no implementation.
    SaveNotImplemented(String),
    /// Fallback for placeholder wiring.
    NoOp,
}
