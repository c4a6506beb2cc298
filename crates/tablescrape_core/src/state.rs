use std::sync::Arc;

use crate::view_model::{AppViewModel, StatusLevel, StatusLine};
use crate::{preview_table, table_label, FetchResult, Table};

/// Controller-owned state. Only the thread running `update` touches it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    tables: Vec<Arc<Table>>,
    selected: Option<usize>,
    fetch_in_flight: bool,
    saves_in_flight: usize,
    status: StatusLine,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        let preview = self
            .selected_table()
            .zip(self.selected)
            .map(|(table, index)| preview_table(index, table));
        AppViewModel {
            status: self.status.clone(),
            table_labels: self
                .tables
                .iter()
                .enumerate()
                .map(|(idx, table)| table_label(idx, table))
                .collect(),
            selected: self.selected,
            preview,
            fetch_enabled: !self.fetch_in_flight,
            saves_in_flight: self.saves_in_flight,
            dirty: self.dirty,
        }
    }

    pub fn tables(&self) -> &[Arc<Table>] {
        &self.tables
    }

    pub fn selected_table(&self) -> Option<&Arc<Table>> {
        self.selected.and_then(|idx| self.tables.get(idx))
    }

    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    /// True while a fetch or any save is outstanding.
    pub fn is_busy(&self) -> bool {
        self.fetch_in_flight || self.saves_in_flight > 0
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn fetch_in_flight(&self) -> bool {
        self.fetch_in_flight
    }

    pub(crate) fn begin_fetch(&mut self) {
        self.fetch_in_flight = true;
        self.set_status(StatusLevel::Info, "Fetching tables...");
    }

    pub(crate) fn finish_fetch(&mut self, tables: FetchResult) {
        self.fetch_in_flight = false;
        self.tables = tables.into_iter().map(Arc::new).collect();
        self.selected = if self.tables.is_empty() { None } else { Some(0) };
        let found = format!("Found {} table(s)", self.tables.len());
        self.set_status(StatusLevel::Success, found);
    }

    pub(crate) fn fail_fetch(&mut self, message: &str) {
        self.fetch_in_flight = false;
        self.set_status(
            StatusLevel::Error,
            format!("Could not fetch tables: {message}"),
        );
    }

    pub(crate) fn select(&mut self, index: usize) -> bool {
        if index >= self.tables.len() {
            return false;
        }
        self.selected = Some(index);
        self.mark_dirty();
        true
    }

    pub(crate) fn begin_save(&mut self) {
        self.saves_in_flight += 1;
        self.set_status(StatusLevel::Info, "Saving...");
    }

    pub(crate) fn finish_save(&mut self, level: StatusLevel, text: String) {
        self.saves_in_flight = self.saves_in_flight.saturating_sub(1);
        self.set_status(level, text);
    }

    pub(crate) fn set_status(&mut self, level: StatusLevel, text: impl Into<String>) {
        self.status = StatusLine::new(level, text);
        self.mark_dirty();
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
