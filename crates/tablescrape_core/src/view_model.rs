use crate::TablePreview;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusLevel {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub level: StatusLevel,
}

impl StatusLine {
    pub fn new(level: StatusLevel, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level,
        }
    }
}

impl Default for StatusLine {
    fn default() -> Self {
        Self::new(StatusLevel::Info, "Ready")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub status: StatusLine,
    pub table_labels: Vec<String>,
    pub selected: Option<usize>,
    pub preview: Option<TablePreview>,
    pub fetch_enabled: bool,
    pub saves_in_flight: usize,
    pub dirty: bool,
}
