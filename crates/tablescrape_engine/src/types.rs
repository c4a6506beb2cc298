use std::fmt;
use std::path::PathBuf;

use tablescrape_core::DbKind;

/// Raw page as retrieved, before decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub bytes: Vec<u8>,
    pub final_url: String,
    pub content_type: Option<String>,
}

/// The one failure shape of a fetch. `kind` classifies, `message` carries
/// the underlying cause's description.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    UnsupportedScheme(String),
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    Decode,
    LocalFile,
    Runtime,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::UnsupportedScheme(scheme) => write!(f, "unsupported scheme {scheme}"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            FailureKind::Decode => write!(f, "undecodable document"),
            FailureKind::LocalFile => write!(f, "unreadable local file"),
            FailureKind::Runtime => write!(f, "runtime error"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("could not save table to {}: {cause}", path.display())]
    Failed {
        path: PathBuf,
        #[source]
        cause: SaveCause,
    },
    #[error("saving to {backend} is not implemented")]
    NotImplemented { backend: DbKind },
}

impl SaveError {
    pub(crate) fn failed(path: impl Into<PathBuf>, cause: impl Into<SaveCause>) -> Self {
        SaveError::Failed {
            path: path.into(),
            cause: cause.into(),
        }
    }

    /// Distinguishes the database stub from real failures.
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, SaveError::NotImplemented { .. })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SaveCause {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("workbook error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("column name {0:?} appears more than once; JSON records need unique keys")]
    DuplicateColumn(String),
}
