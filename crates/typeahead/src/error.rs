//! Error types for the suggestion widget.

use std::path::PathBuf;

use typeahead_core::CoreError;

/// Result type alias for suggestion widget operations.
pub type Result<T> = std::result::Result<T, SuggestError>;

/// Errors that can occur in the suggestion widget.
#[derive(Debug, thiserror::Error)]
pub enum SuggestError {
    /// A row index past the end of the current suggestions.
    #[error("row {index} is out of range for {len} suggestions")]
    IndexOutOfRange { index: usize, len: usize },

    /// The search executor rejected a lookup.
    #[error("search executor unavailable: {0}")]
    ExecutorUnavailable(#[source] CoreError),

    /// Runtime error while setting up the widget.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Options file could not be read.
    #[error("failed to read options file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Options were not valid TOML for [`SuggestOptions`](crate::SuggestOptions).
    #[error("invalid TOML options: {0}")]
    Toml(#[from] toml::de::Error),

    /// Options could not be rendered as TOML.
    #[error("failed to serialize options: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Options were not valid JSON for [`SuggestOptions`](crate::SuggestOptions).
    #[error("invalid JSON options: {0}")]
    Json(#[from] serde_json::Error),
}

impl SuggestError {
    /// Create an index error.
    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }

    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
