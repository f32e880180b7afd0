//! Error types for borderhub-core.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HubError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A mandatory result file is missing from the data directory.
    #[error("Required data file not found: {}", path.display())]
    DataUnavailable { path: PathBuf },

    #[error("No data for selected borders.")]
    EmptySelection,

    #[error("Optional dataset not present: {0}")]
    OptionalDataMissing(String),

    #[error("{file}: missing column '{column}'")]
    MissingColumn { file: String, column: String },

    #[error("{file}: line {line}, column '{column}': cannot parse '{value}'")]
    InvalidValue {
        file: String,
        line: usize,
        column: String,
        value: String,
    },

    #[error("Unknown decay parameter '{0}' (expected 0.02, 0.03 or 0.05)")]
    UnknownDecay(String),

    #[error("Unknown aggregation '{0}' (expected sum, mean or count)")]
    UnknownAggregation(String),

    #[error("Unknown dataset: {0}")]
    UnknownDataset(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Slide deck is empty")]
    EmptyDeck,
}

impl HubError {
    /// True for failures caused by the data directory rather than the request.
    pub fn is_data_problem(&self) -> bool {
        matches!(
            self,
            HubError::DataUnavailable { .. }
                | HubError::MissingColumn { .. }
                | HubError::InvalidValue { .. }
                | HubError::Csv(_)
                | HubError::Io(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, HubError>;
