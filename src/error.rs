// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("failed to load data from {}: {reason}", path.display())]
    DataLoad { path: PathBuf, reason: String },
    #[error("insufficient data: at least 2 observations are required, got {0}")]
    InsufficientData(usize),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to write chart to {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize chart: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl AnalysisError {
    pub fn data_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        AnalysisError::DataLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
