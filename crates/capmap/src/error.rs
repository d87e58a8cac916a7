//! Crate-wide error type.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot read sizing bounds from {path}: {source}")]
    BoundsRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid sizing bounds: {0}")]
    InvalidBounds(String),
    #[error("unknown dimension: {0}")]
    UnknownDimension(String),
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
    #[error("health source {source_name}: {reason}")]
    HealthSource { source_name: String, reason: String },
    #[error("command `{command}` failed: {reason}")]
    Command { command: String, reason: String },
    #[error("result sink: {0}")]
    Sink(String),
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid_bounds(reason: impl Into<String>) -> Self {
        Self::InvalidBounds(reason.into())
    }

    pub(crate) fn invalid_settings(reason: impl Into<String>) -> Self {
        Self::InvalidSettings(reason.into())
    }
}
