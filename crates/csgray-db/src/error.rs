//! Error types for database loading.

use std::path::PathBuf;

use csgray_rt::FatalError;
use thiserror::Error;

/// Errors that can occur while loading or building a model.
#[derive(Error, Debug)]
pub enum DbError {
    /// The database file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// TOML syntax or schema error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON syntax or schema error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File extension is neither `.toml` nor `.json`.
    #[error("unsupported database format: {0}")]
    UnknownFormat(String),

    /// A region tree names a solid that is not in the database.
    #[error("region '{region}' references unknown solid '{solid}'")]
    UnknownSolid {
        /// Region name.
        region: String,
        /// Missing solid name.
        solid: String,
    },

    /// A solid record is structurally wrong.
    #[error("solid '{name}': {reason}")]
    BadRecord {
        /// Solid name.
        name: String,
        /// What was wrong.
        reason: String,
    },

    /// The ray-tracing core rejected the model.
    #[error(transparent)]
    Rt(#[from] FatalError),
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DbError>;
