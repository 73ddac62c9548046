//! Error types for the account lifecycle controller
//!
//! Each concern gets its own thiserror enum. `LifecycleError` is what a
//! reconciliation returns to the hosting runtime; the runtime decides whether
//! to redeliver the event.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by a single reconciliation
#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("Invalid account '{identifier}': missing correlation label '{label}'")]
    MissingCorrelationKey { identifier: String, label: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors reported by an account store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Account '{identifier}' not found")]
    NotFound { identifier: String },

    #[error("Conflict updating '{identifier}': expected version {expected}, found {found}")]
    Conflict {
        identifier: String,
        expected: u64,
        found: u64,
    },

    #[error("Store backend error: {message}")]
    Backend { message: String },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config value '{key}' is empty")]
    Empty { key: String },

    #[error("Missing environment variable {var}")]
    MissingEnv { var: String },

    #[error("Invalid value for '{key}': {value}")]
    Invalid { key: String, value: String },
}

/// Failures while talking to the identity directory.
///
/// These never escape `IdentityVerifier::verify`: every variant is treated as
/// "still active".
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("Invalid directory URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Directory request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Directory returned status {0}")]
    Status(u16),

    #[error("Directory returned an empty body")]
    EmptyBody,

    #[error("Malformed directory response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Directory reported {total} matches but returned no resources")]
    MissingResource { total: i64 },
}

pub type StoreResult<T> = Result<T, StoreError>;
pub type LifecycleResult<T> = Result<T, LifecycleError>;
