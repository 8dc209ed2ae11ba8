//! Error types shared across the engine.
//!
//! Runtime failures (storage, speech, malformed persisted data) are recovered
//! where they happen and only ever logged. The types here exist so backends
//! can report what went wrong, and so the typed API can reject calls that
//! break its contract.

use thiserror::Error;

/// Failures reported by a key/value backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable")]
    Unavailable,
    #[error("storage rejected {op} for {key}: {reason}")]
    Rejected {
        op: &'static str,
        key: String,
        reason: String,
    },
    #[error("snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Contract violations from the typed preference API.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PreferenceError {
    #[error("unknown feature `{0}`")]
    UnknownFeature(String),
    #[error("feature `{key}` expects a {expected} value")]
    KindMismatch { key: String, expected: &'static str },
    #[error("swatch {index} out of range for `{key}`")]
    SwatchOutOfRange { key: String, index: usize },
    #[error("unknown profile `{0}`")]
    UnknownProfile(String),
    #[error("unknown control `{0}`")]
    UnknownControl(String),
}

/// A persisted string that could not be coerced to the expected type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("malformed value {raw:?} for {key}")]
pub struct MalformedValue {
    pub key: String,
    pub raw: String,
}

/// Errors raised when overlay configuration invariants are violated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be between {min} and {max} (got {value})")]
    RangeViolation {
        field: &'static str,
        min: u64,
        max: u64,
        value: u64,
    },
    #[error("shortcut key must not be empty")]
    EmptyShortcut,
    #[error("open attribute must start with `data-` (got {0:?})")]
    OpenAttribute(String),
    #[error("unknown log level {0:?}")]
    LogLevel(String),
}
