//! Domain error types
//!
//! This module defines the error hierarchy for Catalog Sync. Store-specific
//! failures are wrapped into domain enums so third-party driver types never
//! leak past the adapter layer.

use thiserror::Error;

/// Main Catalog Sync error type
///
/// This is the primary error type used throughout the application.
/// It wraps the source, target and transform error families and provides
/// context for the pipeline runner to classify.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Source document store errors
    #[error("Source store error: {0}")]
    Source(#[from] SourceError),

    /// Target relational store errors
    #[error("Target store error: {0}")]
    Target(#[from] TargetError),

    /// Record transformation errors
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Source store errors
///
/// Errors raised while counting or paging through source collections.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Failed to connect to the source store
    #[error("Failed to connect to source store: {0}")]
    ConnectionFailed(String),

    /// Database or collection is not known to the source store
    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    /// Count or find operation failed
    #[error("Query failed: {0}")]
    QueryFailed(String),
}

/// Target store errors
#[derive(Debug, Error)]
pub enum TargetError {
    /// Failed to connect to the target store
    #[error("Failed to connect to target store: {0}")]
    ConnectionFailed(String),

    /// No pooled connection became available in time
    #[error("Connection pool exhausted: {0}")]
    PoolExhausted(String),

    /// Query returning rows failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Statement execution failed
    #[error("Statement execution failed: {0}")]
    ExecFailed(String),

    /// Transaction commit failed; its effects were discarded
    #[error("Commit failed: {0}")]
    CommitFailed(String),

    /// A result column has a type the engine cannot represent
    #[error("Unsupported column type '{column_type}' for column {column}")]
    UnsupportedColumnType { column: String, column_type: String },

    /// The transaction handle was used after commit or rollback
    #[error("Transaction already closed")]
    TransactionClosed,
}

/// Record transformation errors
///
/// Always scoped to a single record; never fatal to a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// A field was missing or had the wrong shape
    #[error("Malformed field '{field}': expected {expected}")]
    MalformedField {
        field: String,
        expected: &'static str,
    },
}

impl TransformError {
    /// Creates a malformed field error
    pub fn malformed(field: impl Into<String>, expected: &'static str) -> Self {
        TransformError::MalformedField {
            field: field.into(),
            expected,
        }
    }
}

impl SyncError {
    /// Short machine-readable label used in structured log fields
    pub fn kind(&self) -> &'static str {
        match self {
            SyncError::Configuration(_) => "configuration",
            SyncError::Source(SourceError::NotFound { .. }) => "configuration",
            SyncError::Source(_) => "transient_store",
            SyncError::Target(_) => "transient_store",
            SyncError::Transform(_) => "malformed_field",
            SyncError::Io(_) => "io",
            SyncError::Other(_) => "other",
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::Io(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::Configuration(format!("TOML parse error: {err}"))
    }
}
