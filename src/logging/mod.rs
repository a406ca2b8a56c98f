//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console output for operators
//! - JSON-formatted local log files with daily or hourly rotation
//! - Configurable log levels, overridable through `RUST_LOG`
//!
//! # Example
//!
//! ```no_run
//! use catalog_sync::logging::init_logging;
//! use catalog_sync::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(entity = "shop", "Pipeline started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of a pass over a collection
///
/// # Example
///
/// ```no_run
/// use catalog_sync::log_pass_start;
/// use catalog_sync::domain::{EntityKind, PassId};
///
/// let pass_id = PassId::generate();
/// log_pass_start!(EntityKind::Shop, &pass_id, 2500u64);
/// ```
#[macro_export]
macro_rules! log_pass_start {
    ($entity:expr, $pass_id:expr, $total:expr) => {
        tracing::info!(
            entity = %$entity,
            pass_id = %$pass_id,
            total = $total,
            "Starting pass"
        );
    };
}

/// Log a record that could not be synchronized
///
/// # Example
///
/// ```no_run
/// use catalog_sync::log_record_failure;
/// use catalog_sync::domain::{EntityKind, SyncError};
///
/// let error = SyncError::Other("boom".to_string());
/// log_record_failure!(EntityKind::Offer, "o-1", 1000u64, &error);
/// ```
#[macro_export]
macro_rules! log_record_failure {
    ($entity:expr, $record_id:expr, $offset:expr, $error:expr) => {
        tracing::warn!(
            entity = %$entity,
            record_id = %$record_id,
            offset = $offset,
            error_kind = $error.kind(),
            error = %$error,
            "Record failed, continuing"
        );
    };
}

/// Log progress through the pages of a pass
///
/// # Example
///
/// ```no_run
/// use catalog_sync::log_page_progress;
///
/// log_page_progress!("offer", 2000u64, 4321u64);
/// ```
#[macro_export]
macro_rules! log_page_progress {
    ($entity:expr, $offset:expr, $total:expr) => {
        tracing::debug!(
            entity = %$entity,
            offset = $offset,
            total = $total,
            progress_pct = ($offset as f64 / ($total as f64).max(1.0) * 100.0),
            "Fetching page"
        );
    };
}
