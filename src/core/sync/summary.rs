//! Pass summary and reporting
//!
//! This module defines the structure tracking the result of one pass over a
//! collection.

use crate::core::metrics::CounterSnapshot;
use crate::domain::{EntityKind, PassId};
use chrono::{DateTime, Utc};

/// Summary of one pass over a collection
#[derive(Debug, Clone)]
pub struct PassSummary {
    /// Pass identifier, also present on every log line of the pass
    pub pass_id: PassId,

    /// Entity kind synchronized
    pub entity: EntityKind,

    /// When the pass started
    pub started_at: DateTime<Utc>,

    /// When the pass ended, successfully or not
    pub finished_at: Option<DateTime<Utc>>,

    /// Document count taken at the start of the pass
    pub total_count: u64,

    /// Pages fetched
    pub pages: u64,

    /// Records committed
    pub succeeded: u64,

    /// Records rejected or rolled back
    pub failed: u64,

    /// The pass stopped early because of a shutdown signal
    pub interrupted: bool,

    /// Why the pass was abandoned, if it was
    pub abort_reason: Option<String>,

    /// Running counters for the entity kind when the pass ended
    pub totals: CounterSnapshot,
}

impl PassSummary {
    /// Create a new summary for a pass that is starting now
    pub fn new(entity: EntityKind) -> Self {
        Self {
            pass_id: PassId::generate(),
            entity,
            started_at: Utc::now(),
            finished_at: None,
            total_count: 0,
            pages: 0,
            succeeded: 0,
            failed: 0,
            interrupted: false,
            abort_reason: None,
            totals: CounterSnapshot::default(),
        }
    }

    /// Records processed so far
    pub fn processed(&self) -> u64 {
        self.succeeded + self.failed
    }

    /// Mark the pass as finished
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Mark the pass as abandoned
    pub fn abort(&mut self, reason: impl Into<String>) {
        self.abort_reason = Some(reason.into());
        self.finish();
    }

    /// Get success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.processed() == 0 {
            return 100.0;
        }
        (self.succeeded as f64 / self.processed() as f64) * 100.0
    }

    /// Elapsed time of the pass in milliseconds
    pub fn duration_ms(&self) -> i64 {
        let end = self.finished_at.unwrap_or_else(Utc::now);
        (end - self.started_at).num_milliseconds()
    }

    /// Log the summary
    pub fn log_summary(&self) {
        if let Some(reason) = &self.abort_reason {
            tracing::warn!(
                entity = %self.entity,
                pass_id = %self.pass_id,
                processed = self.processed(),
                total = self.total_count,
                reason = %reason,
                success_total = self.totals.success,
                failed_total = self.totals.failed,
                "Pass aborted, restarting from a fresh count"
            );
            return;
        }

        tracing::info!(
            entity = %self.entity,
            pass_id = %self.pass_id,
            total = self.total_count,
            pages = self.pages,
            succeeded = self.succeeded,
            failed = self.failed,
            interrupted = self.interrupted,
            duration_ms = self.duration_ms(),
            success_rate = format!("{:.2}%", self.success_rate()),
            success_total = self.totals.success,
            failed_total = self.totals.failed,
            "Pass completed"
        );
    }
}
