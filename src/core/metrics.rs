//! Per-record processing counters
//!
//! The runner reports exactly one [`Outcome`] per processed record through a
//! [`MetricsSink`]. [`CounterSink`] keeps the counts in process and renders
//! them in the Prometheus text exposition format.

use crate::domain::EntityKind;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};

/// Result of processing one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

/// Receives one event per processed record
pub trait MetricsSink: Send + Sync {
    /// Record the outcome of one record of `kind`
    fn record(&self, kind: EntityKind, outcome: Outcome);

    /// Running totals for `kind` since the sink was created
    fn snapshot(&self, kind: EntityKind) -> CounterSnapshot;
}

/// Point-in-time copy of the counters for one entity kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub success: u64,
    pub failed: u64,
}

/// Lock-free success/failure counters, one pair per entity kind
#[derive(Debug, Default)]
pub struct CounterSink {
    success: [AtomicU64; 4],
    failed: [AtomicU64; 4],
}

impl CounterSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current counts for `kind`
    pub fn snapshot(&self, kind: EntityKind) -> CounterSnapshot {
        let i = kind.index();
        CounterSnapshot {
            success: self.success[i].load(Ordering::Relaxed),
            failed: self.failed[i].load(Ordering::Relaxed),
        }
    }

    /// Render every counter in the Prometheus text format
    ///
    /// Counter names are `success_processed_<label>_total` and
    /// `failed_processed_<label>_total`, where the label is the plural entity
    /// name (`offers`, `products`, `shops`, `shop_reviews`).
    pub fn render_prometheus(&self) -> String {
        let mut out = String::new();
        for kind in EntityKind::ALL {
            let snap = self.snapshot(kind);
            let label = kind.metric_label();
            for (prefix, value) in [("success", snap.success), ("failed", snap.failed)] {
                let name = format!("{prefix}_processed_{label}_total");
                let _ = writeln!(out, "# HELP {name} The total number of {prefix} processed {label}");
                let _ = writeln!(out, "# TYPE {name} counter");
                let _ = writeln!(out, "{name} {value}");
            }
        }
        out
    }

    /// Log the totals for every entity kind
    pub fn log_totals(&self) {
        for kind in EntityKind::ALL {
            let snap = self.snapshot(kind);
            tracing::info!(
                entity = %kind,
                success = snap.success,
                failed = snap.failed,
                "Record totals"
            );
        }
    }
}

impl MetricsSink for CounterSink {
    fn record(&self, kind: EntityKind, outcome: Outcome) {
        let counters = match outcome {
            Outcome::Success => &self.success,
            Outcome::Failure => &self.failed,
        };
        counters[kind.index()].fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self, kind: EntityKind) -> CounterSnapshot {
        CounterSink::snapshot(self, kind)
    }
}
