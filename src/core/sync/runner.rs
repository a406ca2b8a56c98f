//! Pipeline runner - drives one entity kind through perpetual passes
//!
//! A pass counts the collection, walks fixed-size page windows over
//! `[0, count)` and hands every document to the [`RecordProcessor`]. When
//! the range is exhausted the runner waits the idle interval and starts a new
//! pass from a fresh count. No resume point is kept between passes.

use super::pagination::{page_offsets, PAGE_SIZE};
use super::record::RecordProcessor;
use super::summary::PassSummary;
use crate::adapters::source::{RawDocument, SourceStore};
use crate::core::metrics::{MetricsSink, Outcome};
use crate::domain::{EntityKind, SyncError};
use crate::{log_page_progress, log_pass_start, log_record_failure};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Where in a pass an error was raised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Count,
    FetchPage,
    Record,
}

/// How far an error reaches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Severity {
    /// The record is counted as failed and the pass continues
    Record,
    /// The pass is abandoned and a new one starts from a fresh count
    Pass,
}

impl Stage {
    fn severity(self) -> Severity {
        match self {
            Stage::Count | Stage::FetchPage => Severity::Pass,
            Stage::Record => Severity::Record,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Stage::Count => "count",
            Stage::FetchPage => "fetch_page",
            Stage::Record => "record",
        }
    }
}

/// Position of a failure within the pass
#[derive(Debug, Default)]
struct ErrorContext {
    offset: Option<u64>,
    record_id: Option<String>,
}

impl ErrorContext {
    fn page(offset: u64) -> Self {
        Self {
            offset: Some(offset),
            record_id: None,
        }
    }

    fn record(offset: u64, record_id: String) -> Self {
        Self {
            offset: Some(offset),
            record_id: Some(record_id),
        }
    }
}

/// Totals over every pass a runner executed
#[derive(Debug, Clone)]
pub struct RunnerReport {
    pub entity: EntityKind,
    pub passes_completed: u64,
    pub passes_aborted: u64,
    pub succeeded: u64,
    pub failed: u64,
    /// The runner stopped because of a shutdown signal
    pub interrupted: bool,
}

impl RunnerReport {
    fn new(entity: EntityKind) -> Self {
        Self {
            entity,
            passes_completed: 0,
            passes_aborted: 0,
            succeeded: 0,
            failed: 0,
            interrupted: false,
        }
    }

    /// Passes started, whether they completed or not
    pub fn passes(&self) -> u64 {
        self.passes_completed + self.passes_aborted
    }

    fn absorb(&mut self, pass: &PassSummary) {
        self.succeeded += pass.succeeded;
        self.failed += pass.failed;
        if pass.abort_reason.is_some() {
            self.passes_aborted += 1;
        } else if !pass.interrupted {
            self.passes_completed += 1;
        }
    }
}

/// Drives one entity kind until shutdown
pub struct PipelineRunner {
    kind: EntityKind,
    collection: String,
    source: Arc<dyn SourceStore>,
    processor: Arc<RecordProcessor>,
    metrics: Arc<dyn MetricsSink>,
    page_size: u64,
    idle_interval: Duration,
    max_passes: Option<u64>,
    shutdown: watch::Receiver<bool>,
}

impl PipelineRunner {
    /// Create a runner reading `collection` as documents of `kind`
    pub fn new(
        kind: EntityKind,
        collection: impl Into<String>,
        source: Arc<dyn SourceStore>,
        processor: Arc<RecordProcessor>,
        metrics: Arc<dyn MetricsSink>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            kind,
            collection: collection.into(),
            source,
            processor,
            metrics,
            page_size: PAGE_SIZE,
            idle_interval: Duration::from_secs(5),
            max_passes: None,
            shutdown,
        }
    }

    /// Pause between two passes
    pub fn with_idle_interval(mut self, idle_interval: Duration) -> Self {
        self.idle_interval = idle_interval;
        self
    }

    /// Stop after this many passes instead of running until shutdown
    pub fn with_max_passes(mut self, max_passes: Option<u64>) -> Self {
        self.max_passes = max_passes;
        self
    }

    /// Documents requested per page
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Run passes until shutdown or until the pass limit is reached
    pub async fn run(mut self) -> RunnerReport {
        let mut report = RunnerReport::new(self.kind);

        tracing::info!(
            entity = %self.kind,
            collection = %self.collection,
            database = %self.source.database_name(),
            "Pipeline started"
        );

        loop {
            if self.shutdown_requested() {
                report.interrupted = true;
                break;
            }

            let pass = self.run_pass().await;
            pass.log_summary();
            report.absorb(&pass);

            if pass.interrupted {
                report.interrupted = true;
                break;
            }

            if self.max_passes.is_some_and(|max| report.passes() >= max) {
                break;
            }

            if self.idle().await {
                report.interrupted = true;
                break;
            }
        }

        tracing::info!(
            entity = %self.kind,
            passes = report.passes(),
            succeeded = report.succeeded,
            failed = report.failed,
            interrupted = report.interrupted,
            "Pipeline stopped"
        );

        report
    }

    /// Execute a single pass over the collection
    ///
    /// Never returns an error: pass-level failures are recorded in the
    /// summary's `abort_reason`, record-level failures in its `failed` count.
    /// The summary carries the sink's running totals for this entity kind as
    /// of the end of the pass.
    pub async fn run_pass(&mut self) -> PassSummary {
        let mut summary = PassSummary::new(self.kind);
        self.walk_collection(&mut summary).await;
        summary.totals = self.metrics.snapshot(self.kind);
        summary
    }

    async fn walk_collection(&mut self, summary: &mut PassSummary) {
        let total = match self.source.count(&self.collection).await {
            Ok(total) => total,
            Err(e) => {
                self.handle_error(summary, Stage::Count, &e, ErrorContext::default());
                return;
            }
        };
        summary.total_count = total;
        log_pass_start!(self.kind, summary.pass_id, total);

        for offset in page_offsets(total, self.page_size) {
            if self.shutdown_requested() {
                summary.interrupted = true;
                break;
            }

            log_page_progress!(self.kind, offset, total);
            let limit = self.page_size.min(total - offset);

            let documents = match self.source.fetch_page(&self.collection, offset, limit).await {
                Ok(documents) => documents,
                Err(e) => {
                    let context = ErrorContext::page(offset);
                    self.handle_error(summary, Stage::FetchPage, &e, context);
                    return;
                }
            };
            summary.pages += 1;

            for (i, document) in documents.iter().enumerate() {
                // Never open a transaction once shutdown is requested
                if self.shutdown_requested() {
                    summary.interrupted = true;
                    break;
                }

                match self.processor.process(self.kind, document).await {
                    Ok(_) => {
                        summary.succeeded += 1;
                        self.metrics.record(self.kind, Outcome::Success);
                    }
                    Err(e) => {
                        let position = offset + i as u64;
                        let context = ErrorContext::record(position, document_id(document));
                        self.handle_error(summary, Stage::Record, &e, context);
                    }
                }
            }
        }

        summary.finish();
    }

    /// Apply the severity of `stage` to the pass
    fn handle_error(
        &self,
        summary: &mut PassSummary,
        stage: Stage,
        error: &SyncError,
        context: ErrorContext,
    ) {
        match stage.severity() {
            Severity::Pass => {
                tracing::error!(
                    entity = %self.kind,
                    pass_id = %summary.pass_id,
                    stage = stage.as_str(),
                    offset = ?context.offset,
                    error_kind = error.kind(),
                    error = %error,
                    "Pass failed"
                );
                summary.abort(format!("{} failed: {}", stage.as_str(), error));
            }
            Severity::Record => {
                summary.failed += 1;
                self.metrics.record(self.kind, Outcome::Failure);
                log_record_failure!(
                    self.kind,
                    context.record_id.as_deref().unwrap_or("<missing>"),
                    context.offset.unwrap_or_default(),
                    error
                );
            }
        }
    }

    fn shutdown_requested(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Wait out the idle interval; returns true if shutdown arrived meanwhile
    async fn idle(&mut self) -> bool {
        if self.idle_interval.is_zero() {
            return self.shutdown_requested();
        }

        tokio::select! {
            _ = tokio::time::sleep(self.idle_interval) => false,
            _ = wait_for_shutdown(&mut self.shutdown) => true,
        }
    }
}

/// Resolve once the shutdown flag is set
///
/// A dropped sender can no longer signal shutdown, so this then never resolves.
pub(crate) async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

fn document_id(document: &RawDocument) -> String {
    match document.get("_id") {
        Some(Value::String(id)) => id.clone(),
        Some(other) => other.to_string(),
        None => "<missing>".to_string(),
    }
}
