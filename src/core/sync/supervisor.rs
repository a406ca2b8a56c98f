//! Supervisor - runs one pipeline task per enabled entity kind
//!
//! Pipelines share the store handles and the metrics sink but no mutable
//! state. After a shutdown signal the supervisor gives them
//! `shutdown_timeout_secs` to finish their current record, then aborts the
//! stragglers.

use super::dimension::DimensionResolver;
use super::record::RecordProcessor;
use super::runner::{wait_for_shutdown, PipelineRunner, RunnerReport};
use crate::adapters::source::SourceStore;
use crate::adapters::target::TargetStore;
use crate::config::{CollectionNames, SyncSettings};
use crate::core::metrics::MetricsSink;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Outcome of a supervised run
#[derive(Debug, Default)]
pub struct SupervisorReport {
    /// One report per pipeline that stopped on its own
    pub pipelines: Vec<RunnerReport>,
    /// Pipelines had to be aborted after the shutdown timeout
    pub timed_out: bool,
}

impl SupervisorReport {
    pub fn interrupted(&self) -> bool {
        self.timed_out || self.pipelines.iter().any(|p| p.interrupted)
    }
}

/// Starts and joins the pipelines
pub struct Supervisor {
    settings: SyncSettings,
    collections: CollectionNames,
    source: Arc<dyn SourceStore>,
    target: Arc<dyn TargetStore>,
    metrics: Arc<dyn MetricsSink>,
    shutdown: watch::Receiver<bool>,
}

impl Supervisor {
    pub fn new(
        settings: SyncSettings,
        collections: CollectionNames,
        source: Arc<dyn SourceStore>,
        target: Arc<dyn TargetStore>,
        metrics: Arc<dyn MetricsSink>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            settings,
            collections,
            source,
            target,
            metrics,
            shutdown,
        }
    }

    /// Run every enabled pipeline until they stop or shutdown drains them
    pub async fn run(self) -> SupervisorReport {
        let processor = Arc::new(RecordProcessor::new(
            self.target.clone(),
            DimensionResolver::new(self.settings.dimension_retry_attempts),
        ));
        let idle_interval = Duration::from_secs(self.settings.idle_interval_seconds);

        let handles: Vec<_> = self
            .settings
            .entities
            .iter()
            .map(|&kind| {
                let runner = PipelineRunner::new(
                    kind,
                    self.collections.for_kind(kind),
                    self.source.clone(),
                    processor.clone(),
                    self.metrics.clone(),
                    self.shutdown.clone(),
                )
                .with_idle_interval(idle_interval)
                .with_max_passes(self.settings.max_passes);

                tokio::spawn(runner.run())
            })
            .collect();

        tracing::info!(
            pipelines = handles.len(),
            entities = ?self.settings.entities,
            "Pipelines spawned"
        );

        let abort_handles: Vec<_> = handles.iter().map(|h| h.abort_handle()).collect();
        let mut all = join_all(handles);
        let mut shutdown = self.shutdown.clone();

        let results = tokio::select! {
            results = &mut all => results,
            _ = wait_for_shutdown(&mut shutdown) => {
                let timeout = Duration::from_secs(self.settings.shutdown_timeout_secs);
                tracing::info!(
                    timeout_secs = timeout.as_secs(),
                    "Shutdown requested, waiting for pipelines to finish"
                );

                match tokio::time::timeout(timeout, &mut all).await {
                    Ok(results) => results,
                    Err(_) => {
                        tracing::warn!(
                            timeout_secs = timeout.as_secs(),
                            "Pipelines did not stop in time, aborting"
                        );
                        for handle in &abort_handles {
                            handle.abort();
                        }
                        return SupervisorReport {
                            pipelines: Vec::new(),
                            timed_out: true,
                        };
                    }
                }
            }
        };

        let mut report = SupervisorReport::default();
        for result in results {
            match result {
                Ok(pipeline) => report.pipelines.push(pipeline),
                Err(e) => tracing::error!(error = %e, "Pipeline task failed"),
            }
        }
        report
    }
}
