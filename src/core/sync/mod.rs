//! Synchronization engine
//!
//! - [`runner`] - Per-entity pass loop with severity classification
//! - [`record`] - One document, one transaction
//! - [`dimension`] - Lookup-or-create of brand and category rows
//! - [`upsert`] - Insert-or-update by external id
//! - [`pagination`] - Page windows over a counted collection
//! - [`summary`] - Pass results and reporting
//! - [`supervisor`] - One task per entity kind, drained on shutdown
//! - [`sql`] - Statement text

pub mod dimension;
pub mod pagination;
pub mod record;
pub mod runner;
pub mod sql;
pub mod summary;
pub mod supervisor;
pub mod upsert;

pub use dimension::{Dimension, DimensionResolver};
pub use pagination::{page_offsets, PAGE_SIZE};
pub use record::RecordProcessor;
pub use runner::{PipelineRunner, RunnerReport};
pub use summary::PassSummary;
pub use supervisor::{Supervisor, SupervisorReport};
pub use upsert::{upsert, UpsertOutcome};
