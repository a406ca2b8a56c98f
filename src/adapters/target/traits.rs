//! Target store abstraction
//!
//! This module defines the traits the synchronization engine uses to write
//! into the relational target. Statements use positional `$n` parameters.

use crate::domain::{Result, SqlRow, SqlValue};
use async_trait::async_trait;

/// Target store trait
///
/// Implementations hand out independent transactions and must be safe for
/// concurrent use by several pipelines.
#[async_trait]
pub trait TargetStore: Send + Sync {
    /// Verify the store is reachable
    ///
    /// # Errors
    ///
    /// Returns an error if no connection can be established.
    async fn ping(&self) -> Result<()>;

    /// Begin a new transaction
    ///
    /// The returned handle owns its connection until it is committed or
    /// rolled back. Dropping an open handle aborts the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection is available or `BEGIN` fails.
    async fn begin(&self) -> Result<Box<dyn TargetTransaction>>;
}

/// A single open transaction on the target store
#[async_trait]
pub trait TargetTransaction: Send {
    /// Run a query and return its first row
    ///
    /// `Ok(None)` means the query matched no rows and is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    async fn query_row(&mut self, statement: &str, params: &[SqlValue]) -> Result<Option<SqlRow>>;

    /// Execute a statement and return the number of affected rows
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails. On most stores a failed
    /// statement poisons the transaction until a savepoint rollback.
    async fn exec(&mut self, statement: &str, params: &[SqlValue]) -> Result<u64>;

    /// Commit the transaction
    ///
    /// # Errors
    ///
    /// Returns `TargetError::CommitFailed` if the commit is rejected; the
    /// store discards the transaction's effects.
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Roll back the transaction
    ///
    /// # Errors
    ///
    /// Returns an error if the rollback could not be sent. The transaction
    /// is aborted either way.
    async fn rollback(self: Box<Self>) -> Result<()>;
}
