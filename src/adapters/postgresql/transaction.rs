//! PostgreSQL transaction handle
//!
//! The handle owns a pooled connection for the lifetime of one transaction.
//! `BEGIN`/`COMMIT` are issued explicitly so the handle can be boxed and
//! moved through the engine without borrowing the pool object.

use super::value::{as_params, row_to_sql_row};
use crate::adapters::target::TargetTransaction;
use crate::domain::{Result, SqlRow, SqlValue, TargetError};
use async_trait::async_trait;
use deadpool_postgres::Object;

/// An open PostgreSQL transaction
pub struct PostgresTransaction {
    client: Option<Object>,
}

impl PostgresTransaction {
    /// Wraps a connection on which `BEGIN` has already succeeded
    pub(crate) fn new(client: Object) -> Self {
        Self {
            client: Some(client),
        }
    }

    fn client(&self) -> Result<&Object> {
        self.client
            .as_ref()
            .ok_or_else(|| TargetError::TransactionClosed.into())
    }
}

#[async_trait]
impl TargetTransaction for PostgresTransaction {
    async fn query_row(&mut self, statement: &str, params: &[SqlValue]) -> Result<Option<SqlRow>> {
        let client = self.client()?;
        let row = client
            .query_opt(statement, &as_params(params))
            .await
            .map_err(|e| TargetError::QueryFailed(e.to_string()))?;

        row.as_ref().map(row_to_sql_row).transpose()
    }

    async fn exec(&mut self, statement: &str, params: &[SqlValue]) -> Result<u64> {
        let client = self.client()?;
        let affected = client
            .execute(statement, &as_params(params))
            .await
            .map_err(|e| TargetError::ExecFailed(e.to_string()))?;
        Ok(affected)
    }

    async fn commit(mut self: Box<Self>) -> Result<()> {
        let outcome = self.client()?.batch_execute("COMMIT").await;
        self.finish(outcome, |e| TargetError::CommitFailed(e.to_string()))
    }

    async fn rollback(mut self: Box<Self>) -> Result<()> {
        let outcome = self.client()?.batch_execute("ROLLBACK").await;
        self.finish(outcome, |e| TargetError::ExecFailed(format!("ROLLBACK failed: {e}")))
    }
}

impl PostgresTransaction {
    /// Releases the connection once `COMMIT`/`ROLLBACK` has resolved
    ///
    /// The connection stays in `self.client` while the statement is in
    /// flight, so `Drop` detaches it if the future is cancelled.
    fn finish(
        &mut self,
        outcome: std::result::Result<(), tokio_postgres::Error>,
        on_error: impl FnOnce(tokio_postgres::Error) -> TargetError,
    ) -> Result<()> {
        let client = self.client.take().ok_or(TargetError::TransactionClosed)?;
        match outcome {
            Ok(()) => Ok(()),
            Err(e) => {
                // The connection state is unknown after a failed COMMIT or ROLLBACK
                drop(Object::take(client));
                Err(on_error(e).into())
            }
        }
    }
}

impl Drop for PostgresTransaction {
    fn drop(&mut self) {
        if let Some(client) = self.client.take() {
            // Detaching closes the connection, and the server aborts the
            // transaction with it.
            tracing::warn!("Transaction dropped while open; discarding its connection");
            drop(Object::take(client));
        }
    }
}
