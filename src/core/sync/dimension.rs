//! Lookup-or-create resolution of dimension rows

use super::sql;
use crate::adapters::target::TargetTransaction;
use crate::domain::{Result, SqlRow, SqlValue, TargetError};

/// Reference tables keyed by a unique natural key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Brand,
    Category,
    CategoryCode,
}

impl Dimension {
    pub fn table(&self) -> &'static str {
        match self {
            Dimension::Brand => "brands",
            Dimension::Category => "categories",
            Dimension::CategoryCode => "category_codes",
        }
    }

    /// Natural key column
    pub fn key_column(&self) -> &'static str {
        match self {
            Dimension::Brand | Dimension::Category => "name",
            Dimension::CategoryCode => "code",
        }
    }
}

/// Resolves natural keys to surrogate ids inside the caller's transaction
#[derive(Debug, Clone)]
pub struct DimensionResolver {
    max_attempts: u32,
}

impl DimensionResolver {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    /// Return the surrogate id for `key`, inserting the row if it is new
    ///
    /// The insert ignores a conflicting concurrent insert of the same key, so
    /// the follow-up select finds whichever row won. The select-insert-select
    /// cycle is retried up to the configured number of attempts.
    ///
    /// # Errors
    ///
    /// Returns a target error if a statement fails or the row is still not
    /// visible after the last attempt.
    pub async fn resolve(
        &self,
        tx: &mut dyn TargetTransaction,
        dimension: Dimension,
        key: &str,
    ) -> Result<i64> {
        let select = sql::dimension_select(dimension.table(), dimension.key_column());
        let insert = sql::dimension_insert(dimension.table(), dimension.key_column());
        let params = [SqlValue::from(key)];

        for attempt in 1..=self.max_attempts {
            if let Some(row) = tx.query_row(&select, &params).await? {
                return surrogate_id(dimension, &row);
            }

            tx.exec(&insert, &params).await?;

            if let Some(row) = tx.query_row(&select, &params).await? {
                tracing::debug!(
                    table = dimension.table(),
                    key = %key,
                    "Created dimension row"
                );
                return surrogate_id(dimension, &row);
            }

            tracing::debug!(
                table = dimension.table(),
                key = %key,
                attempt,
                "Dimension row not visible after insert, retrying"
            );
        }

        Err(TargetError::QueryFailed(format!(
            "could not resolve {} '{}' after {} attempts",
            dimension.table(),
            key,
            self.max_attempts
        ))
        .into())
    }
}

fn surrogate_id(dimension: Dimension, row: &SqlRow) -> Result<i64> {
    row.get_i64(0).ok_or_else(|| {
        TargetError::QueryFailed(format!("{} returned a non-integer id", dimension.table())).into()
    })
}
