//! Insert-or-update of one entity row

use super::sql;
use crate::adapters::target::TargetTransaction;
use crate::domain::{Result, RowImage, SqlValue};

/// Branch taken by [`upsert`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

/// Write `row` inside `tx`, inserting it if its key is new and updating it otherwise
///
/// # Errors
///
/// Returns a target error if the probe or the write fails.
pub async fn upsert(tx: &mut dyn TargetTransaction, row: &RowImage) -> Result<UpsertOutcome> {
    let key = SqlValue::from(row.key.as_str());

    let exists = tx
        .query_row(&sql::probe(row.table), std::slice::from_ref(&key))
        .await?
        .is_some();

    if exists {
        let mut params = row.values();
        params.push(key);
        tx.exec(&sql::update(row), &params).await?;
        Ok(UpsertOutcome::Updated)
    } else {
        let mut params = Vec::with_capacity(row.columns.len() + 1);
        params.push(key);
        params.extend(row.values());
        tx.exec(&sql::insert(row), &params).await?;
        Ok(UpsertOutcome::Inserted)
    }
}
