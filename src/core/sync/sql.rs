//! Statement text used by the synchronization engine
//!
//! All statements use positional `$n` parameters. Table and column names
//! come from `&'static str` constants, never from source documents.

use crate::domain::RowImage;

pub const SAVEPOINT: &str = "SAVEPOINT association";
pub const ROLLBACK_TO_SAVEPOINT: &str = "ROLLBACK TO SAVEPOINT association";
pub const RELEASE_SAVEPOINT: &str = "RELEASE SAVEPOINT association";

pub const UPSERT_INSTALLMENT: &str = "INSERT INTO product_monthly_installments \
    (product_id, installment_id, installment, installment_per_month) VALUES ($1, $2, $3, $4) \
    ON CONFLICT (product_id, installment_id) DO UPDATE SET \
    installment = EXCLUDED.installment, installment_per_month = EXCLUDED.installment_per_month";

pub const UPSERT_PROMO: &str = "INSERT INTO product_promos \
    (product_id, code, comment, type, priority) VALUES ($1, $2, $3, $4, $5) \
    ON CONFLICT (product_id, code) DO UPDATE SET \
    comment = EXCLUDED.comment, type = EXCLUDED.type, priority = EXCLUDED.priority";

/// Existence probe by external id
pub fn probe(table: &str) -> String {
    format!("SELECT id FROM {table} WHERE id = $1")
}

/// Insert of the key plus every column of `row`
pub fn insert(row: &RowImage) -> String {
    let mut columns = vec!["id"];
    columns.extend(row.column_names());

    let placeholders = (1..=columns.len())
        .map(|i| format!("${i}"))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        row.table,
        columns.join(", "),
        placeholders
    )
}

/// Update of every column of `row`, keyed by the last parameter
pub fn update(row: &RowImage) -> String {
    let names = row.column_names();
    let assignments = names
        .iter()
        .enumerate()
        .map(|(i, name)| format!("{name} = ${}", i + 1))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "UPDATE {} SET {} WHERE id = ${}",
        row.table,
        assignments,
        names.len() + 1
    )
}

/// Lookup of a dimension surrogate id by natural key
pub fn dimension_select(table: &str, key_column: &str) -> String {
    format!("SELECT id FROM {table} WHERE {key_column} = $1")
}

/// Insert of a dimension natural key; a concurrent insert of the same key is ignored
pub fn dimension_insert(table: &str, key_column: &str) -> String {
    format!("INSERT INTO {table} ({key_column}) VALUES ($1) ON CONFLICT ({key_column}) DO NOTHING")
}

/// Insert of a product association row; an existing pair is ignored
pub fn association_insert(table: &str, dimension_column: &str) -> String {
    format!(
        "INSERT INTO {table} (product_id, {dimension_column}) VALUES ($1, $2) ON CONFLICT DO NOTHING"
    )
}
