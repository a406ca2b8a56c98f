//! PostgreSQL target integration
//!
//! This module provides the pooled client, the transaction handle and the
//! parameter encoding used to write catalog rows into PostgreSQL.

pub mod client;
pub mod transaction;
pub mod value;

pub use client::PostgreSQLClient;
pub use transaction::PostgresTransaction;
