//! Source store abstraction
//!
//! This module defines the trait the pipeline runner uses to read documents
//! from the source store.

use crate::domain::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// An untyped source document, field names mapped to JSON values
///
/// Store-specific scalar types are normalised by the adapter: object ids and
/// timestamps arrive as strings, all numbers as JSON numbers.
pub type RawDocument = Map<String, Value>;

/// Source store trait for reading paged collections
///
/// Implementations must be safe for concurrent use by several pipelines.
#[async_trait]
pub trait SourceStore: Send + Sync {
    /// Verify the store is reachable
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached.
    async fn ping(&self) -> Result<()>;

    /// Count all documents in a collection
    ///
    /// # Arguments
    ///
    /// * `collection` - Collection name
    ///
    /// # Errors
    ///
    /// Returns `SourceError::NotFound` if the database or collection is not
    /// recognised, or a query error if the count fails.
    async fn count(&self, collection: &str) -> Result<u64>;

    /// Fetch up to `limit` documents starting at `offset`
    ///
    /// Documents are returned in the order the store yields them.
    ///
    /// # Arguments
    ///
    /// * `collection` - Collection name
    /// * `offset` - Number of documents to skip
    /// * `limit` - Maximum number of documents to return
    ///
    /// # Errors
    ///
    /// Returns `SourceError::NotFound` for an unknown collection, or a query
    /// error if the fetch fails.
    async fn fetch_page(&self, collection: &str, offset: u64, limit: u64)
        -> Result<Vec<RawDocument>>;

    /// Name of the source database
    fn database_name(&self) -> &str;
}
