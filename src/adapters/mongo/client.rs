//! MongoDB source client
//!
//! Wraps a [`mongodb::Client`] and exposes the configured catalog database
//! through [`SourceStore`].

use super::convert::document_to_raw;
use crate::adapters::source::{RawDocument, SourceStore};
use crate::config::{redact_url, SourceConfig};
use crate::domain::{Result, SourceError};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::options::{ClientOptions, FindOptions};
use mongodb::{Client, Collection};
use secrecy::ExposeSecret;
use std::time::Duration;

/// MongoDB client for the catalog source database
///
/// Only collections named in the configuration are readable; any other name
/// is rejected with `SourceError::NotFound` before a request is sent.
pub struct MongoSourceClient {
    client: Client,
    database: String,
    collections: Vec<String>,
    uri_safe: String,
}

impl MongoSourceClient {
    /// Create a new MongoDB client
    ///
    /// The driver connects lazily; call [`SourceStore::ping`] to verify the
    /// server is reachable.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection string cannot be parsed.
    pub async fn new(config: &SourceConfig) -> Result<Self> {
        let uri = config.connection_string.expose_secret();

        let mut options = ClientOptions::parse(uri.as_ref()).await.map_err(|e| {
            SourceError::ConnectionFailed(format!("Invalid MongoDB connection string: {e}"))
        })?;

        let timeout = Duration::from_secs(config.connect_timeout_seconds);
        options.app_name = Some("catalog-sync".to_string());
        options.connect_timeout = Some(timeout);
        options.server_selection_timeout = Some(timeout);

        let client = Client::with_options(options).map_err(|e| {
            SourceError::ConnectionFailed(format!("Failed to create MongoDB client: {e}"))
        })?;

        Ok(Self {
            client,
            database: config.database.clone(),
            collections: config.collections.all(),
            uri_safe: redact_url(uri.as_ref()),
        })
    }

    /// Connection string with the password redacted
    pub fn connection_string_safe(&self) -> &str {
        &self.uri_safe
    }

    fn collection(&self, name: &str) -> Result<Collection<Document>> {
        if !self.collections.iter().any(|c| c == name) {
            return Err(SourceError::NotFound {
                kind: "collection",
                name: name.to_string(),
            }
            .into());
        }
        Ok(self.client.database(&self.database).collection(name))
    }
}

#[async_trait]
impl SourceStore for MongoSourceClient {
    async fn ping(&self) -> Result<()> {
        self.client
            .database(&self.database)
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| SourceError::ConnectionFailed(format!("Ping failed: {e}")))?;

        tracing::info!(
            uri = %self.uri_safe,
            database = %self.database,
            "MongoDB connection test successful"
        );
        Ok(())
    }

    async fn count(&self, collection: &str) -> Result<u64> {
        let count = self
            .collection(collection)?
            .count_documents(doc! {}, None)
            .await
            .map_err(|e| SourceError::QueryFailed(format!("count on {collection}: {e}")))?;
        Ok(count)
    }

    async fn fetch_page(
        &self,
        collection: &str,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<RawDocument>> {
        let limit = i64::try_from(limit).map_err(|_| {
            SourceError::QueryFailed(format!("page limit {limit} exceeds i64 range"))
        })?;

        // Offset windows only line up across requests under a fixed sort order.
        let options = FindOptions::builder()
            .skip(offset)
            .limit(limit)
            .sort(doc! { "_id": 1 })
            .build();

        let cursor = self
            .collection(collection)?
            .find(doc! {}, options)
            .await
            .map_err(|e| SourceError::QueryFailed(format!("find on {collection}: {e}")))?;

        let documents: Vec<Document> = cursor.try_collect().await.map_err(|e| {
            SourceError::QueryFailed(format!("cursor on {collection} at offset {offset}: {e}"))
        })?;

        Ok(documents.into_iter().map(document_to_raw).collect())
    }

    fn database_name(&self) -> &str {
        &self.database
    }
}
