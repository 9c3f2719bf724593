//! Persistence gateway
//!
//! Wraps the single backend connection and the contact validation schema.
//! The gateway is the only component that writes to the durable store; the
//! request handler goes through [`ContactGateway`] for every persisted change.

pub mod file;
pub mod memory;
pub mod schema;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::BackendUrl;
use crate::model::ContactRecord;

pub use file::FileDocumentStore;
pub use memory::InMemoryDocumentStore;

pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("connection to contact store failed: {0}")]
    Connection(String),

    #[error("contact store connection is not open")]
    NotConnected,

    #[error("{field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("duplicate key: resourceId {0} already exists")]
    DuplicateKey(i64),

    #[error("contact store operation failed: {0}")]
    Backend(String),
}

impl GatewayError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::NotConnected)
    }
}

/// The document store behind the gateway.
///
/// Implementations own the durable copy of the collection and keep it across
/// `open`/`close` cycles. Data operations on a closed store fail with
/// [`GatewayError::NotConnected`].
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn open(&self) -> GatewayResult<()>;
    async fn close(&self) -> GatewayResult<()>;
    async fn is_open(&self) -> bool;

    /// Every document, in store order.
    async fn find_all(&self) -> GatewayResult<Vec<ContactRecord>>;

    /// Inserts a new document, assigning its backend identity.
    async fn insert(&self, record: ContactRecord) -> GatewayResult<ContactRecord>;

    /// Replaces the document carrying `record.id`.
    async fn replace(&self, record: ContactRecord) -> GatewayResult<ContactRecord>;

    /// Removes the first document matching `record`, returning how many were removed.
    async fn delete_one(&self, record: &ContactRecord) -> GatewayResult<u64>;

    fn kind(&self) -> &'static str;
}

/// Opens the store named by a connection string.
pub fn open_store(url: &BackendUrl) -> Arc<dyn DocumentStore> {
    match url {
        BackendUrl::Memory => Arc::new(InMemoryDocumentStore::new()),
        BackendUrl::File(path) => Arc::new(FileDocumentStore::new(path.clone())),
    }
}

#[derive(Clone)]
pub struct ContactGateway {
    store: Arc<dyn DocumentStore>,
}

impl ContactGateway {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Opens the shared backend connection.
    ///
    /// A failure is logged here and returned as [`GatewayError::Connection`]
    /// so the caller decides whether to carry on with a dead connection.
    pub async fn connect(&self) -> GatewayResult<()> {
        match self.store.open().await {
            Ok(()) => {
                info!(store = self.store.kind(), "connected to contact store");
                Ok(())
            }
            Err(err) => {
                warn!(store = self.store.kind(), error = %err, "connection to contact store failed");
                if matches!(err, GatewayError::Connection(_)) {
                    Err(err)
                } else {
                    Err(GatewayError::Connection(err.to_string()))
                }
            }
        }
    }

    pub async fn disconnect(&self) -> GatewayResult<()> {
        if !self.store.is_open().await {
            debug!(store = self.store.kind(), "contact store connection already closed");
            return Ok(());
        }
        self.store.close().await?;
        info!(store = self.store.kind(), "contact store connection closed");
        Ok(())
    }

    pub async fn find_all(&self) -> GatewayResult<Vec<ContactRecord>> {
        self.store.find_all().await
    }

    /// Validates and persists a record: insert when it has no backend
    /// identity yet, replace otherwise.
    pub async fn save(&self, record: ContactRecord) -> GatewayResult<ContactRecord> {
        if let Err(err) = schema::validate(&record) {
            warn!(resource_id = record.resource_id, error = %err, "contact rejected by schema");
            return Err(err);
        }

        let saved = if record.is_persisted() {
            self.store.replace(record).await?
        } else {
            self.store.insert(record).await?
        };

        debug!(resource_id = saved.resource_id, "contact saved to store");
        Ok(saved)
    }

    /// Removes the stored document matching `record`. Missing documents are not an error.
    pub async fn delete(&self, record: &ContactRecord) -> GatewayResult<()> {
        let removed = self.store.delete_one(record).await?;
        if removed == 0 {
            debug!(resource_id = record.resource_id, "delete matched no stored contact");
        }
        Ok(())
    }
}

/// Shared matching rule for deletes: backend identity when known, else resourceId.
pub(crate) fn matches_document(stored: &ContactRecord, filter: &ContactRecord) -> bool {
    match &filter.id {
        Some(id) => stored.id.as_ref() == Some(id),
        None => stored.resource_id == filter.resource_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> (ContactGateway, Arc<InMemoryDocumentStore>) {
        let store = Arc::new(InMemoryDocumentStore::new());
        (ContactGateway::new(store.clone()), store)
    }

    #[tokio::test]
    async fn save_inserts_then_replaces() {
        let (gateway, _) = gateway();
        gateway.connect().await.unwrap();

        let saved = gateway
            .save(ContactRecord::new("Alice", "555-123-4567", 1))
            .await
            .unwrap();
        assert!(saved.is_persisted());

        let mut changed = saved.clone();
        changed.number = "555-000-1111".to_string();
        gateway.save(changed).await.unwrap();

        let all = gateway.find_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].number, "555-000-1111");
        assert_eq!(all[0].id, saved.id);
    }

    #[tokio::test]
    async fn save_rejects_invalid_number_without_writing() {
        let (gateway, store) = gateway();
        gateway.connect().await.unwrap();

        let err = gateway
            .save(ContactRecord::new("Alice", "5551234567", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Validation { field: "number", .. }));
        assert_eq!(store.document_count().await, 0);
    }

    #[tokio::test]
    async fn save_rejects_duplicate_resource_id() {
        let (gateway, _) = gateway();
        gateway.connect().await.unwrap();

        gateway
            .save(ContactRecord::new("Alice", "555-123-4567", 7))
            .await
            .unwrap();
        let err = gateway
            .save(ContactRecord::new("Bob", "555-765-4321", 7))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::DuplicateKey(7)));
    }

    #[tokio::test]
    async fn delete_of_missing_record_is_a_no_op() {
        let (gateway, _) = gateway();
        gateway.connect().await.unwrap();

        gateway
            .delete(&ContactRecord::new("Ghost", "555-123-4567", 42))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn connect_failure_is_reported_as_connection_error() {
        let (gateway, store) = gateway();
        store.set_reachable(false).await;

        let err = gateway.connect().await.unwrap_err();
        assert!(matches!(err, GatewayError::Connection(_)));

        let err = gateway.find_all().await.unwrap_err();
        assert!(matches!(err, GatewayError::NotConnected));
    }

    #[tokio::test]
    async fn disconnect_twice_is_tolerated() {
        let (gateway, _) = gateway();
        gateway.connect().await.unwrap();
        gateway.disconnect().await.unwrap();
        gateway.disconnect().await.unwrap();
    }
}
