use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{DocumentStore, GatewayError, GatewayResult, matches_document};
use crate::model::ContactRecord;

/// Counters of backend traffic, used to check which requests reach the store.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub opens: usize,
    pub closes: usize,
    pub reads: usize,
    pub writes: usize,
}

#[derive(Debug)]
struct MemoryState {
    reachable: bool,
    open: bool,
    documents: Vec<ContactRecord>,
    stats: StoreStats,
}

/// Process-local document store (`memory://`).
///
/// Documents survive `close`; only the process exiting drops them.
#[derive(Debug)]
pub struct InMemoryDocumentStore {
    state: RwLock<MemoryState>,
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::with_documents(Vec::new())
    }

    /// Seeds the store with documents, assigning backend ids where missing.
    pub fn with_documents(documents: Vec<ContactRecord>) -> Self {
        let documents = documents
            .into_iter()
            .map(|mut doc| {
                doc.id.get_or_insert_with(new_document_id);
                doc
            })
            .collect();

        Self {
            state: RwLock::new(MemoryState {
                reachable: true,
                open: false,
                documents,
                stats: StoreStats::default(),
            }),
        }
    }

    /// Simulates the backend going away or coming back.
    pub async fn set_reachable(&self, reachable: bool) {
        self.state.write().await.reachable = reachable;
    }

    pub async fn stats(&self) -> StoreStats {
        self.state.read().await.stats
    }

    pub async fn document_count(&self) -> usize {
        self.state.read().await.documents.len()
    }

    /// Copy of the durable documents, bypassing the connection lifecycle.
    pub async fn documents(&self) -> Vec<ContactRecord> {
        self.state.read().await.documents.clone()
    }
}

fn new_document_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn ensure_open(state: &MemoryState) -> GatewayResult<()> {
    if !state.open {
        return Err(GatewayError::NotConnected);
    }
    if !state.reachable {
        return Err(GatewayError::backend("contact store is unreachable"));
    }
    Ok(())
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn open(&self) -> GatewayResult<()> {
        let mut state = self.state.write().await;
        if !state.reachable {
            return Err(GatewayError::Connection(
                "memory store is unreachable".to_string(),
            ));
        }
        state.open = true;
        state.stats.opens += 1;
        Ok(())
    }

    async fn close(&self) -> GatewayResult<()> {
        let mut state = self.state.write().await;
        state.open = false;
        state.stats.closes += 1;
        Ok(())
    }

    async fn is_open(&self) -> bool {
        self.state.read().await.open
    }

    async fn find_all(&self) -> GatewayResult<Vec<ContactRecord>> {
        let mut state = self.state.write().await;
        ensure_open(&state)?;
        state.stats.reads += 1;
        Ok(state.documents.clone())
    }

    async fn insert(&self, mut record: ContactRecord) -> GatewayResult<ContactRecord> {
        let mut state = self.state.write().await;
        ensure_open(&state)?;

        if state
            .documents
            .iter()
            .any(|doc| doc.resource_id == record.resource_id)
        {
            return Err(GatewayError::DuplicateKey(record.resource_id));
        }

        record.id = Some(new_document_id());
        state.documents.push(record.clone());
        state.stats.writes += 1;
        Ok(record)
    }

    async fn replace(&self, record: ContactRecord) -> GatewayResult<ContactRecord> {
        let mut state = self.state.write().await;
        ensure_open(&state)?;

        if state
            .documents
            .iter()
            .any(|doc| doc.resource_id == record.resource_id && doc.id != record.id)
        {
            return Err(GatewayError::DuplicateKey(record.resource_id));
        }

        let Some(slot) = state.documents.iter_mut().find(|doc| doc.id == record.id) else {
            return Err(GatewayError::backend(format!(
                "no document found for id {:?}",
                record.id
            )));
        };
        *slot = record.clone();
        state.stats.writes += 1;
        Ok(record)
    }

    async fn delete_one(&self, record: &ContactRecord) -> GatewayResult<u64> {
        let mut state = self.state.write().await;
        ensure_open(&state)?;

        let Some(position) = state
            .documents
            .iter()
            .position(|doc| matches_document(doc, record))
        else {
            return Ok(0);
        };
        state.documents.remove(position);
        state.stats.writes += 1;
        Ok(1)
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn documents_survive_reconnect() {
        let store = InMemoryDocumentStore::new();
        store.open().await.unwrap();
        store
            .insert(ContactRecord::new("Alice", "555-123-4567", 1))
            .await
            .unwrap();
        store.close().await.unwrap();

        assert!(matches!(
            store.find_all().await.unwrap_err(),
            GatewayError::NotConnected
        ));

        store.open().await.unwrap();
        assert_eq!(store.find_all().await.unwrap().len(), 1);
        assert_eq!(
            store.stats().await,
            StoreStats {
                opens: 2,
                closes: 1,
                reads: 1,
                writes: 1
            }
        );
    }

    #[tokio::test]
    async fn delete_matches_by_resource_id_without_backend_id() {
        let store =
            InMemoryDocumentStore::with_documents(vec![ContactRecord::new("Bob", "555-765-4321", 3)]);
        store.open().await.unwrap();

        let removed = store
            .delete_one(&ContactRecord::new("anything", "000-000-0000", 3))
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.document_count().await, 0);
    }

    #[tokio::test]
    async fn replace_of_vanished_document_fails() {
        let store = InMemoryDocumentStore::new();
        store.open().await.unwrap();

        let mut ghost = ContactRecord::new("Ghost", "555-123-4567", 9);
        ghost.id = Some("gone".to_string());
        assert!(matches!(
            store.replace(ghost).await.unwrap_err(),
            GatewayError::Backend(_)
        ));
    }
}
