//! In-memory mirror of the contact collection.
//!
//! The mirror serves every read. It is never patched in place: each resync
//! swaps in a freshly fetched collection, so a reader holding a snapshot sees
//! either the old collection or the new one.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::model::ContactRecord;

pub type MirrorSnapshot = Arc<Vec<ContactRecord>>;

#[derive(Debug, Default)]
pub struct ContactCache {
    records: RwLock<MirrorSnapshot>,
}

impl ContactCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<ContactRecord>) -> Self {
        Self {
            records: RwLock::new(Arc::new(records)),
        }
    }

    pub async fn snapshot(&self) -> MirrorSnapshot {
        Arc::clone(&*self.records.read().await)
    }

    /// Discards the current mirror and installs `records` in its place.
    pub async fn replace(&self, records: Vec<ContactRecord>) {
        *self.records.write().await = Arc::new(records);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    pub async fn find_by_resource_id(&self, resource_id: i64) -> Option<ContactRecord> {
        let records = self.records.read().await;
        position_by_resource_id(&records, resource_id).map(|idx| records[idx].clone())
    }

    pub async fn find_by_name(&self, name: &str) -> Option<ContactRecord> {
        let records = self.records.read().await;
        position_by_name(&records, name).map(|idx| records[idx].clone())
    }

    /// Next free resource id: one past the largest in the mirror, 1 when empty.
    /// `None` once the largest id is `i64::MAX`.
    pub async fn next_id(&self) -> Option<i64> {
        next_resource_id(&self.records.read().await)
    }
}

pub fn position_by_resource_id(records: &[ContactRecord], resource_id: i64) -> Option<usize> {
    records
        .iter()
        .position(|contact| contact.resource_id == resource_id)
}

pub fn position_by_name(records: &[ContactRecord], name: &str) -> Option<usize> {
    records.iter().position(|contact| contact.name == name)
}

pub fn next_resource_id(records: &[ContactRecord]) -> Option<i64> {
    match records.iter().map(|contact| contact.resource_id).max() {
        Some(max) => max.checked_add(1),
        None => Some(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<ContactRecord> {
        vec![
            ContactRecord::new("Zero", "555-000-0000", 0),
            ContactRecord::new("Alice", "555-123-4567", 4),
            ContactRecord::new("Bob", "555-765-4321", 2),
        ]
    }

    #[tokio::test]
    async fn next_id_is_max_plus_one() {
        let cache = ContactCache::with_records(sample());
        assert_eq!(cache.next_id().await, Some(5));
    }

    #[tokio::test]
    async fn next_id_starts_at_one_when_empty() {
        let cache = ContactCache::new();
        assert!(cache.is_empty().await);
        assert_eq!(cache.next_id().await, Some(1));
    }

    #[tokio::test]
    async fn next_id_is_exhausted_at_i64_max() {
        let cache = ContactCache::with_records(vec![
            ContactRecord::new("Low", "555-000-0000", 1),
            ContactRecord::new("Top", "555-999-9999", i64::MAX),
        ]);
        assert_eq!(cache.next_id().await, None);
    }

    #[tokio::test]
    async fn first_slot_is_found() {
        let cache = ContactCache::with_records(sample());
        let records = cache.snapshot().await;
        assert_eq!(position_by_resource_id(&records, 0), Some(0));
        assert_eq!(position_by_name(&records, "Zero"), Some(0));
        assert_eq!(position_by_resource_id(&records, 99), None);
        assert_eq!(
            cache.find_by_resource_id(0).await.map(|c| c.name),
            Some("Zero".to_string())
        );
    }

    #[tokio::test]
    async fn replace_swaps_whole_collection() {
        let cache = ContactCache::with_records(sample());
        let before = cache.snapshot().await;

        cache
            .replace(vec![ContactRecord::new("Carol", "555-222-3333", 10)])
            .await;

        assert_eq!(before.len(), 3);
        assert_eq!(cache.len().await, 1);
        assert!(cache.find_by_name("Alice").await.is_none());
        assert!(cache.find_by_name("Carol").await.is_some());
    }

    #[tokio::test]
    async fn snapshots_are_stable_without_mutation() {
        let cache = ContactCache::with_records(sample());
        let first = cache.snapshot().await;
        let second = cache.snapshot().await;
        assert_eq!(first, second);
        assert!(Arc::ptr_eq(&first, &second));
    }
}
