use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::BaseDocumentStore;
use crate::domains::analyzer::models::{AnalysisRecord, CollectionPath, StoredRecord};
use crate::domains::identity::Identity;

/// Process-local document store for development and tests.
/// Contents are lost on restart.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<CollectionPath, Vec<StoredRecord>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records in a collection, oldest first.
    pub async fn records(&self, collection: &CollectionPath) -> Vec<StoredRecord> {
        self.collections
            .read()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn total_records(&self) -> usize {
        self.collections.read().await.values().map(Vec::len).sum()
    }
}

#[async_trait]
impl BaseDocumentStore for InMemoryDocumentStore {
    async fn append(
        &self,
        _identity: &Identity,
        collection: &CollectionPath,
        record: &AnalysisRecord,
    ) -> Result<String> {
        let stored = StoredRecord {
            id: Uuid::now_v7().to_string(),
            record: record.clone(),
            created_at: Utc::now(),
        };
        let id = stored.id.clone();

        self.collections
            .write()
            .await
            .entry(collection.clone())
            .or_default()
            .push(stored);

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::identity::UserId;

    #[tokio::test]
    async fn test_append_is_keyed_by_collection() {
        let store = InMemoryDocumentStore::new();
        let alice = Identity::new(UserId::new("alice"));
        let bob = Identity::new(UserId::new("bob"));
        let alice_path = CollectionPath::presence_analysis("app", &alice.user_id);
        let bob_path = CollectionPath::presence_analysis("app", &bob.user_id);

        let record = AnalysisRecord {
            business_name: "Shukla Chaat House".into(),
            location: "Lucknow".into(),
            result: "* Add photos".into(),
        };

        let first = store.append(&alice, &alice_path, &record).await.unwrap();
        let second = store.append(&alice, &alice_path, &record).await.unwrap();
        store.append(&bob, &bob_path, &record).await.unwrap();

        let alice_records = store.records(&alice_path).await;
        assert_eq!(alice_records.len(), 2);
        assert_eq!(alice_records[0].id, first);
        assert_eq!(alice_records[1].id, second);
        assert!(alice_records[0].created_at <= alice_records[1].created_at);
        assert_eq!(store.total_records().await, 3);
    }
}
