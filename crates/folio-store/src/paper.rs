//! Paper record storage.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::BoxFuture;
use crate::error::StoreError;
use crate::types::{PaperId, PaperRecord};

/// Keyed storage for processed papers.
pub trait PaperStore: Send + Sync {
    /// Insert or replace the record for its id.
    fn put(&self, record: PaperRecord) -> BoxFuture<'_, Result<(), StoreError>>;

    /// Fetch a record by id, `None` when absent.
    fn get(&self, id: PaperId) -> BoxFuture<'_, Result<Option<PaperRecord>, StoreError>>;

    /// Remove a record. Removing an absent id is not an error.
    fn delete(&self, id: PaperId) -> BoxFuture<'_, Result<(), StoreError>>;
}

/// Process-local `PaperStore` backed by a `RwLock`-guarded map.
///
/// Contents live exactly as long as the process.
pub struct InMemoryPaperStore {
    papers: RwLock<HashMap<PaperId, PaperRecord>>,
}

impl InMemoryPaperStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            papers: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryPaperStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryPaperStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryPaperStore").finish_non_exhaustive()
    }
}

impl PaperStore for InMemoryPaperStore {
    fn put(&self, record: PaperRecord) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            let mut papers = self
                .papers
                .write()
                .map_err(|e| StoreError::Poisoned(e.to_string()))?;
            papers.insert(record.id, record);
            Ok(())
        })
    }

    fn get(&self, id: PaperId) -> BoxFuture<'_, Result<Option<PaperRecord>, StoreError>> {
        Box::pin(async move {
            let papers = self
                .papers
                .read()
                .map_err(|e| StoreError::Poisoned(e.to_string()))?;
            Ok(papers.get(&id).cloned())
        })
    }

    fn delete(&self, id: PaperId) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            let mut papers = self
                .papers
                .write()
                .map_err(|e| StoreError::Poisoned(e.to_string()))?;
            papers.remove(&id);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::types::SectionKind;

    fn record(id: PaperId) -> PaperRecord {
        let mut sections = BTreeMap::new();
        sections.insert(SectionKind::Abstract, "study of things".to_owned());
        PaperRecord {
            id,
            full_text: "Abstract study of things".to_owned(),
            sections,
            summaries: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn put_then_get_returns_record() {
        let store = InMemoryPaperStore::new();
        let id = PaperId::new();
        store.put(record(id)).await.unwrap();

        let found = store.get(id).await.unwrap();
        assert_eq!(found.map(|r| r.id), Some(id));
    }

    #[tokio::test]
    async fn get_unknown_id_returns_none() {
        let store = InMemoryPaperStore::new();
        let found = store.get(PaperId::new()).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn put_replaces_existing_record() {
        let store = InMemoryPaperStore::new();
        let id = PaperId::new();
        store.put(record(id)).await.unwrap();

        let mut updated = record(id);
        updated.full_text = "revised".to_owned();
        store.put(updated).await.unwrap();

        let found = store.get(id).await.unwrap().unwrap();
        assert_eq!(found.full_text, "revised");
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let store = InMemoryPaperStore::new();
        let id = PaperId::new();
        store.put(record(id)).await.unwrap();
        store.delete(id).await.unwrap();
        assert!(store.get(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_absent_id_is_ok() {
        let store = InMemoryPaperStore::new();
        store.delete(PaperId::new()).await.unwrap();
    }

    #[tokio::test]
    async fn records_are_isolated_per_id() {
        let store = InMemoryPaperStore::new();
        let first = PaperId::new();
        let second = PaperId::new();
        store.put(record(first)).await.unwrap();
        store.put(record(second)).await.unwrap();
        store.delete(first).await.unwrap();

        assert!(store.get(first).await.unwrap().is_none());
        assert!(store.get(second).await.unwrap().is_some());
    }
}
