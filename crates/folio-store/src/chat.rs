//! Per-paper chat history storage.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::BoxFuture;
use crate::error::StoreError;
use crate::types::{ChatMessage, PaperId};

/// Conversation storage keyed by paper id.
pub trait ChatStore: Send + Sync {
    /// Replace the full history for a paper.
    fn save(
        &self,
        id: PaperId,
        messages: Vec<ChatMessage>,
    ) -> BoxFuture<'_, Result<(), StoreError>>;

    /// Load the history for a paper. A paper with no history yet loads
    /// as an empty list, not an error.
    fn load(&self, id: PaperId) -> BoxFuture<'_, Result<Vec<ChatMessage>, StoreError>>;

    /// Drop the history for a paper. Absent ids are not an error.
    fn delete(&self, id: PaperId) -> BoxFuture<'_, Result<(), StoreError>>;
}

/// Process-local `ChatStore` backed by a `RwLock`-guarded map.
pub struct InMemoryChatStore {
    histories: RwLock<HashMap<PaperId, Vec<ChatMessage>>>,
}

impl InMemoryChatStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            histories: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryChatStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryChatStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryChatStore").finish_non_exhaustive()
    }
}

impl ChatStore for InMemoryChatStore {
    fn save(
        &self,
        id: PaperId,
        messages: Vec<ChatMessage>,
    ) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            let mut histories = self
                .histories
                .write()
                .map_err(|e| StoreError::Poisoned(e.to_string()))?;
            histories.insert(id, messages);
            Ok(())
        })
    }

    fn load(&self, id: PaperId) -> BoxFuture<'_, Result<Vec<ChatMessage>, StoreError>> {
        Box::pin(async move {
            let histories = self
                .histories
                .read()
                .map_err(|e| StoreError::Poisoned(e.to_string()))?;
            Ok(histories.get(&id).cloned().unwrap_or_default())
        })
    }

    fn delete(&self, id: PaperId) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            let mut histories = self
                .histories
                .write()
                .map_err(|e| StoreError::Poisoned(e.to_string()))?;
            histories.remove(&id);
            Ok(())
        })
    }
}
