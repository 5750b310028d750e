//! Key-value persistence behind the result cache

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::errors::StoreResult;

/// Minimal string key-value store
///
/// Mirrors the `getItem`/`setItem`/`removeItem` contract of browser local
/// storage so the result cache can run on any backend that offers it.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` when the key has never been set
    async fn get_item(&self, key: &str) -> StoreResult<Option<String>>;

    /// Create or overwrite a value
    async fn set_item(&self, key: &str, value: String) -> StoreResult<()>;

    /// Delete a value; deleting a missing key succeeds
    async fn remove_item(&self, key: &str) -> StoreResult<()>;
}

/// Process-local store, contents are lost on restart
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: String) -> StoreResult<()> {
        self.items.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> StoreResult<()> {
        self.items.write().await.remove(key);
        Ok(())
    }
}
