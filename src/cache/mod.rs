//! Result cache and its key-value persistence backends

pub mod file_store;
pub mod result_cache;
pub mod store;

use std::sync::Arc;

pub use file_store::FileStore;
pub use result_cache::ResultCache;
pub use store::{KeyValueStore, MemoryStore};

use crate::config::{CacheBackend, CacheConfig};
use crate::errors::{AppError, AppResult};

/// Open the key-value backend selected in the configuration
pub async fn open_store(config: &CacheConfig) -> AppResult<Arc<dyn KeyValueStore>> {
    match config.backend {
        CacheBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        CacheBackend::File => {
            let store = FileStore::open(&config.path).await.map_err(|e| {
                AppError::configuration(format!(
                    "cannot open cache directory {:?}: {}",
                    config.path, e
                ))
            })?;
            Ok(Arc::new(store))
        }
    }
}
