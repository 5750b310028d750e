//! Content-addressed analysis result cache with bounded LRU retention

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::store::KeyValueStore;
use crate::config::CacheConfig;
use crate::errors::{AppError, AppResult};
use crate::models::HistoryEntry;

/// Bounded mapping from image content hash to a previously computed result
///
/// Entries are persisted as one JSON array, most recently used first, under a
/// single key of the backing store. Every operation loads that array, applies
/// the change and writes it back while holding `lock`, so concurrent callers
/// see a consistent order and never a duplicate hash.
///
/// The cache is an optimization only: a failing or corrupt store makes it
/// behave as an empty cache and writes become no-ops.
pub struct ResultCache {
    store: Arc<dyn KeyValueStore>,
    storage_key: String,
    capacity: NonZeroUsize,
    lock: Mutex<()>,
}

impl ResultCache {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        storage_key: impl Into<String>,
        capacity: NonZeroUsize,
    ) -> Self {
        Self {
            store,
            storage_key: storage_key.into(),
            capacity,
            lock: Mutex::new(()),
        }
    }

    /// Build from configuration, rejecting a zero capacity
    pub fn from_config(store: Arc<dyn KeyValueStore>, config: &CacheConfig) -> AppResult<Self> {
        let capacity = NonZeroUsize::new(config.capacity)
            .ok_or_else(|| AppError::configuration("cache.capacity must be at least 1"))?;
        Ok(Self::new(store, config.storage_key.clone(), capacity))
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Insert or replace an entry as most recently used, evicting the least
    /// recently used entries beyond capacity
    ///
    /// The stored history is read back before writing. When that read fails
    /// or returns unreadable JSON while the write succeeds, the previous
    /// history is lost and the store ends up holding only this entry.
    pub async fn put(&self, entry: HistoryEntry) {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await;

        let hash = entry.hash.clone();
        if let Some((evicted, _)) = entries.push(hash.clone(), entry) {
            if evicted != hash {
                info!("Evicted least recently used result {}", evicted);
            }
        }

        self.persist(&entries).await;
    }

    /// Look up a result by hash and promote it to most recently used
    pub async fn get(&self, hash: &str) -> Option<HistoryEntry> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await;

        let Some(entry) = entries.get(hash).cloned() else {
            debug!("Result cache miss for {}", hash);
            return None;
        };

        debug!("Result cache hit for {}", hash);
        self.persist(&entries).await;
        Some(entry)
    }

    /// Drop every entry
    pub async fn clear(&self) {
        let _guard = self.lock.lock().await;
        if let Err(e) = self.store.remove_item(&self.storage_key).await {
            warn!("Failed to clear result cache: {}", e);
        }
    }

    /// All entries, most recently used first; does not change the order
    pub async fn list_all(&self) -> Vec<HistoryEntry> {
        let _guard = self.lock.lock().await;
        self.load()
            .await
            .iter()
            .map(|(_, entry)| entry.clone())
            .collect()
    }

    pub async fn len(&self) -> usize {
        let _guard = self.lock.lock().await;
        self.load().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn load(&self) -> LruCache<String, HistoryEntry> {
        let mut entries = LruCache::new(self.capacity);

        let raw = match self.store.get_item(&self.storage_key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return entries,
            Err(e) => {
                warn!("Result cache store unavailable, treating as empty: {}", e);
                return entries;
            }
        };

        let stored: Vec<HistoryEntry> = match serde_json::from_str(&raw) {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Discarding unreadable result cache contents: {}", e);
                return entries;
            }
        };

        // Stored most recent first; replay oldest first so recency is rebuilt
        for entry in stored.into_iter().rev() {
            entries.put(entry.hash.clone(), entry);
        }
        entries
    }

    async fn persist(&self, entries: &LruCache<String, HistoryEntry>) {
        let ordered: Vec<&HistoryEntry> = entries.iter().map(|(_, entry)| entry).collect();

        let json = match serde_json::to_string(&ordered) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize result cache: {}", e);
                return;
            }
        };

        if let Err(e) = self.store.set_item(&self.storage_key, json).await {
            warn!("Failed to persist result cache: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use crate::errors::{StoreError, StoreResult};
    use crate::models::AnalysisResult;
    use async_trait::async_trait;
    use proptest::prelude::*;

    const KEY: &str = "wastesnap_upload_history";

    fn entry(hash: &str) -> HistoryEntry {
        HistoryEntry {
            hash: hash.to_string(),
            image_data_url: format!("data:image/png;base64,{hash}"),
            result: AnalysisResult::from_detections(Vec::new()),
            timestamp: 1_700_000_000_000,
        }
    }

    fn cache_with(store: Arc<dyn KeyValueStore>, capacity: usize) -> ResultCache {
        ResultCache::new(store, KEY, NonZeroUsize::new(capacity).unwrap())
    }

    fn hashes(entries: &[HistoryEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.hash.as_str()).collect()
    }

    struct UnavailableStore;

    #[async_trait]
    impl KeyValueStore for UnavailableStore {
        async fn get_item(&self, _key: &str) -> StoreResult<Option<String>> {
            Err(StoreError::unavailable("storage disabled"))
        }

        async fn set_item(&self, _key: &str, _value: String) -> StoreResult<()> {
            Err(StoreError::unavailable("quota exceeded"))
        }

        async fn remove_item(&self, _key: &str) -> StoreResult<()> {
            Err(StoreError::unavailable("storage disabled"))
        }
    }

    /// Reads fail while `fail_reads` is set; writes always go through
    #[derive(Default)]
    struct FlakyReadStore {
        inner: MemoryStore,
        fail_reads: std::sync::atomic::AtomicBool,
    }

    #[async_trait]
    impl KeyValueStore for FlakyReadStore {
        async fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
            if self.fail_reads.load(std::sync::atomic::Ordering::SeqCst) {
                return Err(StoreError::unavailable("read timed out"));
            }
            self.inner.get_item(key).await
        }

        async fn set_item(&self, key: &str, value: String) -> StoreResult<()> {
            self.inner.set_item(key, value).await
        }

        async fn remove_item(&self, key: &str) -> StoreResult<()> {
            self.inner.remove_item(key).await
        }
    }

    #[tokio::test]
    async fn test_put_after_failed_read_keeps_only_new_entry() {
        let store = Arc::new(FlakyReadStore::default());
        let cache = cache_with(store.clone(), 5);
        cache.put(entry("a")).await;
        cache.put(entry("b")).await;

        store
            .fail_reads
            .store(true, std::sync::atomic::Ordering::SeqCst);
        cache.put(entry("c")).await;
        store
            .fail_reads
            .store(false, std::sync::atomic::Ordering::SeqCst);

        assert_eq!(hashes(&cache.list_all().await), vec!["c"]);
    }

    #[tokio::test]
    async fn test_sixth_put_evicts_least_recently_used() {
        let cache = cache_with(Arc::new(MemoryStore::new()), 5);
        for hash in ["a", "b", "c", "d", "e", "f"] {
            cache.put(entry(hash)).await;
        }

        let entries = cache.list_all().await;
        assert_eq!(hashes(&entries), vec!["f", "e", "d", "c", "b"]);
        assert!(cache.get("a").await.is_none());
    }

    #[tokio::test]
    async fn test_get_promotes_entry() {
        let cache = cache_with(Arc::new(MemoryStore::new()), 5);
        for hash in ["a", "b", "c"] {
            cache.put(entry(hash)).await;
        }

        assert_eq!(cache.get("a").await, Some(entry("a")));
        assert_eq!(hashes(&cache.list_all().await), vec!["a", "c", "b"]);

        // The promoted entry now survives the next eviction instead of "b"
        let cache_small = cache_with(Arc::new(MemoryStore::new()), 3);
        for hash in ["a", "b", "c"] {
            cache_small.put(entry(hash)).await;
        }
        cache_small.get("a").await;
        cache_small.put(entry("d")).await;
        assert_eq!(hashes(&cache_small.list_all().await), vec!["d", "a", "c"]);
    }

    #[tokio::test]
    async fn test_duplicate_put_replaces() {
        let cache = cache_with(Arc::new(MemoryStore::new()), 5);
        cache.put(entry("a")).await;
        cache.put(entry("b")).await;

        let mut updated = entry("a");
        updated.timestamp = 42;
        cache.put(updated.clone()).await;

        let entries = cache.list_all().await;
        assert_eq!(hashes(&entries), vec!["a", "b"]);
        assert_eq!(entries[0], updated);
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn test_put_then_get_round_trip() {
        let cache = cache_with(Arc::new(MemoryStore::new()), 5);
        let original = entry("abc123");
        cache.put(original.clone()).await;
        assert_eq!(cache.get("abc123").await, Some(original));
    }

    #[tokio::test]
    async fn test_list_all_does_not_reorder() {
        let cache = cache_with(Arc::new(MemoryStore::new()), 5);
        cache.put(entry("a")).await;
        cache.put(entry("b")).await;
        cache.list_all().await;
        assert_eq!(hashes(&cache.list_all().await), vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_miss_does_not_write() {
        let store = Arc::new(MemoryStore::new());
        let cache = cache_with(store.clone(), 5);
        assert!(cache.get("missing").await.is_none());
        assert_eq!(store.get_item(KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clear() {
        let store = Arc::new(MemoryStore::new());
        let cache = cache_with(store.clone(), 5);
        cache.put(entry("a")).await;
        cache.clear().await;

        assert!(cache.is_empty().await);
        assert_eq!(store.get_item(KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_persisted_format_is_mru_first_camel_case() {
        let store = Arc::new(MemoryStore::new());
        let cache = cache_with(store.clone(), 5);
        cache.put(entry("a")).await;
        cache.put(entry("b")).await;

        let raw = store.get_item(KEY).await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["hash"], "b");
        assert_eq!(value[1]["hash"], "a");
        assert_eq!(value[0]["imageDataUrl"], "data:image/png;base64,b");
    }

    #[tokio::test]
    async fn test_state_is_shared_through_the_store() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        cache_with(store.clone(), 5).put(entry("a")).await;

        let reopened = cache_with(store, 5);
        assert_eq!(reopened.get("a").await, Some(entry("a")));
    }

    #[tokio::test]
    async fn test_smaller_capacity_truncates_stored_history() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let large = cache_with(store.clone(), 5);
        for hash in ["a", "b", "c", "d", "e"] {
            large.put(entry(hash)).await;
        }

        let small = cache_with(store, 2);
        assert_eq!(hashes(&small.list_all().await), vec!["e", "d"]);
    }

    #[tokio::test]
    async fn test_corrupt_contents_are_treated_as_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set_item(KEY, "{not json".to_string()).await.unwrap();

        let cache = cache_with(store.clone(), 5);
        assert!(cache.list_all().await.is_empty());
        assert!(cache.get("a").await.is_none());

        cache.put(entry("a")).await;
        assert_eq!(hashes(&cache.list_all().await), vec!["a"]);
    }

    #[tokio::test]
    async fn test_unavailable_store_degrades_to_noop() {
        let cache = cache_with(Arc::new(UnavailableStore), 5);

        cache.put(entry("a")).await;
        assert!(cache.get("a").await.is_none());
        assert!(cache.list_all().await.is_empty());
        cache.clear().await;
    }

    #[tokio::test]
    async fn test_concurrent_puts_keep_invariants() {
        let cache = Arc::new(cache_with(Arc::new(MemoryStore::new()), 5));
        let mut handles = Vec::new();
        for i in 0..20 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                cache.put(entry(&format!("h{}", i % 7))).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let entries = cache.list_all().await;
        assert_eq!(entries.len(), 5);
        let mut unique = hashes(&entries);
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 5);
    }

    #[test]
    fn test_from_config_rejects_zero_capacity() {
        let mut config = CacheConfig::default();
        config.capacity = 0;
        assert!(ResultCache::from_config(Arc::new(MemoryStore::new()), &config).is_err());

        config.capacity = 3;
        let cache = ResultCache::from_config(Arc::new(MemoryStore::new()), &config).unwrap();
        assert_eq!(cache.capacity(), 3);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Put(u8),
        Get(u8),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..8).prop_map(Op::Put),
            (0u8..8).prop_map(Op::Get),
        ]
    }

    proptest! {
        #[test]
        fn prop_lru_invariants_hold(capacity in 1usize..6, ops in prop::collection::vec(op_strategy(), 0..40)) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            runtime.block_on(async {
                let cache = cache_with(Arc::new(MemoryStore::new()), capacity);
                let mut model: Vec<String> = Vec::new();

                for op in ops {
                    match op {
                        Op::Put(n) => {
                            let hash = format!("h{n}");
                            cache.put(entry(&hash)).await;
                            model.retain(|h| h != &hash);
                            model.insert(0, hash);
                            model.truncate(capacity);
                        }
                        Op::Get(n) => {
                            let hash = format!("h{n}");
                            let found = cache.get(&hash).await;
                            let position = model.iter().position(|h| h == &hash);
                            assert_eq!(found.is_some(), position.is_some());
                            if let Some(position) = position {
                                let hash = model.remove(position);
                                model.insert(0, hash);
                            }
                        }
                    }

                    let listed = cache.list_all().await;
                    assert!(listed.len() <= capacity);
                    assert_eq!(hashes(&listed), model.iter().map(String::as_str).collect::<Vec<_>>());
                }
            });
        }
    }
}
