// Result cache - bounded, most-recent-first gallery of generated artifacts
// Author: kelexine (https://github.com/kelexine)

use super::models::{CacheEntry, GenerationResult};
use super::storage::{FileStorage, Storage};
use super::{DEFAULT_CAPACITY, STORAGE_KEY};
use crate::error::Result;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Size-bounded gallery persisted under a single storage key.
///
/// Entries are kept most-recent-first. New entries always go to the front and
/// nothing else reorders them; once the bound is exceeded the oldest entries
/// are dropped. Each mutation is one full read-modify-write of the stored
/// sequence.
pub struct ResultCache<S = FileStorage> {
    storage: S,
    capacity: usize,
}

impl<S: Storage> ResultCache<S> {
    pub fn new(storage: S) -> Self {
        Self::with_capacity(storage, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(storage: S, capacity: usize) -> Self {
        Self {
            storage,
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// All entries, most recent first. Unreadable storage yields an empty gallery.
    pub fn load(&self) -> Vec<CacheEntry> {
        let stored = match self.storage.get(STORAGE_KEY) {
            Ok(Some(value)) => value,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Gallery storage unreadable, starting empty: {}", e);
                return Vec::new();
            }
        };

        let Value::Array(items) = stored else {
            warn!("Gallery storage does not hold a list, starting empty");
            return Vec::new();
        };

        let mut entries: Vec<CacheEntry> = Vec::with_capacity(items.len());
        for item in items {
            match serde_json::from_value::<CacheEntry>(item) {
                Ok(entry) if entries.iter().any(|e| e.uuid() == entry.uuid()) => {
                    debug!("Skipping duplicate gallery entry {}", entry.uuid());
                }
                Ok(entry) => entries.push(entry),
                Err(e) => warn!("Skipping unreadable gallery entry: {}", e),
            }
        }
        entries.truncate(self.capacity);
        entries
    }

    pub fn get(&self, id: &str) -> Option<CacheEntry> {
        self.load().into_iter().find(|e| e.uuid() == id)
    }

    pub fn len(&self) -> usize {
        self.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Prepend `result` and evict anything beyond the capacity.
    ///
    /// An existing entry with the same uuid is replaced, so identifiers stay
    /// unique within the gallery.
    pub fn insert(&self, mut result: GenerationResult, round_trip: Duration) -> Result<CacheEntry> {
        result.rename_reserved_extras();
        let entry = CacheEntry {
            result,
            timestamp: chrono::Utc::now().timestamp_millis(),
            round_trip_seconds: round_trip.as_secs_f64(),
        };

        let mut entries = self.load();
        entries.retain(|e| e.uuid() != entry.uuid());
        entries.insert(0, entry.clone());

        let evicted = entries.len().saturating_sub(self.capacity);
        entries.truncate(self.capacity);
        self.persist(&entries)?;

        crate::metrics::record_gallery_operation("insert", 1);
        crate::metrics::record_gallery_operation("evict", evicted as u64);
        if evicted > 0 {
            debug!("Evicted {} gallery entries beyond capacity {}", evicted, self.capacity);
        }
        info!("Stored {} in gallery ({} entries)", entry.uuid(), entries.len());

        Ok(entry)
    }

    /// Delete the entry with `id`. Returns whether anything was removed.
    pub fn remove(&self, id: &str) -> Result<bool> {
        let mut entries = self.load();
        let before = entries.len();
        entries.retain(|e| e.uuid() != id);
        if entries.len() == before {
            return Ok(false);
        }

        self.persist(&entries)?;
        crate::metrics::record_gallery_operation("remove", 1);
        debug!("Removed {} from gallery", id);
        Ok(true)
    }

    /// Empty the gallery. Confirming with the user is the caller's job.
    pub fn clear(&self) -> Result<()> {
        self.storage.remove(STORAGE_KEY)?;
        crate::metrics::record_gallery_operation("clear", 1);
        crate::metrics::update_gallery_entries(0);
        info!("Gallery cleared");
        Ok(())
    }

    fn persist(&self, entries: &[CacheEntry]) -> Result<()> {
        self.storage.set(STORAGE_KEY, serde_json::to_value(entries)?)?;
        crate::metrics::update_gallery_entries(entries.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{ArtifactKind, MemoryStorage};
    use serde_json::json;

    fn result(id: &str) -> GenerationResult {
        let body = json!({"image": {"uuid": id, "url": format!("https://cdn.example/{}.jpg", id)}});
        GenerationResult::from_envelope(ArtifactKind::Image, &body).unwrap()
    }

    #[test]
    fn test_insert_prepends() {
        let cache = ResultCache::new(MemoryStorage::new());
        cache.insert(result("a"), Duration::from_millis(10)).unwrap();
        cache.insert(result("b"), Duration::from_millis(10)).unwrap();

        let ids: Vec<_> = cache.load().iter().map(|e| e.uuid().to_string()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_reinsert_moves_to_front() {
        let cache = ResultCache::new(MemoryStorage::new());
        for id in ["a", "b", "c"] {
            cache.insert(result(id), Duration::ZERO).unwrap();
        }
        cache.insert(result("a"), Duration::ZERO).unwrap();

        let ids: Vec<_> = cache.load().iter().map(|e| e.uuid().to_string()).collect();
        assert_eq!(ids, vec!["a", "c", "b"]);
    }

    #[test]
    fn test_round_trip_recorded() {
        let cache = ResultCache::new(MemoryStorage::new());
        let entry = cache.insert(result("a"), Duration::from_millis(1500)).unwrap();
        assert_eq!(entry.round_trip_seconds, 1.5);
        assert!(entry.inserted_at().is_some());
    }

    #[test]
    fn test_reserved_extra_survives_storage() {
        let cache = ResultCache::new(MemoryStorage::new());
        let mut r = result("a");
        r.extra.insert("timestamp".to_string(), json!("upstream-value"));

        let entry = cache.insert(r, Duration::ZERO).unwrap();
        let loaded = cache.load();
        assert_eq!(loaded[0], entry);
        assert_eq!(loaded[0].result.extra["upstreamTimestamp"], json!("upstream-value"));
    }

    #[test]
    fn test_non_list_storage_loads_empty() {
        let storage = MemoryStorage::new();
        storage.set(STORAGE_KEY, json!({"not": "a list"})).unwrap();
        assert!(ResultCache::new(storage).load().is_empty());
    }

    #[test]
    fn test_bad_entries_are_skipped() {
        let storage = MemoryStorage::new();
        storage
            .set(STORAGE_KEY, json!([{"uuid": "ok", "timestamp": 1, "frontendGenerationTime": 0.5}, {"garbage": true}]))
            .unwrap();
        let entries = ResultCache::new(storage).load();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].uuid(), "ok");
    }
}
