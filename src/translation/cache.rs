/*!
 * Translation caching functionality.
 *
 * Lookups are keyed on the original, undecoded label text so repeated raw
 * strings short-circuit before any cleaning. The in-memory map lives as long
 * as the cache value; an optional SQLite store carries entries across runs.
 */

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::{debug, warn};
use parking_lot::RwLock;

use crate::database::Repository;
use crate::database::models::{CacheRecord, StoredKey};
use crate::translation::glossary::PairKey;

/// Cache key combining the raw text and the translation direction
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    /// Raw label text
    source_text: String,

    /// Translation direction
    pair: PairKey,
}

impl CacheKey {
    fn new(source_text: &str, pair: PairKey) -> Self {
        Self {
            source_text: source_text.to_string(),
            pair,
        }
    }
}

/// SQLite backing of the cache
#[derive(Debug, Clone)]
struct PersistentStore {
    repository: Repository,
    engine: String,
    model: String,
}

impl PersistentStore {
    fn key(&self, source_text: &str, pair: PairKey) -> StoredKey {
        let config = pair.config();
        StoredKey::new(
            source_text,
            config.source_code,
            config.target_code,
            &self.engine,
            &self.model,
        )
    }
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicUsize,
    misses: AtomicUsize,
}

/// Translation cache for storing and retrieving translations
#[derive(Debug, Clone)]
pub struct TranslationCache {
    /// Internal cache storage
    cache: Arc<RwLock<HashMap<CacheKey, String>>>,

    /// Hit and miss counters shared by clones
    counters: Arc<Counters>,

    /// Whether caching is enabled
    enabled: bool,

    /// Optional store shared across runs
    persistent: Option<PersistentStore>,
}

impl TranslationCache {
    /// Create a new translation cache
    pub fn new(enabled: bool) -> Self {
        Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
            counters: Arc::default(),
            enabled,
            persistent: None,
        }
    }

    /// Back the cache with a SQLite repository for the given engine
    pub fn with_persistence(mut self, repository: Repository, engine: &str, model: &str) -> Self {
        self.persistent = Some(PersistentStore {
            repository,
            engine: engine.to_string(),
            model: model.to_string(),
        });
        self
    }

    /// Get a translation from the cache
    pub async fn get(&self, source_text: &str, pair: PairKey) -> Option<String> {
        if !self.enabled {
            return None;
        }

        let key = CacheKey::new(source_text, pair);
        let memory_hit = self.cache.read().get(&key).cloned();
        if let Some(translation) = memory_hit {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            debug!("Cache hit for '{}' ({})", truncate_text(source_text, 30), pair);
            return Some(translation);
        }

        if let Some(store) = &self.persistent {
            match store
                .repository
                .get_cached_translation(&store.key(source_text, pair))
                .await
            {
                Ok(Some(translation)) => {
                    self.cache.write().insert(key, translation.clone());
                    self.counters.hits.fetch_add(1, Ordering::Relaxed);
                    debug!(
                        "Persistent cache hit for '{}' ({})",
                        truncate_text(source_text, 30),
                        pair
                    );
                    return Some(translation);
                }
                Ok(None) => {}
                Err(e) => warn!("Persistent cache lookup failed: {}", e),
            }
        }

        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        debug!("Cache miss for '{}' ({})", truncate_text(source_text, 30), pair);
        None
    }

    /// Store a translation in the cache
    pub async fn store(&self, source_text: &str, pair: PairKey, translation: &str) {
        if !self.enabled {
            return;
        }

        self.cache
            .write()
            .insert(CacheKey::new(source_text, pair), translation.to_string());
        debug!("Cached translation for '{}' ({})", truncate_text(source_text, 30), pair);

        if let Some(store) = &self.persistent {
            let record = CacheRecord::new(store.key(source_text, pair), source_text, translation);
            if let Err(e) = store.repository.cache_translation(&record).await {
                warn!("Persistent cache store failed: {}", e);
            }
        }
    }

    /// Get cache statistics: hits, misses and hit rate
    pub fn stats(&self) -> (usize, usize, f64) {
        let hits = self.counters.hits.load(Ordering::Relaxed);
        let misses = self.counters.misses.load(Ordering::Relaxed);
        let lookups = hits + misses;
        let hit_rate = if lookups == 0 {
            0.0
        } else {
            hits as f64 / lookups as f64
        };
        (hits, misses, hit_rate)
    }

    /// Clear the in-memory entries and counters
    pub fn clear(&self) {
        self.cache.write().clear();
        self.counters.hits.store(0, Ordering::Relaxed);
        self.counters.misses.store(0, Ordering::Relaxed);
        debug!("Translation cache cleared");
    }

    /// Get the number of entries in memory
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }

    /// Check if the cache is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Check if a persistent store backs the cache
    pub fn is_persistent(&self) -> bool {
        self.persistent.is_some()
    }
}

impl Default for TranslationCache {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Truncate text to a maximum number of characters with ellipsis
pub(crate) fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}
