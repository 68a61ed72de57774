//! Process-wide memoization of corpus and example-search calls.
//!
//! Entries expire per operation class (search, fetch, examples). Expired
//! entries are recomputed on the next call and overwritten. Failures are
//! never stored: an empty hit list or an article without text is refused by
//! [`ResultCache::put`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use lawpack_core::{ArticlePack, StatuteHit};
use moka::future::Cache;
use moka::Expiry;
use serde::{Deserialize, Serialize};

use crate::case_examples::ExampleItem;
use crate::config::CacheConfig;

/// The kind of call a cache entry memoizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationClass {
    Search,
    Fetch,
    Examples,
}

impl OperationClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationClass::Search => "search",
            OperationClass::Fetch => "fetch",
            OperationClass::Examples => "examples",
        }
    }

    fn slot(&self) -> usize {
        match self {
            OperationClass::Search => 0,
            OperationClass::Fetch => 1,
            OperationClass::Examples => 2,
        }
    }
}

/// Operation plus its exact arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Search {
        query: String,
        limit: usize,
    },
    Fetch {
        id: String,
        article_hint: Option<String>,
    },
    Examples {
        query: String,
        category: String,
        limit: usize,
    },
}

impl CacheKey {
    pub fn class(&self) -> OperationClass {
        match self {
            CacheKey::Search { .. } => OperationClass::Search,
            CacheKey::Fetch { .. } => OperationClass::Fetch,
            CacheKey::Examples { .. } => OperationClass::Examples,
        }
    }
}

/// A memoized result.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheValue {
    Search(Vec<StatuteHit>),
    Fetch(ArticlePack),
    Examples(Vec<ExampleItem>),
}

impl CacheValue {
    /// Results that count as failures and must not be cached.
    pub fn is_failure(&self) -> bool {
        match self {
            CacheValue::Search(hits) => hits.is_empty(),
            CacheValue::Fetch(pack) => !pack.has_text(),
            CacheValue::Examples(items) => items.is_empty(),
        }
    }
}

#[derive(Clone)]
struct Entry {
    value: CacheValue,
    ttl: Duration,
}

struct PerEntryTtl;

impl Expiry<CacheKey, Entry> for PerEntryTtl {
    fn expire_after_create(&self, _key: &CacheKey, entry: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &CacheKey,
        entry: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// Hit and miss counts for one operation class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassStats {
    pub hits: u64,
    pub misses: u64,
}

/// Counter snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub search: ClassStats,
    pub fetch: ClassStats,
    pub examples: ClassStats,
}

impl CacheStats {
    pub fn get(&self, class: OperationClass) -> ClassStats {
        match class {
            OperationClass::Search => self.search,
            OperationClass::Fetch => self.fetch,
            OperationClass::Examples => self.examples,
        }
    }
}

/// TTL cache shared by all runs in the process.
pub struct ResultCache {
    cache: Cache<CacheKey, Entry>,
    search_ttl: Duration,
    fetch_ttl: Duration,
    examples_ttl: Duration,
    hits: [AtomicU64; 3],
    misses: [AtomicU64; 3],
}

impl ResultCache {
    pub fn new(config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_entries)
            .expire_after(PerEntryTtl)
            .build();

        Self {
            cache,
            search_ttl: config.search_ttl,
            fetch_ttl: config.fetch_ttl,
            examples_ttl: config.examples_ttl,
            hits: Default::default(),
            misses: Default::default(),
        }
    }

    /// Configured TTL for an operation class.
    pub fn ttl_for(&self, class: OperationClass) -> Duration {
        match class {
            OperationClass::Search => self.search_ttl,
            OperationClass::Fetch => self.fetch_ttl,
            OperationClass::Examples => self.examples_ttl,
        }
    }

    /// A live entry for `key`. Counts a hit or a miss.
    pub async fn get(&self, key: &CacheKey) -> Option<CacheValue> {
        let class = key.class();
        match self.cache.get(key).await {
            Some(entry) => {
                self.hits[class.slot()].fetch_add(1, Ordering::Relaxed);
                tracing::debug!(class = class.as_str(), ?key, "cache hit");
                Some(entry.value)
            }
            None => {
                self.misses[class.slot()].fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store `value` for `ttl`, overwriting any previous entry.
    /// Returns `false` when the value is a failure and was not stored.
    pub async fn put(&self, key: CacheKey, value: CacheValue, ttl: Duration) -> bool {
        if value.is_failure() {
            tracing::debug!(class = key.class().as_str(), ?key, "not caching empty result");
            return false;
        }
        self.cache.insert(key, Entry { value, ttl }).await;
        true
    }

    /// [`put`](Self::put) with the class TTL from configuration.
    pub async fn put_default(&self, key: CacheKey, value: CacheValue) -> bool {
        let ttl = self.ttl_for(key.class());
        self.put(key, value, ttl).await
    }

    pub fn stats(&self) -> CacheStats {
        let class = |c: OperationClass| ClassStats {
            hits: self.hits[c.slot()].load(Ordering::Relaxed),
            misses: self.misses[c.slot()].load(Ordering::Relaxed),
        };
        CacheStats {
            search: class(OperationClass::Search),
            fetch: class(OperationClass::Fetch),
            examples: class(OperationClass::Examples),
        }
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

impl std::fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache")
            .field("entries", &self.entry_count())
            .field("stats", &self.stats())
            .finish()
    }
}
