// src/services/cache.rs
//
// Two-tier cache: an ephemeral in-process map in front of a durable KV
// store, with per-entity-class TTLs. Values are opaque JSON; the cache never
// inspects payload structure.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::utils::{Clock, ProfileError, ProfileResult};

const HOUR_MS: u64 = 60 * 60 * 1_000;
const DAY_MS: u64 = 24 * HOUR_MS;

/// Cacheable entity classes, each with its own TTL and key namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityClass {
    /// (name, tag) → player id. Immutable once resolved.
    Identity,
    /// (player id, scope) → ordered match ids. The upstream list grows.
    MatchIdList,
    /// match id → record. Write-once: upstream match data is immutable.
    MatchDetail,
    /// (name, tag) → regional cluster. Slowly changing.
    Region,
}

impl EntityClass {
    pub fn ttl_ms(&self) -> u64 {
        match self {
            EntityClass::Identity => 7 * DAY_MS,
            EntityClass::MatchIdList => HOUR_MS,
            EntityClass::MatchDetail => 30 * DAY_MS,
            EntityClass::Region => 30 * DAY_MS,
        }
    }

    pub fn namespace(&self) -> &'static str {
        match self {
            EntityClass::Identity => "identity",
            EntityClass::MatchIdList => "matches",
            EntityClass::MatchDetail => "match",
            EntityClass::Region => "region",
        }
    }

    pub fn all() -> [EntityClass; 4] {
        [
            EntityClass::Identity,
            EntityClass::MatchIdList,
            EntityClass::MatchDetail,
            EntityClass::Region,
        ]
    }
}

/// Stored envelope: entry is valid iff `now − written_at ≤ ttl`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub value: serde_json::Value,
    pub written_at_ms: u64,
    pub ttl_ms: u64,
}

impl CacheEntry {
    pub fn is_valid(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.written_at_ms) <= self.ttl_ms
    }
}

/// Durable tier seam. Writes are atomic per key; last-write-wins is correct
/// because match details are write-once and identity/region writes are
/// idempotent refreshes.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> ProfileResult<Option<String>>;
    async fn put(&self, key: &str, value: String) -> ProfileResult<()>;
    async fn delete(&self, key: &str) -> ProfileResult<()>;
    async fn clear(&self) -> ProfileResult<()>;
}

/// In-memory durable-tier implementation.
#[derive(Default)]
pub struct InMemoryKvStore {
    data: Mutex<HashMap<String, String>>,
}

impl InMemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for InMemoryKvStore {
    async fn get(&self, key: &str) -> ProfileResult<Option<String>> {
        Ok(self.data.lock().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: String) -> ProfileResult<()> {
        self.data.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> ProfileResult<()> {
        self.data.lock().await.remove(key);
        Ok(())
    }

    async fn clear(&self) -> ProfileResult<()> {
        self.data.lock().await.clear();
        Ok(())
    }
}

pub struct TieredCache {
    memory: Mutex<HashMap<String, CacheEntry>>,
    durable: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
}

impl TieredCache {
    pub fn new(durable: Arc<dyn KvStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            memory: Mutex::new(HashMap::new()),
            durable,
            clock,
        }
    }

    fn full_key(class: EntityClass, key: &str) -> String {
        format!("{}:{}", class.namespace(), key)
    }

    /// Ephemeral tier first; on miss, the durable tier (valid entries are
    /// promoted, expired ones purged lazily).
    pub async fn get<T: DeserializeOwned>(
        &self,
        class: EntityClass,
        key: &str,
    ) -> ProfileResult<Option<T>> {
        let full_key = Self::full_key(class, key);
        let now_ms = self.clock.now_ms();

        {
            let mut memory = self.memory.lock().await;
            if let Some(entry) = memory.get(&full_key) {
                if entry.is_valid(now_ms) {
                    return Ok(Some(decode(entry.value.clone())?));
                }
                memory.remove(&full_key);
            }
        }

        match self.durable.get(&full_key).await? {
            Some(raw) => {
                let entry: CacheEntry = match serde_json::from_str(&raw) {
                    Ok(entry) => entry,
                    Err(_) => {
                        // Corrupt envelope: drop it and treat as a miss.
                        self.durable.delete(&full_key).await?;
                        return Ok(None);
                    }
                };
                if entry.is_valid(now_ms) {
                    let value = decode(entry.value.clone())?;
                    self.memory.lock().await.insert(full_key, entry);
                    Ok(Some(value))
                } else {
                    self.durable.delete(&full_key).await?;
                    Ok(None)
                }
            }
            None => Ok(None),
        }
    }

    /// Write to both tiers unconditionally with the class TTL.
    pub async fn set<T: Serialize>(
        &self,
        class: EntityClass,
        key: &str,
        value: &T,
    ) -> ProfileResult<()> {
        let full_key = Self::full_key(class, key);
        let entry = CacheEntry {
            value: serde_json::to_value(value).map_err(|e| {
                ProfileError::serialization_error(format!("cache value encoding failed: {}", e))
            })?,
            written_at_ms: self.clock.now_ms(),
            ttl_ms: class.ttl_ms(),
        };
        let raw = serde_json::to_string(&entry).map_err(|e| {
            ProfileError::serialization_error(format!("cache entry encoding failed: {}", e))
        })?;

        self.memory.lock().await.insert(full_key.clone(), entry);
        self.durable.put(&full_key, raw).await
    }

    /// Erase both tiers across all entity classes. Explicit invalidation,
    /// not a hot-path operation.
    pub async fn clear(&self) -> ProfileResult<()> {
        self.memory.lock().await.clear();
        self.durable.clear().await
    }
}

fn decode<T: DeserializeOwned>(value: serde_json::Value) -> ProfileResult<T> {
    serde_json::from_value(value)
        .map_err(|e| ProfileError::cache_error(format!("cache value decoding failed: {}", e)))
}
