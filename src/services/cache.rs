use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::constants::RESPONSE_CACHE_TTL_SECONDS;

/// Cache entry for a single memoized response
#[derive(Clone, Debug)]
struct CacheEntry {
    payload: Value,
    cached_at: DateTime<Utc>,
}

/// Memoization cache keyed by input signature.
///
/// Results are stored as their serialized form, so a cache hit returns a
/// structure byte-for-byte identical to the one first computed: repeat
/// requests with identical inputs are idempotent within the TTL.
pub struct ResponseCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl_seconds: i64,
}

impl ResponseCache {
    pub fn new(ttl_seconds: i64) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl_seconds,
        }
    }

    pub fn with_default_ttl() -> Self {
        Self::new(RESPONSE_CACHE_TTL_SECONDS)
    }

    /// Build a cache key from an operation name and its inputs
    pub fn signature(operation: &str, inputs: &[&str]) -> String {
        format!("{}:{}", operation, inputs.join(","))
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;

        let age = (Utc::now() - entry.cached_at).num_seconds();
        if age >= self.ttl_seconds {
            debug!(key, age, "Cache entry expired");
            return None;
        }

        match serde_json::from_value(entry.payload.clone()) {
            Ok(value) => {
                debug!(key, age, "Cache hit");
                Some(value)
            }
            Err(_) => None,
        }
    }

    pub async fn put<T: Serialize>(&self, key: &str, value: &T) {
        let payload = match serde_json::to_value(value) {
            Ok(payload) => payload,
            Err(e) => {
                debug!(key, error = %e, "Skipping uncacheable value");
                return;
            }
        };

        let now = Utc::now();
        let mut entries = self.entries.write().await;
        // Evict stale entries on every write so the map cannot grow without
        // bound across distinct signatures
        entries.retain(|_, entry| (now - entry.cached_at).num_seconds() < self.ttl_seconds);
        entries.insert(
            key.to_string(),
            CacheEntry {
                payload,
                cached_at: now,
            },
        );
    }

    /// Drop entries older than the TTL
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| (now - entry.cached_at).num_seconds() < self.ttl_seconds);
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PortfolioRow, Position};

    #[tokio::test]
    async fn test_hit_returns_identical_structure() {
        let cache = ResponseCache::new(60);
        let row = PortfolioRow::price(&Position::new("AAPL", 2.0, 100.0), 110.0);

        let key = ResponseCache::signature("portfolio", &["AAPL"]);
        cache.put(&key, &row).await;

        let cached: PortfolioRow = cache.get(&key).await.expect("cache hit");
        assert_eq!(cached, row);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_miss_on_different_signature() {
        let cache = ResponseCache::new(60);
        cache
            .put(&ResponseCache::signature("quote", &["AAPL"]), &42u32)
            .await;

        let missed: Option<u32> = cache.get(&ResponseCache::signature("quote", &["TSLA"])).await;
        assert_eq!(missed, None);
    }

    #[tokio::test]
    async fn test_put_evicts_expired_entries() {
        // Zero TTL: every earlier entry is stale by the time the next
        // write lands, so the map never accumulates dead signatures
        let cache = ResponseCache::new(0);
        for symbol in ["AAPL", "TSLA", "MSFT", "AMZN"] {
            cache
                .put(&ResponseCache::signature("quote", &[symbol]), &1u32)
                .await;
        }
        assert_eq!(cache.len().await, 1);

        // Live entries are kept by the same write path
        let cache = ResponseCache::new(3600);
        cache.put("a", &1u32).await;
        cache.put("b", &2u32).await;
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn test_expiry() {
        // Zero TTL: everything is already expired
        let cache = ResponseCache::new(0);
        cache.put("k", &1u32).await;

        let value: Option<u32> = cache.get("k").await;
        assert_eq!(value, None);
        assert_eq!(cache.purge_expired().await, 1);
        assert_eq!(cache.len().await, 0);
    }

    #[test]
    fn test_signature_format() {
        assert_eq!(
            ResponseCache::signature("screener", &["AAPL", "TSLA"]),
            "screener:AAPL,TSLA"
        );
    }
}
