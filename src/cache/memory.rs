use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use super::{CacheError, CacheStore};

/// In-process cache store. Entries expire lazily on read.
pub struct MemoryCache {
    /// key -> (value, expires_at)
    entries: DashMap<String, (String, Instant)>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Drop every expired entry.
    pub fn cleanup(&self) {
        let now = Instant::now();
        self.entries.retain(|_, (_, expires_at)| *expires_at > now);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Instant::now();
        let value = match self.entries.get(key) {
            Some(entry) if entry.value().1 > now => Some(entry.value().0.clone()),
            Some(_) => None,
            None => return Ok(None),
        };

        if value.is_none() {
            self.entries.remove_if(key, |_, (_, expires_at)| *expires_at <= now);
        }
        Ok(value)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        self.entries
            .insert(key.to_string(), (value, Instant::now() + ttl));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn expired_entries_read_as_missing() {
        let cache = MemoryCache::new();
        cache.set("short", "a".to_string(), Duration::ZERO).await.unwrap();
        cache.set("long", "b".to_string(), Duration::from_secs(60)).await.unwrap();

        assert_eq!(cache.get("short").await.unwrap(), None);
        assert_eq!(cache.get("long").await.unwrap(), Some("b".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn cleanup_removes_expired_entries() {
        let cache = MemoryCache::new();
        cache.set("a", "1".to_string(), Duration::ZERO).await.unwrap();
        cache.set("b", "2".to_string(), Duration::ZERO).await.unwrap();
        cache.set("c", "3".to_string(), Duration::from_secs(60)).await.unwrap();

        cache.cleanup();
        assert_eq!(cache.len(), 1);
    }
}
