use async_trait::async_trait;
use moka::future::Cache;
use moka::policy::EvictionPolicy;
use tracing::{debug, trace};

use crate::cache::{CacheCounters, CacheStats, ReadCache};
use crate::errors::Result;

/// 基于 moka 的定容读缓存，满时按 LRU 淘汰
pub struct MokaReadCache {
    inner: Cache<u64, String>,
    counters: CacheCounters,
}

impl MokaReadCache {
    pub fn new(max_capacity: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .eviction_policy(EvictionPolicy::lru())
            .build();
        debug!("MokaReadCache created with capacity {}", max_capacity);
        Self {
            inner,
            counters: CacheCounters::default(),
        }
    }

    /// 当前条目数（近似值）
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// 处理挂起的淘汰任务，测试里用来得到确定的条目数
    pub async fn run_pending_tasks(&self) {
        self.inner.run_pending_tasks().await;
    }
}

#[async_trait]
impl ReadCache for MokaReadCache {
    async fn get(&self, id: u64) -> Option<String> {
        let value = self.inner.get(&id).await;
        self.counters.record(value.is_some());
        trace!("MokaReadCache.get({}) hit={}", id, value.is_some());
        value
    }

    async fn insert(&self, id: u64, url: String) -> Result<()> {
        self.inner.insert(id, url).await;
        Ok(())
    }

    fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_miss_then_hit() {
        let cache = MokaReadCache::new(16);

        assert_eq!(cache.get(1).await, None);
        cache.insert(1, "https://example.com".to_string()).await.unwrap();
        assert_eq!(cache.get(1).await.as_deref(), Some("https://example.com"));

        let stats = cache.stats();
        assert_eq!(stats.lookups, 2);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn test_capacity_is_bounded() {
        let cache = MokaReadCache::new(8);
        for id in 0..100u64 {
            cache.insert(id, format!("https://example.com/{}", id)).await.unwrap();
        }
        cache.run_pending_tasks().await;

        assert!(cache.entry_count() <= 8, "entry_count = {}", cache.entry_count());
    }
}
