use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::Serialize;

use crate::errors::Result;

/// 读缓存统计快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub lookups: u64,
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// 命中率，尚无查询时为 0
    pub fn hit_rate(&self) -> f64 {
        if self.lookups == 0 {
            0.0
        } else {
            self.hits as f64 / self.lookups as f64
        }
    }
}

/// 查询计数器，各缓存实现共用
#[derive(Debug, Default)]
pub struct CacheCounters {
    lookups: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CacheCounters {
    pub fn record(&self, hit: bool) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        if hit {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> CacheStats {
        CacheStats {
            lookups: self.lookups.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// id → URL 的旁路读缓存
///
/// 缓存不感知过期时间，条目只会被容量淘汰。
#[async_trait]
pub trait ReadCache: Send + Sync {
    async fn get(&self, id: u64) -> Option<String>;

    /// 写入失败由调用方记日志，不影响读取结果
    async fn insert(&self, id: u64, url: String) -> Result<()>;

    fn stats(&self) -> CacheStats;

    /// 缓存实现名称
    fn name(&self) -> &'static str;
}
