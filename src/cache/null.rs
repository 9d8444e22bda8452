use async_trait::async_trait;
use tracing::debug;

use crate::cache::{CacheCounters, CacheStats, ReadCache};
use crate::errors::Result;

/// 关闭缓存时使用：永远未命中，写入直接丢弃
#[derive(Default)]
pub struct NullReadCache {
    counters: CacheCounters,
}

impl NullReadCache {
    pub fn new() -> Self {
        debug!("Using NullReadCache: reads always go to the backend");
        Self::default()
    }
}

#[async_trait]
impl ReadCache for NullReadCache {
    async fn get(&self, _id: u64) -> Option<String> {
        self.counters.record(false);
        None
    }

    async fn insert(&self, _id: u64, _url: String) -> Result<()> {
        Ok(())
    }

    fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }

    fn name(&self) -> &'static str {
        "none"
    }
}
