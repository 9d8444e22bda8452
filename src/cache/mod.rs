//! 读缓存
//!
//! 读取链路先查缓存，未命中再查后端并回填。缓存只是优化手段，
//! 写入失败只记日志，不会导致请求失败。

pub mod memory;
pub mod null;
pub mod traits;

use std::sync::Arc;

use tracing::info;

use crate::config::{CacheConfig, CacheKind};

pub use memory::MokaReadCache;
pub use null::NullReadCache;
pub use traits::{CacheCounters, CacheStats, ReadCache};

pub struct CacheFactory;

impl CacheFactory {
    pub fn create(config: &CacheConfig) -> Arc<dyn ReadCache> {
        let cache: Arc<dyn ReadCache> = match config.cache_type {
            CacheKind::Memory => Arc::new(MokaReadCache::new(config.max_capacity)),
            CacheKind::None => Arc::new(NullReadCache::new()),
        };
        info!("Using {} read cache", cache.name());
        cache
    }
}
