//! 存储层
//!
//! `LinkBackend` 是三种存储后端的统一接口：
//! - `relational`：sea-orm（SQLite / MySQL / PostgreSQL）
//! - `redis`：Redis，依赖原生过期
//! - `embedded`：redb 嵌入式 KV
//!
//! 具体后端在启动时由 `StorageFactory` 按配置选定。

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config::{BackendKind, StorageConfig};
use crate::errors::Result;

pub mod backend;
pub mod cleaner;
pub mod models;
pub mod redb_store;
pub mod redis_store;

pub use backend::SeaOrmBackend;
pub use cleaner::{CleanerHandle, ExpiryCleaner};
pub use models::{BackendStat, Capabilities, Item};
pub use redb_store::RedbBackend;
pub use redis_store::RedisBackend;

#[async_trait]
pub trait LinkBackend: Send + Sync {
    /// 后端名称，用于日志和诊断
    fn name(&self) -> &'static str;

    /// 可选能力，静态声明
    fn capabilities(&self) -> Capabilities;

    /// 插入新记录。id 已被有效记录占用时返回 `ItemDuplicated`。
    async fn create(&self, item: &Item) -> Result<()>;

    /// 返回 URL；不存在或已过期返回 `NoLink`。
    ///
    /// 成功后尽力累加访问计数，计数失败不影响读取结果。
    async fn load(&self, id: u64) -> Result<String>;

    /// 返回完整记录；不存在或已过期返回 `NoLink`。
    async fn load_info(&self, id: u64) -> Result<Item>;

    /// 按 URL 查找仍有效的 id
    async fn find(&self, _url: &str) -> Result<Option<u64>> {
        Ok(None)
    }

    /// 诊断信息，不修改任何状态
    async fn stat(&self) -> Result<BackendStat>;

    /// 释放连接等资源，关闭流程中调用一次
    async fn close(&self) -> Result<()>;

    /// 删除所有已过期记录，返回删除数量
    async fn clean_expired(&self) -> Result<u64> {
        Ok(0)
    }
}

pub struct StorageFactory;

impl StorageFactory {
    pub async fn create(config: &StorageConfig) -> Result<Arc<dyn LinkBackend>> {
        let backend: Arc<dyn LinkBackend> = match config.kind {
            BackendKind::Relational => {
                let backend_name = backend::infer_backend_from_url(&config.database.url)?;
                Arc::new(SeaOrmBackend::new(&config.database, &backend_name).await?)
            }
            BackendKind::Redis => Arc::new(RedisBackend::new(&config.redis).await?),
            BackendKind::Embedded => Arc::new(RedbBackend::open(&config.embedded).await?),
        };

        info!(
            "Using {} storage backend ({})",
            config.kind,
            backend.name()
        );
        Ok(backend)
    }
}
