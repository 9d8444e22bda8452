//! SeaORM storage backend
//!
//! This module provides the relational backend using SeaORM,
//! supporting SQLite, MySQL/MariaDB, and PostgreSQL.

mod connection;
mod converters;
mod mutations;
mod query;
pub mod retry;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::errors::{Result, ScantyError};
use crate::storage::{BackendStat, Capabilities, Item, LinkBackend};

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use converters::{item_to_active_model, model_to_item};

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite:")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(ScantyError::database_config(format!(
            "无法从 URL 推断数据库类型: {}. 支持的 URL 格式: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct SeaOrmBackend {
    db: DatabaseConnection,
    backend_name: String,
    pool_size: u32,
    /// 重试配置
    retry_config: retry::RetryConfig,
}

impl SeaOrmBackend {
    pub async fn new(config: &DatabaseConfig, backend_name: &str) -> Result<Self> {
        if config.url.is_empty() {
            return Err(ScantyError::database_config(
                "数据库 URL 未设置".to_string(),
            ));
        }

        let retry_config = retry::RetryConfig {
            max_retries: config.retry_count,
            base_delay_ms: config.retry_base_delay_ms,
            max_delay_ms: config.retry_max_delay_ms,
        };

        // 根据不同数据库类型配置连接选项
        let db = if backend_name == "sqlite" {
            connect_sqlite(config).await?
        } else {
            connect_generic(config, backend_name).await?
        };

        let backend = SeaOrmBackend {
            db,
            backend_name: backend_name.to_string(),
            pool_size: config.pool_size.max(1),
            retry_config,
        };

        // 运行迁移
        run_migrations(&backend.db).await?;

        info!(
            "{} Storage initialized.",
            backend.backend_name.to_uppercase()
        );
        Ok(backend)
    }

    /// 获取数据库连接（测试或运维工具直接查看物理数据时使用）
    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl LinkBackend for SeaOrmBackend {
    fn name(&self) -> &'static str {
        match self.backend_name.as_str() {
            "postgres" => "postgres",
            "mysql" => "mysql",
            _ => "sqlite",
        }
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            find: true,
            clean_expired: true,
        }
    }

    async fn create(&self, item: &Item) -> Result<()> {
        self.insert_item(item).await
    }

    async fn load(&self, id: u64) -> Result<String> {
        let item = self.fetch_active(id).await?;
        self.record_visit(id).await;
        Ok(item.url)
    }

    async fn load_info(&self, id: u64) -> Result<Item> {
        self.fetch_active(id).await
    }

    async fn find(&self, url: &str) -> Result<Option<u64>> {
        self.find_active_by_url(url).await
    }

    async fn stat(&self) -> Result<BackendStat> {
        self.collect_stat().await
    }

    async fn close(&self) -> Result<()> {
        self.db
            .clone()
            .close()
            .await
            .map_err(|e| ScantyError::database_connection(format!("关闭数据库连接失败: {}", e)))?;
        info!("{} Storage closed.", self.backend_name.to_uppercase());
        Ok(())
    }

    async fn clean_expired(&self) -> Result<u64> {
        self.delete_expired().await
    }
}
