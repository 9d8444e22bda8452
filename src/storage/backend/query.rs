//! Read-only operations for SeaOrmBackend

use chrono::Utc;
use sea_orm::{ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect};

use super::SeaOrmBackend;
use super::converters::model_to_item;
use super::retry;
use crate::errors::{Result, ScantyError};
use crate::storage::{BackendStat, Item};

use migration::entities::link;

/// 未过期条件：expires 为空或晚于当前时间
fn active_condition() -> Condition {
    Condition::any()
        .add(link::Column::Expires.is_null())
        .add(link::Column::Expires.gt(Utc::now()))
}

impl SeaOrmBackend {
    /// 按 id 读取记录，过期记录视为不存在（不删除）
    pub(super) async fn fetch_active(&self, id: u64) -> Result<Item> {
        let db = &self.db;

        let model = retry::with_retry(&format!("load({})", id), self.retry_config, || async {
            link::Entity::find_by_id(id as i64).one(db).await
        })
        .await
        .map_err(|e| ScantyError::database_operation(format!("查询链接失败: {}", e)))?;

        match model.map(model_to_item) {
            Some(item) if !item.is_expired() => Ok(item),
            Some(_) => Err(ScantyError::no_link(format!("id {} 已过期", id))),
            None => Err(ScantyError::no_link(format!("id {} 不存在", id))),
        }
    }

    pub(super) async fn find_active_by_url(&self, url: &str) -> Result<Option<u64>> {
        let db = &self.db;

        let found = retry::with_retry("find", self.retry_config, || async {
            link::Entity::find()
                .select_only()
                .column(link::Column::Id)
                .filter(link::Column::Url.eq(url))
                .filter(active_condition())
                .into_tuple::<i64>()
                .one(db)
                .await
        })
        .await
        .map_err(|e| ScantyError::database_operation(format!("按 URL 查询失败: {}", e)))?;

        Ok(found.map(|id| id as u64))
    }

    pub(super) async fn collect_stat(&self) -> Result<BackendStat> {
        let reachable = self.db.ping().await.is_ok();

        let active_items = if reachable {
            let count = link::Entity::find()
                .filter(active_condition())
                .count(&self.db)
                .await
                .map_err(|e| ScantyError::database_operation(format!("统计链接失败: {}", e)))?;
            Some(count)
        } else {
            None
        };

        Ok(BackendStat {
            backend: self.backend_name.clone(),
            reachable,
            active_items,
            details: serde_json::json!({
                "pool_size": self.pool_size,
                "retry_count": self.retry_config.max_retries,
            }),
        })
    }
}
