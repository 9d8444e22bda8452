//! Write operations for SeaOrmBackend

use chrono::Utc;
use sea_orm::{ColumnTrait, DbErr, EntityTrait, ExprTrait, QueryFilter, SqlErr, sea_query::Expr};
use tracing::{debug, error, info};

use super::SeaOrmBackend;
use super::converters::item_to_active_model;
use super::retry;
use crate::errors::{Result, ScantyError};
use crate::storage::Item;

use migration::entities::link;

/// 唯一索引冲突即 id 已被占用
fn map_insert_error(id: u64, err: DbErr) -> ScantyError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            ScantyError::item_duplicated(format!("id {} 已存在", id))
        }
        _ => ScantyError::database_operation(format!("插入链接失败: {}", err)),
    }
}

impl SeaOrmBackend {
    pub(super) async fn insert_item(&self, item: &Item) -> Result<()> {
        let db = &self.db;

        retry::with_retry(&format!("create({})", item.id), self.retry_config, || async {
            link::Entity::insert(item_to_active_model(item))
                .exec_without_returning(db)
                .await
        })
        .await
        .map_err(|e| map_insert_error(item.id, e))?;

        debug!("Link {} inserted", item.id);
        Ok(())
    }

    /// 访问计数 +1，失败只记日志
    pub(super) async fn record_visit(&self, id: u64) {
        let result = link::Entity::update_many()
            .col_expr(
                link::Column::Visits,
                Expr::col(link::Column::Visits).add(1),
            )
            .filter(link::Column::Id.eq(id as i64))
            .exec(&self.db)
            .await;

        if let Err(e) = result {
            error!("更新访问计数失败 (id {}): {}", id, e);
        }
    }

    pub(super) async fn delete_expired(&self) -> Result<u64> {
        let db = &self.db;
        let now = Utc::now();

        let result = retry::with_retry("clean_expired", self.retry_config, || async {
            link::Entity::delete_many()
                .filter(link::Column::Expires.is_not_null())
                .filter(link::Column::Expires.lt(now))
                .exec(db)
                .await
        })
        .await
        .map_err(|e| ScantyError::database_operation(format!("清理过期链接失败: {}", e)))?;

        if result.rows_affected > 0 {
            info!("Removed {} expired links", result.rows_affected);
        }
        Ok(result.rows_affected)
    }
}
