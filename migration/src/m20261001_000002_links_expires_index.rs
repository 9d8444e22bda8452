use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DatabaseBackend;

use crate::Links;

const EXPIRES_INDEX: &str = "links_expires_idx";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if manager.has_index("links", EXPIRES_INDEX).await? {
            return Ok(());
        }

        match manager.get_database_backend() {
            DatabaseBackend::Postgres | DatabaseBackend::Sqlite => {
                // 部分索引：只索引设置了过期时间的链接，清理任务按此扫描
                manager
                    .get_connection()
                    .execute_unprepared(
                        "CREATE INDEX links_expires_idx ON links (expires) WHERE expires IS NOT NULL",
                    )
                    .await?;
            }
            _ => {
                // MySQL 不支持部分索引，退化为普通索引
                manager
                    .create_index(
                        Index::create()
                            .name(EXPIRES_INDEX)
                            .table(Links::Table)
                            .col(Links::Expires)
                            .to_owned(),
                    )
                    .await?;
            }
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(EXPIRES_INDEX)
                    .table(Links::Table)
                    .to_owned(),
            )
            .await
    }
}
