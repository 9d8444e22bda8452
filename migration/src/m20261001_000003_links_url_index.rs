use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DatabaseBackend;

const URL_INDEX: &str = "links_url_idx";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if manager.has_index("links", URL_INDEX).await? {
            return Ok(());
        }

        let sql = match manager.get_database_backend() {
            // 只做等值查询（按 url 去重），hash 索引足够且更小
            DatabaseBackend::Postgres => "CREATE INDEX links_url_idx ON links USING HASH (url)",
            // TEXT 列只能建前缀索引
            DatabaseBackend::MySql => "CREATE INDEX links_url_idx ON links (url(191))",
            _ => "CREATE INDEX links_url_idx ON links (url)",
        };
        manager.get_connection().execute_unprepared(sql).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let sql = match manager.get_database_backend() {
            DatabaseBackend::MySql => "DROP INDEX links_url_idx ON links",
            _ => "DROP INDEX IF EXISTS links_url_idx",
        };
        manager.get_connection().execute_unprepared(sql).await?;
        Ok(())
    }
}
