use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DatabaseBackend;

use crate::Links;

const ID_UNIQUE_INDEX: &str = "links_id_uniq";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 先检查表是否已存在，已存在则跳过建表
        if !manager.has_table("links").await? {
            let mut url = ColumnDef::new(Links::Url);
            // MySQL 的 VARCHAR 必须指定长度，长链接统一用 TEXT
            if manager.get_database_backend() == DatabaseBackend::MySql {
                url.text();
            } else {
                url.string();
            }
            url.not_null();

            manager
                .create_table(
                    Table::create()
                        .table(Links::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Links::Id).big_integer().not_null())
                        .col(&mut url)
                        .col(
                            ColumnDef::new(Links::Expires)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Links::Visits)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .to_owned(),
                )
                .await?;
        }

        if !manager.has_index("links", ID_UNIQUE_INDEX).await? {
            manager
                .create_index(
                    Index::create()
                        .name(ID_UNIQUE_INDEX)
                        .table(Links::Table)
                        .col(Links::Id)
                        .unique()
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Links::Table).if_exists().to_owned())
            .await
    }
}
