pub use sea_orm_migration::prelude::*;

pub mod entities;
mod m20261001_000001_links_table;
mod m20261001_000002_links_expires_index;
mod m20261001_000003_links_url_index;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_links_table::Migration),
            Box::new(m20261001_000002_links_expires_index::Migration),
            Box::new(m20261001_000003_links_url_index::Migration),
        ]
    }
}

/// `links` 表的列标识，供各个迁移共用
#[derive(DeriveIden)]
pub(crate) enum Links {
    Table,
    Id,
    Url,
    Expires,
    Visits,
}
