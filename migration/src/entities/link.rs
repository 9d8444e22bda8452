use sea_orm::entity::prelude::*;

/// `links` 表。表上没有主键约束，`id` 由唯一索引 `links_id_uniq` 保证唯一，
/// 这里把它声明为主键只是为了让 ORM 能按 id 定位行。
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "links")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    #[sea_orm(column_type = "Text")]
    pub url: String,
    pub expires: Option<DateTimeUtc>,
    pub visits: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
