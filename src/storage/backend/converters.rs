use crate::storage::Item;
use migration::entities::link;

/// 将 Sea-ORM Model 转换为 Item
///
/// 数据库中 id 以有符号 BIGINT 存储，这里按位还原为 u64。
pub fn model_to_item(model: link::Model) -> Item {
    Item {
        id: model.id as u64,
        url: model.url,
        expires: model.expires,
        visits: model.visits.max(0) as i64,
    }
}

/// 将 Item 转换为 ActiveModel（只用于插入）
pub fn item_to_active_model(item: &Item) -> link::ActiveModel {
    use sea_orm::ActiveValue::*;

    link::ActiveModel {
        id: Set(item.id as i64),
        url: Set(item.url.clone()),
        expires: Set(item.expires),
        // 新记录访问数由列默认值决定
        visits: NotSet,
    }
}
