//! 嵌入式 KV 存储后端（redb）
//!
//! 两张表：
//! - `<table>`：十进制 id → JSON 序列化的 `Item`
//! - `<table>_ttl`：过期时间（十进制 unix 秒）→ 主表 key 的多值索引
//!
//! 每次修改都在同一个写事务内同时更新两张表。redb 的调用是同步的，
//! 统一放到 `spawn_blocking` 上执行。

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use redb::{
    Database, MultimapTableDefinition, ReadableMultimapTable, ReadableTable,
    ReadableTableMetadata, TableDefinition,
};
use tracing::{debug, error, info};

use crate::config::EmbeddedConfig;
use crate::errors::{Result, ScantyError};
use crate::storage::{BackendStat, Capabilities, Item, LinkBackend};

/// 两张表的名称
#[derive(Debug, Clone)]
struct TableNames {
    primary: String,
    ttl: String,
}

impl TableNames {
    fn new(table: &str) -> Self {
        Self {
            primary: table.to_string(),
            ttl: format!("{}_ttl", table),
        }
    }

    fn primary(&self) -> TableDefinition<'_, &'static str, &'static [u8]> {
        TableDefinition::new(&self.primary)
    }

    fn ttl(&self) -> MultimapTableDefinition<'_, &'static str, &'static str> {
        MultimapTableDefinition::new(&self.ttl)
    }
}

fn ttl_key(at: &DateTime<Utc>) -> String {
    at.timestamp().to_string()
}

/// 索引中到期时间不晚于 `now` 的 (索引 key, 主表 key)
///
/// 十进制字符串的字典序与数值序不一致，这里整表扫描后按数值过滤。
fn due_entries<T>(ttl: &T, now: DateTime<Utc>) -> Result<Vec<(String, String)>>
where
    T: ReadableMultimapTable<&'static str, &'static str>,
{
    let cutoff = now.timestamp();
    let mut due = Vec::new();
    for entry in ttl.iter()? {
        let (at, keys) = entry?;
        let at = at.value();
        match at.parse::<i64>() {
            Ok(ts) if ts <= cutoff => {}
            Ok(_) => continue,
            Err(_) => {
                debug!("Skipping malformed expiry index key '{}'", at);
                continue;
            }
        }
        for key in keys {
            due.push((at.to_string(), key?.value().to_string()));
        }
    }
    Ok(due)
}

fn decode_item(bytes: &[u8]) -> Result<Item> {
    Ok(serde_json::from_slice(bytes)?)
}

fn create_tables(db: &Database, names: &TableNames) -> Result<()> {
    let txn = db.begin_write()?;
    {
        txn.open_table(names.primary())?;
        txn.open_multimap_table(names.ttl())?;
    }
    txn.commit()?;
    Ok(())
}

fn insert_item(db: &Database, names: &TableNames, item: &Item, now: DateTime<Utc>) -> Result<()> {
    let key = item.id.to_string();
    let value = serde_json::to_vec(item)?;

    let txn = db.begin_write()?;
    let occupied = {
        let mut primary = txn.open_table(names.primary())?;
        let mut ttl = txn.open_multimap_table(names.ttl())?;

        let existing = match primary.get(key.as_str())? {
            Some(guard) => Some(decode_item(guard.value())?),
            None => None,
        };

        match existing {
            Some(old) if !old.is_expired_at(now) => true,
            old => {
                // 覆盖已过期记录时同时清掉它的索引项
                if let Some(old_expires) = old.and_then(|o| o.expires) {
                    ttl.remove(ttl_key(&old_expires).as_str(), key.as_str())?;
                }
                primary.insert(key.as_str(), value.as_slice())?;
                if let Some(expires) = item.expires.as_ref() {
                    ttl.insert(ttl_key(expires).as_str(), key.as_str())?;
                }
                false
            }
        }
    };

    if occupied {
        txn.abort()?;
        return Err(ScantyError::item_duplicated(format!("id {} 已存在", item.id)));
    }

    txn.commit()?;
    Ok(())
}

fn read_item(db: &Database, names: &TableNames, id: u64) -> Result<Option<Item>> {
    let txn = db.begin_read()?;
    let primary = txn.open_table(names.primary())?;
    let key = id.to_string();

    match primary.get(key.as_str())? {
        Some(guard) => Ok(Some(decode_item(guard.value())?)),
        None => Ok(None),
    }
}

fn bump_visits(db: &Database, names: &TableNames, id: u64) -> Result<()> {
    let key = id.to_string();

    let txn = db.begin_write()?;
    {
        let mut primary = txn.open_table(names.primary())?;
        let current = match primary.get(key.as_str())? {
            Some(guard) => Some(decode_item(guard.value())?),
            None => None,
        };

        if let Some(mut item) = current {
            item.visits += 1;
            let value = serde_json::to_vec(&item)?;
            primary.insert(key.as_str(), value.as_slice())?;
        }
    }
    txn.commit()?;
    Ok(())
}

/// 索引中时间不晚于 `now` 的候选项，逐条回查主表确认确实已过期
fn sweep_expired(db: &Database, names: &TableNames, now: DateTime<Utc>) -> Result<u64> {
    let txn = db.begin_write()?;
    let removed = {
        let mut primary = txn.open_table(names.primary())?;
        let mut ttl = txn.open_multimap_table(names.ttl())?;

        let candidates = due_entries(&ttl, now)?;
        let mut removed = 0u64;
        for (at, key) in candidates {
            let record = match primary.get(key.as_str())? {
                Some(guard) => Some(decode_item(guard.value())?),
                None => None,
            };

            match record {
                Some(item) if !item.is_expired_at(now) => continue,
                Some(_) => {
                    primary.remove(key.as_str())?;
                    removed += 1;
                }
                // 主表已无记录，只剩悬空索引
                None => {}
            }
            ttl.remove(at.as_str(), key.as_str())?;
        }
        removed
    };
    txn.commit()?;
    Ok(removed)
}

/// 返回 (总记录数, 已过期记录数)
fn count_items(db: &Database, names: &TableNames, now: DateTime<Utc>) -> Result<(u64, u64)> {
    let txn = db.begin_read()?;
    let primary = txn.open_table(names.primary())?;
    let ttl = txn.open_multimap_table(names.ttl())?;

    let total = primary.len()?;
    let mut expired = 0u64;
    for (_, key) in due_entries(&ttl, now)? {
        if let Some(guard) = primary.get(key.as_str())? {
            if decode_item(guard.value())?.is_expired_at(now) {
                expired += 1;
            }
        }
    }
    Ok((total, expired))
}

pub struct RedbBackend {
    /// close 之后为 None
    db: RwLock<Option<Arc<Database>>>,
    names: TableNames,
    path: String,
}

impl RedbBackend {
    /// 打开（或创建）数据库文件并确保两张表存在
    pub async fn open(config: &EmbeddedConfig) -> Result<Self> {
        if config.table.is_empty() {
            return Err(ScantyError::database_config("嵌入式存储表名不能为空"));
        }

        let names = TableNames::new(&config.table);
        let path = config.path.clone();

        let db = {
            let names = names.clone();
            let path = path.clone();
            tokio::task::spawn_blocking(move || -> Result<Database> {
                let db = Database::create(&path)?;
                create_tables(&db, &names)?;
                Ok(db)
            })
            .await??
        };

        info!("Embedded storage initialized at {}", path);
        Ok(Self {
            db: RwLock::new(Some(Arc::new(db))),
            names,
            path,
        })
    }

    fn handle(&self) -> Result<Arc<Database>> {
        self.db
            .read()
            .clone()
            .ok_or_else(|| ScantyError::database_connection("closed"))
    }

    async fn run_blocking<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Database, &TableNames) -> Result<T> + Send + 'static,
    {
        let db = self.handle()?;
        let names = self.names.clone();
        tokio::task::spawn_blocking(move || op(&db, &names)).await?
    }

    async fn fetch_active(&self, id: u64) -> Result<Item> {
        let item = self
            .run_blocking(move |db, names| read_item(db, names, id))
            .await?;

        match item {
            Some(item) if !item.is_expired() => Ok(item),
            Some(_) => Err(ScantyError::no_link(format!("id {} 已过期", id))),
            None => Err(ScantyError::no_link(format!("id {} 不存在", id))),
        }
    }
}

#[async_trait]
impl LinkBackend for RedbBackend {
    fn name(&self) -> &'static str {
        "redb"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            find: false,
            clean_expired: true,
        }
    }

    async fn create(&self, item: &Item) -> Result<()> {
        let item = item.clone();
        self.run_blocking(move |db, names| insert_item(db, names, &item, Utc::now()))
            .await
    }

    async fn load(&self, id: u64) -> Result<String> {
        let item = self.fetch_active(id).await?;

        if let Err(e) = self
            .run_blocking(move |db, names| bump_visits(db, names, id))
            .await
        {
            error!("更新访问计数失败 (id {}): {}", id, e);
        }

        Ok(item.url)
    }

    async fn load_info(&self, id: u64) -> Result<Item> {
        self.fetch_active(id).await
    }

    async fn stat(&self) -> Result<BackendStat> {
        let (total, expired) = self
            .run_blocking(|db, names| count_items(db, names, Utc::now()))
            .await?;

        Ok(BackendStat {
            backend: "redb".to_string(),
            reachable: true,
            active_items: Some(total.saturating_sub(expired)),
            details: serde_json::json!({
                "path": self.path,
                "table": self.names.primary,
                "ttl_table": self.names.ttl,
                "stored_items": total,
            }),
        })
    }

    async fn close(&self) -> Result<()> {
        if self.db.write().take().is_some() {
            info!("Embedded storage closed");
        }
        Ok(())
    }

    async fn clean_expired(&self) -> Result<u64> {
        let removed = self
            .run_blocking(|db, names| sweep_expired(db, names, Utc::now()))
            .await?;
        debug!("Embedded storage swept {} expired links", removed);
        Ok(removed)
    }
}
