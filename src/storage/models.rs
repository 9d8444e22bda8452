use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 持久化的短链接记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: u64,
    pub url: String,
    pub expires: Option<DateTime<Utc>>,

    #[serde(default)]
    pub visits: i64,
}

impl Item {
    pub fn new(id: u64, url: impl Into<String>, expires: Option<DateTime<Utc>>) -> Self {
        Self {
            id,
            url: url.into(),
            expires,
            visits: 0,
        }
    }

    /// 过期时间已到（含等于）即视为不可见
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires.is_some_and(|exp| exp <= now)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// 后端静态能力声明
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    /// 支持按 URL 反查 id
    pub find: bool,
    /// 支持批量删除过期数据，决定是否启动清理任务
    pub clean_expired: bool,
}

/// 后端诊断快照
#[derive(Debug, Clone, Serialize)]
pub struct BackendStat {
    pub backend: String,
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_items: Option<u64>,
    pub details: serde_json::Value,
}
