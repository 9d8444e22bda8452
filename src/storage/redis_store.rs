//! Redis 存储后端
//!
//! 每条链接存为一个 hash（`id` / `url` / `expires` / `visits`），
//! 过期交给 Redis 原生 EXPIREAT，因此不支持 `clean_expired`。

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::{Script, aio::MultiplexedConnection};
use tokio::sync::RwLock;
use tracing::{debug, error, info, trace};

use crate::config::RedisConfig;
use crate::errors::{Result, ScantyError};
use crate::storage::{BackendStat, Capabilities, Item, LinkBackend};

/// 不存在则写入并设置过期时间，已存在返回 0
const CHECK_AND_SET_SCRIPT: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 1 then
    return 0
end
redis.call('HSET', KEYS[1], 'id', ARGV[1], 'url', ARGV[2], 'expires', ARGV[3], 'visits', 0)
if ARGV[4] ~= '' then
    redis.call('EXPIREAT', KEYS[1], tonumber(ARGV[4]))
end
return 1
"#;

/// 只给仍存在的 key 加访问计数，避免为已过期的链接重建一个没有 TTL 的 hash
const VISIT_SCRIPT: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 0 then
    return -1
end
return redis.call('HINCRBY', KEYS[1], 'visits', 1)
"#;

/// SCAN 每批返回的 key 数量提示
const SCAN_BATCH: usize = 1000;

pub struct RedisBackend {
    client: redis::Client,
    /// 持久化连接，出错时重置
    connection: RwLock<Option<MultiplexedConnection>>,
    key_prefix: String,
    script: Script,
    visit_script: Script,
    closed: AtomicBool,
}

impl RedisBackend {
    /// 建立客户端并 PING 一次，启动阶段连不上直接返回错误
    pub async fn new(config: &RedisConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str())
            .map_err(|e| ScantyError::database_config(format!("Redis URL 无效: {}", e)))?;

        let mut conn = client.get_multiplexed_async_connection().await.map_err(|e| {
            ScantyError::database_connection(format!("无法连接到 Redis ({}): {}", config.url, e))
        })?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        debug!("Redis connection test successful: {}", pong);

        info!("Redis storage initialized (prefix '{}')", config.key_prefix);
        Ok(Self {
            client,
            connection: RwLock::new(Some(conn)),
            key_prefix: config.key_prefix.clone(),
            script: Script::new(CHECK_AND_SET_SCRIPT),
            visit_script: Script::new(VISIT_SCRIPT),
            closed: AtomicBool::new(false),
        })
    }

    fn make_key(&self, id: u64) -> String {
        item_key(&self.key_prefix, id)
    }

    /// 获取或重建连接
    async fn get_connection(&self) -> Result<MultiplexedConnection> {
        if self.closed.load(Ordering::Acquire) {
            return Err(ScantyError::database_connection("closed"));
        }

        {
            let guard = self.connection.read().await;
            if let Some(ref conn) = *guard {
                return Ok(conn.clone());
            }
        }

        let mut guard = self.connection.write().await;
        if let Some(ref conn) = *guard {
            return Ok(conn.clone());
        }

        let conn = self.client.get_multiplexed_async_connection().await?;
        *guard = Some(conn.clone());
        debug!("Redis connection re-established");
        Ok(conn)
    }

    async fn reset_connection(&self, err: &redis::RedisError) {
        if err.is_connection_dropped() || err.is_io_error() {
            *self.connection.write().await = None;
            debug!("Redis connection reset: {}", err);
        }
    }

    /// 读取 hash 并做惰性过期判断
    async fn fetch_active(&self, id: u64) -> Result<Item> {
        let key = self.make_key(id);
        let mut conn = self.get_connection().await?;

        let fields: redis::RedisResult<(Option<String>, Option<String>, Option<i64>)> =
            redis::cmd("HMGET")
                .arg(&key)
                .arg("url")
                .arg("expires")
                .arg("visits")
                .query_async(&mut conn)
                .await;

        let (url, expires, visits) = match fields {
            Ok(v) => v,
            Err(e) => {
                self.reset_connection(&e).await;
                return Err(e.into());
            }
        };

        let url = match url {
            Some(url) if !url.is_empty() => url,
            _ => return Err(ScantyError::no_link(format!("id {} 不存在", id))),
        };

        let item = Item {
            id,
            url,
            expires: parse_expires(expires.as_deref())?,
            visits: visits.unwrap_or(0),
        };

        if item.is_expired() {
            return Err(ScantyError::no_link(format!("id {} 已过期", id)));
        }
        Ok(item)
    }

    /// 统计带前缀的 key 数量，SCAN 不会返回已过期的 key
    async fn count_links(&self, conn: &mut MultiplexedConnection) -> redis::RedisResult<u64> {
        let pattern = scan_pattern(&self.key_prefix);
        let mut cursor: u64 = 0;
        let mut total: u64 = 0;

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(conn)
                .await?;
            total += keys.len() as u64;
            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(total)
    }
}

fn item_key(prefix: &str, id: u64) -> String {
    format!("{}{}", prefix, id)
}

/// 过期时间以 RFC3339 存储，空串表示永不过期
fn format_expires(expires: Option<&DateTime<Utc>>) -> (String, String) {
    match expires {
        Some(at) => (at.to_rfc3339(), expire_at_secs(at).to_string()),
        None => (String::new(), String::new()),
    }
}

/// EXPIREAT 只有秒精度，向上取整，Redis 不会早于 `expires` 删除 key
fn expire_at_secs(at: &DateTime<Utc>) -> i64 {
    if at.timestamp_subsec_nanos() > 0 {
        at.timestamp() + 1
    } else {
        at.timestamp()
    }
}

/// 前缀中的 glob 特殊字符需要转义
fn scan_pattern(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('*');
    pattern
}

fn parse_expires(raw: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    match raw {
        None | Some("") => Ok(None),
        Some(s) => Ok(Some(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))),
    }
}

#[async_trait]
impl LinkBackend for RedisBackend {
    fn name(&self) -> &'static str {
        "redis"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            find: false,
            clean_expired: false,
        }
    }

    async fn create(&self, item: &Item) -> Result<()> {
        let key = self.make_key(item.id);
        let (expires, expire_at) = format_expires(item.expires.as_ref());
        let mut conn = self.get_connection().await?;

        let created: redis::RedisResult<i32> = self
            .script
            .key(&key)
            .arg(item.id.to_string())
            .arg(&item.url)
            .arg(expires)
            .arg(expire_at)
            .invoke_async(&mut conn)
            .await;

        match created {
            Ok(1) => {
                trace!("Link {} stored at {}", item.id, key);
                Ok(())
            }
            Ok(_) => Err(ScantyError::item_duplicated(format!("id {} 已存在", item.id))),
            Err(e) => {
                self.reset_connection(&e).await;
                Err(ScantyError::database_operation(format!(
                    "执行 Redis 写入脚本失败: {}",
                    e
                )))
            }
        }
    }

    async fn load(&self, id: u64) -> Result<String> {
        let item = self.fetch_active(id).await?;

        let visited: redis::RedisResult<i64> = match self.get_connection().await {
            Ok(mut conn) => {
                self.visit_script
                    .key(self.make_key(id))
                    .invoke_async(&mut conn)
                    .await
            }
            Err(e) => {
                error!("更新访问计数失败 (id {}): {}", id, e);
                return Ok(item.url);
            }
        };
        match visited {
            Ok(-1) => debug!("Link {} expired before its visit was recorded", id),
            Ok(_) => {}
            Err(e) => {
                self.reset_connection(&e).await;
                error!("更新访问计数失败 (id {}): {}", id, e);
            }
        }

        Ok(item.url)
    }

    async fn load_info(&self, id: u64) -> Result<Item> {
        self.fetch_active(id).await
    }

    async fn stat(&self) -> Result<BackendStat> {
        if self.closed.load(Ordering::Acquire) {
            return Err(ScantyError::database_connection("closed"));
        }

        let (reachable, active_items) = match self.get_connection().await {
            Ok(mut conn) => {
                let pong: redis::RedisResult<String> =
                    redis::cmd("PING").query_async(&mut conn).await;
                match pong {
                    Ok(_) => match self.count_links(&mut conn).await {
                        Ok(count) => (true, Some(count)),
                        Err(e) => {
                            self.reset_connection(&e).await;
                            error!("统计 Redis 链接失败: {}", e);
                            (true, None)
                        }
                    },
                    Err(e) => {
                        self.reset_connection(&e).await;
                        (false, None)
                    }
                }
            }
            Err(e) => {
                debug!("Redis unreachable: {}", e);
                (false, None)
            }
        };

        Ok(BackendStat {
            backend: "redis".to_string(),
            reachable,
            active_items,
            details: serde_json::json!({
                "key_prefix": self.key_prefix,
                "native_ttl": true,
            }),
        })
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        *self.connection.write().await = None;
        info!("Redis storage closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_item_key_uses_decimal_id() {
        assert_eq!(item_key("link:", 42), "link:42");
        assert_eq!(item_key("x/", u64::MAX), "x/18446744073709551615");
    }

    #[test]
    fn test_format_expires() {
        let at = Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap();
        let (rfc, unix) = format_expires(Some(&at));
        assert_eq!(rfc, "2030-01-02T03:04:05+00:00");
        assert_eq!(unix, at.timestamp().to_string());

        assert_eq!(format_expires(None), (String::new(), String::new()));
    }

    #[test]
    fn test_expire_at_rounds_up_partial_seconds() {
        let whole = Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(expire_at_secs(&whole), whole.timestamp());

        let partial = whole + chrono::Duration::milliseconds(1);
        assert_eq!(expire_at_secs(&partial), whole.timestamp() + 1);

        let (_, unix) = format_expires(Some(&partial));
        assert_eq!(unix, (whole.timestamp() + 1).to_string());
    }

    #[test]
    fn test_scan_pattern_escapes_glob_characters() {
        assert_eq!(scan_pattern("link:"), "link:*");
        assert_eq!(scan_pattern("a*b?[c]"), "a\\*b\\?\\[c\\]*");
        assert_eq!(scan_pattern(""), "*");
    }

    #[test]
    fn test_parse_expires() {
        assert_eq!(parse_expires(None).unwrap(), None);
        assert_eq!(parse_expires(Some("")).unwrap(), None);

        let at = Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(
            parse_expires(Some("2030-01-02T03:04:05+00:00")).unwrap(),
            Some(at)
        );

        let err = parse_expires(Some("tomorrow")).unwrap_err();
        assert!(matches!(err, ScantyError::DateParse(_)));
    }

    #[test]
    fn test_script_guards_existing_key() {
        assert!(CHECK_AND_SET_SCRIPT.contains("EXISTS"));
        assert!(CHECK_AND_SET_SCRIPT.contains("EXPIREAT"));
    }

    /// 指向一个没有服务监听的端口，不经过启动时的 PING
    fn unreachable_backend() -> RedisBackend {
        RedisBackend {
            client: redis::Client::open("redis://127.0.0.1:1/").unwrap(),
            connection: RwLock::new(None),
            key_prefix: "link:".to_string(),
            script: Script::new(CHECK_AND_SET_SCRIPT),
            visit_script: Script::new(VISIT_SCRIPT),
            closed: AtomicBool::new(false),
        }
    }

    #[tokio::test]
    async fn test_stat_reports_unreachable_server() {
        let backend = unreachable_backend();

        let stat = backend.stat().await.unwrap();
        assert!(!stat.reachable);
        assert_eq!(stat.active_items, None);
        assert_eq!(stat.details["key_prefix"], "link:");
    }

    #[tokio::test]
    async fn test_stat_after_close_is_an_error() {
        let backend = unreachable_backend();
        backend.close().await.unwrap();

        let err = backend.stat().await.unwrap_err();
        assert!(matches!(err, ScantyError::DatabaseConnection(_)));
    }

    #[test]
    fn test_visit_script_checks_existence_before_increment() {
        let exists = VISIT_SCRIPT.find("EXISTS").unwrap();
        let incr = VISIT_SCRIPT.find("HINCRBY").unwrap();
        assert!(exists < incr);
        assert!(!VISIT_SCRIPT.contains("EXPIRE"));
    }
}
