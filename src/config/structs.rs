use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, IntoEnumIterator};

use crate::errors::{Result, ScantyError};

/// 存储后端类型
///
/// 启动时由配置决定，之后不再变化。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, Display, AsRefStr, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BackendKind {
    /// SQLite / MySQL / PostgreSQL（sea-orm）
    #[default]
    #[serde(alias = "psql", alias = "postgres", alias = "sqlite", alias = "mysql")]
    Relational,
    /// Redis，依赖原生过期
    #[serde(alias = "kv")]
    Redis,
    /// 嵌入式 KV（redb）
    #[serde(alias = "bolt", alias = "redb")]
    Embedded,
}

impl BackendKind {
    /// 所有可选值，用于错误提示
    pub fn variants() -> String {
        BackendKind::iter()
            .map(|k| k.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// 解析后端名称（接受别名），未知名称返回 `DatabaseConfig`
    pub fn parse(raw: &str) -> Result<Self> {
        serde_json::from_value(serde_json::Value::String(raw.to_string())).map_err(|_| {
            ScantyError::database_config(format!(
                "Unknown kind of storage: {}. Supported: {}",
                raw,
                BackendKind::variants()
            ))
        })
    }
}

/// 读缓存类型
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, Display, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CacheKind {
    #[default]
    Memory,
    None,
}

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含：
/// - storage: 存储后端选择与各后端连接参数
/// - cache: 读缓存配置
/// - cleaner: 过期清理任务配置
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub cleaner: CleanerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > TOML 文件 > 默认值
    /// ENV 前缀：SHORTENER，分隔符：__
    /// 示例：SHORTENER__STORAGE__KIND=redis
    ///
    /// 未知的 `storage.kind` 直接报错，不会退回默认后端。
    pub fn load_from(path: &str) -> Result<Self> {
        use config::{Config, Environment, File};

        let settings = Config::builder()
            // 1. 从 TOML 文件加载（可选）
            .add_source(File::with_name(path).required(false))
            // 2. 从环境变量覆盖
            .add_source(
                Environment::with_prefix("SHORTENER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ScantyError::file_operation(format!("读取配置失败 {}: {}", path, e)))?;

        if let Ok(raw) = settings.get_string("storage.kind") {
            BackendKind::parse(&raw)?;
        }

        let config = settings
            .try_deserialize::<StaticConfig>()
            .map_err(|e| ScantyError::serialization(format!("配置解析失败 {}: {}", path, e)))?;

        if std::path::Path::new(path).exists() {
            eprintln!("[INFO] Configuration loaded from: {}", path);
        }
        Ok(config)
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }
}

/// 存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub kind: BackendKind,
    /// 保存前先按 URL 查找已有短链接（仅对支持 find 的后端生效）
    #[serde(default = "default_find_existing")]
    pub find_existing: bool,
    /// id 冲突时的最大尝试次数
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub embedded: EmbeddedConfig,
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    /// 连接 / 获取连接超时（秒）
    #[serde(default = "default_database_timeout")]
    pub timeout: u64,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

/// Redis 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    #[serde(default = "default_redis_url")]
    pub url: String,
    #[serde(default = "default_redis_key_prefix")]
    pub key_prefix: String,
}

/// 嵌入式存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddedConfig {
    #[serde(default = "default_embedded_path")]
    pub path: String,
    /// 主表名，过期索引表为 `<table>_ttl`
    #[serde(default = "default_embedded_table")]
    pub table: String,
}

/// 读缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(rename = "type")]
    #[serde(default)]
    pub cache_type: CacheKind,
    #[serde(default = "default_cache_capacity")]
    pub max_capacity: u64,
}

/// 过期清理任务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanerConfig {
    #[serde(default = "default_cleaner_enabled")]
    pub enabled: bool,
    #[serde(default = "default_cleaner_interval")]
    pub interval_secs: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions
// ============================================================

fn default_find_existing() -> bool {
    true
}

fn default_max_attempts() -> u32 {
    16
}

fn default_database_url() -> String {
    "sqlite://links.db?mode=rwc".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_database_timeout() -> u64 {
    8
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379/".to_string()
}

fn default_redis_key_prefix() -> String {
    "link:".to_string()
}

fn default_embedded_path() -> String {
    "links.redb".to_string()
}

fn default_embedded_table() -> String {
    "links".to_string()
}

fn default_cache_capacity() -> u64 {
    10000
}

fn default_cleaner_enabled() -> bool {
    true
}

fn default_cleaner_interval() -> u64 {
    3600
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::default(),
            find_existing: default_find_existing(),
            max_attempts: default_max_attempts(),
            database: DatabaseConfig::default(),
            redis: RedisConfig::default(),
            embedded: EmbeddedConfig::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            pool_size: default_database_pool_size(),
            timeout: default_database_timeout(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            key_prefix: default_redis_key_prefix(),
        }
    }
}

impl Default for EmbeddedConfig {
    fn default() -> Self {
        Self {
            path: default_embedded_path(),
            table: default_embedded_table(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_type: CacheKind::default(),
            max_capacity: default_cache_capacity(),
        }
    }
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            enabled: default_cleaner_enabled(),
            interval_secs: default_cleaner_interval(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StaticConfig::default();
        assert_eq!(config.storage.kind, BackendKind::Relational);
        assert!(config.storage.find_existing);
        assert_eq!(config.storage.max_attempts, 16);
        assert_eq!(config.storage.redis.key_prefix, "link:");
        assert_eq!(config.cache.cache_type, CacheKind::Memory);
        assert_eq!(config.cleaner.interval_secs, 3600);
    }

    #[test]
    fn test_backend_kind_aliases() {
        #[derive(Deserialize)]
        struct Wrapper {
            kind: BackendKind,
        }

        for (raw, expected) in [
            ("relational", BackendKind::Relational),
            ("psql", BackendKind::Relational),
            ("sqlite", BackendKind::Relational),
            ("redis", BackendKind::Redis),
            ("bolt", BackendKind::Embedded),
            ("redb", BackendKind::Embedded),
        ] {
            let parsed: Wrapper = toml::from_str(&format!("kind = \"{}\"", raw)).unwrap();
            assert_eq!(parsed.kind, expected, "alias {}", raw);
        }
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: StaticConfig = toml::from_str(
            r#"
            [storage]
            kind = "embedded"

            [storage.embedded]
            path = "/tmp/x.redb"
            "#,
        )
        .unwrap();

        assert_eq!(config.storage.kind, BackendKind::Embedded);
        assert_eq!(config.storage.embedded.path, "/tmp/x.redb");
        assert_eq!(config.storage.embedded.table, "links");
        assert_eq!(config.storage.database.pool_size, 10);
    }

    #[test]
    fn test_sample_config_round_trips() {
        let sample = StaticConfig::generate_sample_config();
        let parsed: StaticConfig = toml::from_str(&sample).unwrap();
        assert_eq!(parsed.storage.kind, BackendKind::default());
        assert_eq!(parsed.cache.max_capacity, 10000);
    }

    #[test]
    fn test_unknown_backend_kind_is_rejected() {
        let err = BackendKind::parse("mongo").unwrap_err();
        assert!(matches!(err, ScantyError::DatabaseConfig(_)));
        assert!(err.message().contains("relational, redis, embedded"));
        assert_eq!(BackendKind::parse("bolt").unwrap(), BackendKind::Embedded);
    }

    #[test]
    fn test_load_from_fails_on_unknown_backend_kind() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("scanty.toml");
        std::fs::write(&path, "[storage]\nkind = \"mongo\"\n").unwrap();

        let err = StaticConfig::load_from(&path.display().to_string()).unwrap_err();
        assert!(matches!(err, ScantyError::DatabaseConfig(_)));
        assert!(err.message().contains("mongo"));
    }

    #[test]
    fn test_load_from_reads_toml_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("scanty.toml");
        std::fs::write(&path, "[storage]\nkind = \"redb\"\nmax_attempts = 3\n").unwrap();

        let config = StaticConfig::load_from(&path.display().to_string()).unwrap();
        assert_eq!(config.storage.kind, BackendKind::Embedded);
        assert_eq!(config.storage.max_attempts, 3);
    }

    #[test]
    fn test_backend_kind_display() {
        assert_eq!(BackendKind::Embedded.to_string(), "embedded");
        assert_eq!(BackendKind::variants(), "relational, redis, embedded");
    }
}
