use std::fmt;

#[derive(Debug, Clone)]
pub enum ScantyError {
    ItemDuplicated(String),
    NoLink(String),
    InvalidCode(String),
    AllocationExhausted(String),
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    Serialization(String),
    DateParse(String),
    FileOperation(String),
    TaskJoin(String),
}

impl ScantyError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            ScantyError::ItemDuplicated(_) => "E001",
            ScantyError::NoLink(_) => "E002",
            ScantyError::InvalidCode(_) => "E003",
            ScantyError::AllocationExhausted(_) => "E004",
            ScantyError::DatabaseConfig(_) => "E005",
            ScantyError::DatabaseConnection(_) => "E006",
            ScantyError::DatabaseOperation(_) => "E007",
            ScantyError::Serialization(_) => "E008",
            ScantyError::DateParse(_) => "E009",
            ScantyError::FileOperation(_) => "E010",
            ScantyError::TaskJoin(_) => "E011",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            ScantyError::ItemDuplicated(_) => "Item Duplicated",
            ScantyError::NoLink(_) => "Link Not Found",
            ScantyError::InvalidCode(_) => "Invalid Short Code",
            ScantyError::AllocationExhausted(_) => "ID Allocation Exhausted",
            ScantyError::DatabaseConfig(_) => "Database Configuration Error",
            ScantyError::DatabaseConnection(_) => "Database Connection Error",
            ScantyError::DatabaseOperation(_) => "Database Operation Error",
            ScantyError::Serialization(_) => "Serialization Error",
            ScantyError::DateParse(_) => "Date Parse Error",
            ScantyError::FileOperation(_) => "File Operation Error",
            ScantyError::TaskJoin(_) => "Background Task Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            ScantyError::ItemDuplicated(msg)
            | ScantyError::NoLink(msg)
            | ScantyError::InvalidCode(msg)
            | ScantyError::AllocationExhausted(msg)
            | ScantyError::DatabaseConfig(msg)
            | ScantyError::DatabaseConnection(msg)
            | ScantyError::DatabaseOperation(msg)
            | ScantyError::Serialization(msg)
            | ScantyError::DateParse(msg)
            | ScantyError::FileOperation(msg)
            | ScantyError::TaskJoin(msg) => msg,
        }
    }

    /// id 冲突，由保存流程内部重试消化
    pub fn is_duplicate(&self) -> bool {
        matches!(self, ScantyError::ItemDuplicated(_))
    }

    /// 链接不存在或已过期
    pub fn is_not_found(&self) -> bool {
        matches!(self, ScantyError::NoLink(_))
    }

    /// 格式化为彩色输出（用于 CLI 错误提示）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for ScantyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for ScantyError {}

// 便捷的构造函数
impl ScantyError {
    pub fn item_duplicated<T: Into<String>>(msg: T) -> Self {
        ScantyError::ItemDuplicated(msg.into())
    }

    pub fn no_link<T: Into<String>>(msg: T) -> Self {
        ScantyError::NoLink(msg.into())
    }

    pub fn invalid_code<T: Into<String>>(msg: T) -> Self {
        ScantyError::InvalidCode(msg.into())
    }

    pub fn allocation_exhausted<T: Into<String>>(msg: T) -> Self {
        ScantyError::AllocationExhausted(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        ScantyError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        ScantyError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        ScantyError::DatabaseOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        ScantyError::Serialization(msg.into())
    }

    pub fn date_parse<T: Into<String>>(msg: T) -> Self {
        ScantyError::DateParse(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        ScantyError::FileOperation(msg.into())
    }

    pub fn task_join<T: Into<String>>(msg: T) -> Self {
        ScantyError::TaskJoin(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for ScantyError {
    fn from(err: sea_orm::DbErr) -> Self {
        ScantyError::DatabaseOperation(err.to_string())
    }
}

impl From<redis::RedisError> for ScantyError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_connection_refusal() || err.is_connection_dropped() || err.is_io_error() {
            ScantyError::DatabaseConnection(err.to_string())
        } else {
            ScantyError::DatabaseOperation(err.to_string())
        }
    }
}

impl From<redb::Error> for ScantyError {
    fn from(err: redb::Error) -> Self {
        ScantyError::DatabaseOperation(err.to_string())
    }
}

impl From<redb::DatabaseError> for ScantyError {
    fn from(err: redb::DatabaseError) -> Self {
        ScantyError::DatabaseConnection(err.to_string())
    }
}

impl From<redb::TransactionError> for ScantyError {
    fn from(err: redb::TransactionError) -> Self {
        ScantyError::DatabaseOperation(err.to_string())
    }
}

impl From<redb::TableError> for ScantyError {
    fn from(err: redb::TableError) -> Self {
        ScantyError::DatabaseOperation(err.to_string())
    }
}

impl From<redb::StorageError> for ScantyError {
    fn from(err: redb::StorageError) -> Self {
        ScantyError::DatabaseOperation(err.to_string())
    }
}

impl From<redb::CommitError> for ScantyError {
    fn from(err: redb::CommitError) -> Self {
        ScantyError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for ScantyError {
    fn from(err: std::io::Error) -> Self {
        ScantyError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for ScantyError {
    fn from(err: serde_json::Error) -> Self {
        ScantyError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for ScantyError {
    fn from(err: chrono::ParseError) -> Self {
        ScantyError::DateParse(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ScantyError {
    fn from(err: tokio::task::JoinError) -> Self {
        ScantyError::TaskJoin(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ScantyError>;
