// ==========================================
// 测点数据批量导入工具 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分类: Parse / Connection / Write / Config
// ==========================================

use thiserror::Error;

/// 错误大类（决定错误属于哪个阶段）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 源文件缺失、不可读或格式错误
    Parse,
    /// 目标库不可达
    Connection,
    /// 写入被目标库拒绝
    Write,
    /// 配置非法
    Config,
    Internal,
}

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("缺少必需列: {0}")]
    MissingColumn(String),

    #[error("列名重复: {0}")]
    DuplicateColumn(String),

    // ===== 数据映射错误 =====
    #[error("类型转换失败 (行 {row}, 字段 {field}): {message}")]
    TypeConversionError {
        row: usize,
        field: String,
        message: String,
    },

    // ===== 数据库错误 =====
    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库写入失败: {0}")]
    DatabaseWriteError(String),

    // ===== 配置错误 =====
    #[error("配置读取失败 (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    ConfigValueError {
        key: String,
        value: String,
        message: String,
    },

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// 错误所属大类
    pub fn kind(&self) -> ErrorKind {
        match self {
            ImportError::FileNotFound(_)
            | ImportError::FileReadError(_)
            | ImportError::CsvParseError(_)
            | ImportError::MissingColumn(_)
            | ImportError::DuplicateColumn(_)
            | ImportError::TypeConversionError { .. } => ErrorKind::Parse,
            ImportError::DatabaseConnectionError(_) => ErrorKind::Connection,
            ImportError::DatabaseWriteError(_) => ErrorKind::Write,
            ImportError::ConfigReadError { .. } | ImportError::ConfigValueError { .. } => {
                ErrorKind::Config
            }
            ImportError::InternalError(_) | ImportError::Other(_) => ErrorKind::Internal,
        }
    }

    pub fn is_parse_error(&self) -> bool {
        self.kind() == ErrorKind::Parse
    }

    pub fn is_connection_error(&self) -> bool {
        self.kind() == ErrorKind::Connection
    }

    pub fn is_write_error(&self) -> bool {
        self.kind() == ErrorKind::Write
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<rusqlite::Error>
// 连接阶段的错误由调用处显式映射为 DatabaseConnectionError
impl From<rusqlite::Error> for ImportError {
    fn from(err: rusqlite::Error) -> Self {
        ImportError::DatabaseWriteError(err.to_string())
    }
}

// 实现 From<sqlx::Error>
impl From<sqlx::Error> for ImportError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Configuration(_) => ImportError::DatabaseConnectionError(err.to_string()),
            _ => ImportError::DatabaseWriteError(err.to_string()),
        }
    }
}

// 实现 From<serde_json::Error>
impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::ConfigReadError {
            key: "config_file".to_string(),
            message: err.to_string(),
        }
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_classification() {
        assert_eq!(
            ImportError::FileNotFound("a.csv".to_string()).kind(),
            ErrorKind::Parse
        );
        assert_eq!(
            ImportError::TypeConversionError {
                row: 3,
                field: "value".to_string(),
                message: "x".to_string(),
            }
            .kind(),
            ErrorKind::Parse
        );
        assert!(ImportError::DatabaseConnectionError("refused".to_string()).is_connection_error());
        assert!(ImportError::DatabaseWriteError("constraint".to_string()).is_write_error());
        assert_eq!(
            ImportError::ConfigValueError {
                key: "port".to_string(),
                value: "0".to_string(),
                message: "端口必须大于 0".to_string(),
            }
            .kind(),
            ErrorKind::Config
        );
    }

    #[test]
    fn test_from_io_error_is_parse() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ImportError = io.into();
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_from_sqlx_io_error_is_connection() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err: ImportError = sqlx::Error::Io(io).into();
        assert!(err.is_connection_error());
    }

    #[test]
    fn test_from_sqlx_row_not_found_is_write() {
        let err: ImportError = sqlx::Error::RowNotFound.into();
        assert!(err.is_write_error());
    }
}
