// ==========================================
// 测点数据批量导入工具 - 导入配置
// ==========================================
// 职责: 显式配置结构体（替代模块级连接常量）
// 选项: host / port / database / user / credential / source_path / target_table
// ==========================================

use crate::db::validate_table_identifier;
use crate::importer::error::{ImportError, ImportResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

// ==========================================
// StoreBackend - 目标库类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Postgres,
    /// database 字段为数据库文件路径
    Sqlite,
}

impl FromStr for StoreBackend {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(StoreBackend::Postgres),
            "sqlite" => Ok(StoreBackend::Sqlite),
            other => Err(ImportError::ConfigValueError {
                key: "backend".to_string(),
                value: other.to_string(),
                message: "仅支持 postgres / sqlite".to_string(),
            }),
        }
    }
}

// ==========================================
// SslMode - PostgreSQL 连接加密方式
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SslMode {
    Disable,
    #[default]
    Prefer,
    Require,
}

impl FromStr for SslMode {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "disable" => Ok(SslMode::Disable),
            "prefer" => Ok(SslMode::Prefer),
            "require" => Ok(SslMode::Require),
            other => Err(ImportError::ConfigValueError {
                key: "ssl_mode".to_string(),
                value: other.to_string(),
                message: "仅支持 disable / prefer / require".to_string(),
            }),
        }
    }
}

// ==========================================
// NullPolicy - 缺失值检查范围
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum NullPolicy {
    /// 任意列缺失即丢弃整行
    #[default]
    AnyColumn,
    /// 仅检查 timestamp / signal_id / value
    RequiredColumns,
}

impl FromStr for NullPolicy {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "any-column" => Ok(NullPolicy::AnyColumn),
            "required-columns" => Ok(NullPolicy::RequiredColumns),
            other => Err(ImportError::ConfigValueError {
                key: "null_policy".to_string(),
                value: other.to_string(),
                message: "仅支持 any-column / required-columns".to_string(),
            }),
        }
    }
}

// ==========================================
// ImportConfig - 导入配置
// ==========================================
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub backend: StoreBackend,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    #[serde(skip_serializing)]
    pub credential: String,
    pub source_path: PathBuf,
    pub target_table: String,
    pub ssl_mode: SslMode,
    pub connect_timeout_secs: u64,
    pub batch_size: usize,
    pub null_policy: NullPolicy,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Postgres,
            host: "localhost".to_string(),
            port: 5432,
            database: "postgres".to_string(),
            user: "postgres".to_string(),
            credential: String::new(),
            source_path: PathBuf::from("data/raw_data.csv"),
            target_table: "measurements".to_string(),
            ssl_mode: SslMode::Prefer,
            connect_timeout_secs: 10,
            batch_size: 1000,
            null_policy: NullPolicy::AnyColumn,
        }
    }
}

// 口令不进入日志
impl fmt::Debug for ImportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportConfig")
            .field("backend", &self.backend)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("credential", &"***")
            .field("source_path", &self.source_path)
            .field("target_table", &self.target_table)
            .field("ssl_mode", &self.ssl_mode)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("batch_size", &self.batch_size)
            .field("null_policy", &self.null_policy)
            .finish()
    }
}

impl ImportConfig {
    /// 校验配置（在任何 I/O 之前调用）
    pub fn validate(&self) -> ImportResult<()> {
        validate_table_identifier(&self.target_table)?;

        if self.database.trim().is_empty() {
            return Err(ImportError::ConfigValueError {
                key: "database".to_string(),
                value: self.database.clone(),
                message: "不能为空".to_string(),
            });
        }

        if self.batch_size == 0 {
            return Err(ImportError::ConfigValueError {
                key: "batch_size".to_string(),
                value: "0".to_string(),
                message: "必须大于 0".to_string(),
            });
        }

        if self.backend == StoreBackend::Postgres {
            if self.port == 0 {
                return Err(ImportError::ConfigValueError {
                    key: "port".to_string(),
                    value: "0".to_string(),
                    message: "必须大于 0".to_string(),
                });
            }
            if self.host.trim().is_empty() {
                return Err(ImportError::ConfigValueError {
                    key: "host".to_string(),
                    value: self.host.clone(),
                    message: "不能为空".to_string(),
                });
            }
        }

        Ok(())
    }
}
