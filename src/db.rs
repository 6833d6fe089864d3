// ==========================================
// 测点数据批量导入工具 - 数据库连接初始化
// ==========================================
// 目标:
// - 统一 SQLite 连接的 PRAGMA 与 busy_timeout
// - 统一 PostgreSQL 连接参数的构造
// - 目标表名只能是标识符（表名无法参数化绑定）
// ==========================================

use crate::config::{ImportConfig, SslMode};
use crate::importer::error::{ImportError, ImportResult};
use rusqlite::{Connection, OpenFlags};
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use std::path::Path;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// PostgreSQL 单条语句绑定参数上限
pub const PG_MAX_BIND_PARAMS: usize = 65_535;

/// 配置 SQLite 连接的统一 PRAGMA
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开已存在的 SQLite 数据库并应用统一配置
///
/// 说明：不自动建库，文件不存在视为目标库不可达
pub fn open_sqlite_connection(db_path: &Path) -> ImportResult<Connection> {
    let conn = Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| ImportError::DatabaseConnectionError(format!("{}: {}", db_path.display(), e)))?;
    configure_sqlite_connection(&conn)
        .map_err(|e| ImportError::DatabaseConnectionError(e.to_string()))?;
    Ok(conn)
}

/// 构造 PostgreSQL 连接参数
pub fn pg_connect_options(config: &ImportConfig) -> PgConnectOptions {
    let ssl_mode = match config.ssl_mode {
        SslMode::Disable => PgSslMode::Disable,
        SslMode::Prefer => PgSslMode::Prefer,
        SslMode::Require => PgSslMode::Require,
    };

    PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .database(&config.database)
        .username(&config.user)
        .password(&config.credential)
        .ssl_mode(ssl_mode)
        .application_name("measurement-importer")
}

/// 校验目标表名: `name` 或 `schema.name`，每段为 [A-Za-z_][A-Za-z0-9_]*
pub fn validate_table_identifier(table: &str) -> ImportResult<()> {
    let is_ident = |part: &str| {
        let mut chars = part.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        }
    };

    let parts: Vec<&str> = table.split('.').collect();
    if parts.len() <= 2 && parts.iter().all(|p| is_ident(p)) {
        Ok(())
    } else {
        Err(ImportError::ConfigValueError {
            key: "target_table".to_string(),
            value: table.to_string(),
            message: "表名只能由字母、数字、下划线组成，可带一级 schema 前缀".to_string(),
        })
    }
}
