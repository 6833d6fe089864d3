// ==========================================
// 测点数据批量导入工具 - SQLite Repository 实现
// ==========================================
// 职责: 基于 rusqlite 的单事务批量写入
// 说明: 数据库文件必须已存在，表结构由外部维护
// ==========================================

use crate::db::{open_sqlite_connection, validate_table_identifier};
use crate::domain::measurement::{Measurement, SignalId};
use crate::importer::error::ImportResult;
use crate::repository::measurement_repo::MeasurementRepository;
use async_trait::async_trait;
use rusqlite::types::ToSqlOutput;
use rusqlite::{params, Connection, ToSql, Transaction};
use std::path::PathBuf;
use tracing::{debug, warn};

impl ToSql for SignalId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SignalId::Int(v) => ToSqlOutput::from(*v),
            SignalId::Text(s) => ToSqlOutput::from(s.as_str()),
        })
    }
}

// ==========================================
// SqliteMeasurementRepository
// ==========================================
pub struct SqliteMeasurementRepository {
    db_path: PathBuf,
}

impl SqliteMeasurementRepository {
    /// 创建新的 Repository 实例（不立即建立连接）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    /// 在事务中批量插入 Measurement
    fn batch_insert_measurements_tx(
        tx: &Transaction,
        table: &str,
        measurements: &[Measurement],
    ) -> rusqlite::Result<usize> {
        let sql = format!(
            "INSERT INTO {} (ts, signal_id, value) VALUES (?1, ?2, ?3)",
            table
        );
        let mut stmt = tx.prepare(&sql)?;

        let mut count = 0;
        for m in measurements {
            stmt.execute(params![m.ts, m.signal_id, m.value])?;
            count += 1;
        }

        Ok(count)
    }

    fn insert_in_tx(
        conn: &mut Connection,
        table: &str,
        measurements: &[Measurement],
    ) -> ImportResult<usize> {
        let tx = conn.transaction()?;
        let count = Self::batch_insert_measurements_tx(&tx, table, measurements)?;
        tx.commit()?;
        Ok(count)
    }

    /// 关闭连接；关闭失败只记录告警，不覆盖主流程结果
    fn close(conn: Connection) {
        if let Err((_conn, e)) = conn.close() {
            warn!(error = %e, "SQLite 连接关闭失败");
        }
    }
}

#[async_trait]
impl MeasurementRepository for SqliteMeasurementRepository {
    async fn batch_insert_measurements(
        &self,
        table: &str,
        measurements: &[Measurement],
    ) -> ImportResult<usize> {
        validate_table_identifier(table)?;

        let mut conn = open_sqlite_connection(&self.db_path)?;
        debug!(db_path = %self.db_path.display(), "SQLite 连接已建立");

        // 事务在 insert_in_tx 内提交或回滚，随后无论成败都关闭连接
        let result = Self::insert_in_tx(&mut conn, table, measurements);
        Self::close(conn);
        result
    }

    async fn count_measurements(&self, table: &str) -> ImportResult<i64> {
        validate_table_identifier(table)?;

        let conn = open_sqlite_connection(&self.db_path)?;
        let result = conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
            .map_err(Into::into);
        Self::close(conn);
        result
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::NamedTempFile;

    fn setup_db(ddl: &str) -> NamedTempFile {
        let temp_file = NamedTempFile::new().unwrap();
        let conn = Connection::open(temp_file.path()).unwrap();
        conn.execute_batch(ddl).unwrap();
        temp_file
    }

    const DDL: &str = "CREATE TABLE measurements (ts TEXT NOT NULL, signal_id INTEGER NOT NULL, value REAL NOT NULL);";

    fn sample(n: i64) -> Measurement {
        Measurement {
            ts: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, n as u32).unwrap(),
            signal_id: SignalId::Int(n),
            value: n as f64 * 10.0,
        }
    }

    #[tokio::test]
    async fn test_batch_insert_and_count() {
        let db = setup_db(DDL);
        let repo = SqliteMeasurementRepository::new(db.path());

        let inserted = repo
            .batch_insert_measurements("measurements", &[sample(1), sample(2)])
            .await
            .unwrap();

        assert_eq!(inserted, 2);
        assert_eq!(repo.count_measurements("measurements").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_batch_insert_empty_is_noop() {
        let db = setup_db(DDL);
        let repo = SqliteMeasurementRepository::new(db.path());

        assert_eq!(repo.batch_insert_measurements("measurements", &[]).await.unwrap(), 0);
        assert_eq!(repo.count_measurements("measurements").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_rejected_row_rolls_back_whole_batch() {
        let db = setup_db(
            "CREATE TABLE measurements (ts TEXT NOT NULL, signal_id INTEGER NOT NULL, value REAL NOT NULL CHECK (value < 25.0));",
        );
        let repo = SqliteMeasurementRepository::new(db.path());

        // 第 3 行 value=30.0 违反 CHECK
        let err = repo
            .batch_insert_measurements("measurements", &[sample(1), sample(2), sample(3)])
            .await
            .unwrap_err();

        assert!(err.is_write_error());
        assert_eq!(repo.count_measurements("measurements").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_table_is_write_error() {
        let db = setup_db("CREATE TABLE other (x INTEGER);");
        let repo = SqliteMeasurementRepository::new(db.path());

        let err = repo
            .batch_insert_measurements("measurements", &[sample(1)])
            .await
            .unwrap_err();
        assert!(err.is_write_error());
    }

    #[tokio::test]
    async fn test_missing_database_is_connection_error() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SqliteMeasurementRepository::new(dir.path().join("nope.db"));

        let err = repo
            .batch_insert_measurements("measurements", &[sample(1)])
            .await
            .unwrap_err();
        assert!(err.is_connection_error());
    }

    #[tokio::test]
    async fn test_text_signal_id_is_stored_as_text() {
        let db = setup_db("CREATE TABLE measurements (ts TEXT, signal_id TEXT, value REAL);");
        let repo = SqliteMeasurementRepository::new(db.path());

        let m = Measurement {
            signal_id: SignalId::Text("pump-7".to_string()),
            ..sample(1)
        };
        repo.batch_insert_measurements("measurements", &[m]).await.unwrap();

        let conn = Connection::open(db.path()).unwrap();
        let stored: String = conn
            .query_row("SELECT signal_id FROM measurements", [], |row| row.get(0))
            .unwrap();
        assert_eq!(stored, "pump-7");
    }
}
