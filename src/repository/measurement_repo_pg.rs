// ==========================================
// 测点数据批量导入工具 - PostgreSQL Repository 实现
// ==========================================
// 职责: 基于 sqlx 的单事务批量写入
// 写法: 多行 INSERT ... VALUES，按 batch_size 分段，全部在同一事务内
// ==========================================

use crate::config::ImportConfig;
use crate::db::{pg_connect_options, validate_table_identifier, PG_MAX_BIND_PARAMS};
use crate::domain::measurement::{Measurement, SignalId};
use crate::importer::error::{ImportError, ImportResult};
use crate::repository::measurement_repo::MeasurementRepository;
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{Connection, Postgres, QueryBuilder};
use std::time::Duration;
use tracing::{debug, warn};

/// 每行绑定参数个数 (ts, signal_id, value)
const BINDS_PER_ROW: usize = 3;

// ==========================================
// PgMeasurementRepository
// ==========================================
pub struct PgMeasurementRepository {
    options: PgConnectOptions,
    connect_timeout: Duration,
    batch_size: usize,
}

impl PgMeasurementRepository {
    /// 从导入配置创建（不立即建立连接）
    pub fn new(config: &ImportConfig) -> Self {
        Self::from_options(
            pg_connect_options(config),
            Duration::from_secs(config.connect_timeout_secs),
            config.batch_size,
        )
    }

    pub fn from_options(
        options: PgConnectOptions,
        connect_timeout: Duration,
        batch_size: usize,
    ) -> Self {
        Self {
            options,
            connect_timeout,
            batch_size,
        }
    }

    /// 单条语句的最大行数（受绑定参数上限约束）
    pub fn rows_per_statement(&self) -> usize {
        self.batch_size.clamp(1, PG_MAX_BIND_PARAMS / BINDS_PER_ROW)
    }

    /// 构造多行 INSERT 语句
    pub fn build_insert<'a>(table: &str, chunk: &'a [Measurement]) -> QueryBuilder<'a, Postgres> {
        let mut builder =
            QueryBuilder::new(format!("INSERT INTO {} (ts, signal_id, value) ", table));
        builder.push_values(chunk, |mut row, m| {
            row.push_bind(m.ts);
            match &m.signal_id {
                SignalId::Int(v) => row.push_bind(*v),
                SignalId::Text(s) => row.push_bind(s.as_str()),
            };
            row.push_bind(m.value);
        });
        builder
    }

    /// 建立连接（带超时）
    async fn connect(&self) -> ImportResult<PgConnection> {
        match tokio::time::timeout(self.connect_timeout, PgConnection::connect_with(&self.options))
            .await
        {
            Ok(Ok(conn)) => Ok(conn),
            Ok(Err(e)) => Err(ImportError::DatabaseConnectionError(format!(
                "{}:{}: {}",
                self.options.get_host(),
                self.options.get_port(),
                e
            ))),
            Err(_) => Err(ImportError::DatabaseConnectionError(format!(
                "{}:{}: 连接超时 ({:?})",
                self.options.get_host(),
                self.options.get_port(),
                self.connect_timeout
            ))),
        }
    }

    async fn insert_in_tx(
        &self,
        conn: &mut PgConnection,
        table: &str,
        measurements: &[Measurement],
    ) -> ImportResult<usize> {
        let write_err = |e: sqlx::Error| ImportError::DatabaseWriteError(e.to_string());

        let mut tx = conn.begin().await.map_err(write_err)?;
        let mut count = 0usize;

        for chunk in measurements.chunks(self.rows_per_statement()) {
            let mut builder = Self::build_insert(table, chunk);
            let result = builder.build().execute(&mut *tx).await.map_err(write_err)?;
            count += result.rows_affected() as usize;
            debug!(rows = chunk.len(), "批量语句已执行");
        }

        // 出错时 tx 被丢弃即回滚
        tx.commit().await.map_err(write_err)?;
        Ok(count)
    }

    /// 关闭连接；关闭失败只记录告警，不覆盖主流程结果
    async fn close(conn: PgConnection) {
        if let Err(e) = conn.close().await {
            warn!(error = %e, "PostgreSQL 连接关闭失败");
        }
    }
}

#[async_trait]
impl MeasurementRepository for PgMeasurementRepository {
    async fn batch_insert_measurements(
        &self,
        table: &str,
        measurements: &[Measurement],
    ) -> ImportResult<usize> {
        validate_table_identifier(table)?;

        let mut conn = self.connect().await?;
        debug!(
            host = %self.options.get_host(),
            port = self.options.get_port(),
            "PostgreSQL 连接已建立"
        );

        let result = self.insert_in_tx(&mut conn, table, measurements).await;
        Self::close(conn).await;
        result
    }

    async fn count_measurements(&self, table: &str) -> ImportResult<i64> {
        validate_table_identifier(table)?;

        let mut conn = self.connect().await?;
        let result = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&mut conn)
            .await
            .map_err(Into::into);
        Self::close(conn).await;
        result
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
