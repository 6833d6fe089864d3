// ==========================================
// 测点数据批量导入工具 - 测点 Repository Trait
// ==========================================
// 职责: 定义目标库写入接口（不包含业务逻辑）
// 红线: 连接在写入前建立、在所有退出路径上关闭
// ==========================================

use crate::domain::measurement::Measurement;
use crate::importer::error::ImportResult;
use async_trait::async_trait;

// ==========================================
// MeasurementRepository Trait
// ==========================================
// 实现者: PgMeasurementRepository（sqlx）/ SqliteMeasurementRepository（rusqlite）
#[async_trait]
pub trait MeasurementRepository: Send + Sync {
    /// 单事务批量插入测点（纯 INSERT，不去重）
    ///
    /// # 参数
    /// - table: 目标表名（已校验的标识符）
    /// - measurements: 待写入行，可为空
    ///
    /// # 返回
    /// - Ok(usize): 已提交的行数
    /// - Err(DatabaseConnectionError): 目标库不可达
    /// - Err(DatabaseWriteError): 写入被拒绝（整个事务回滚）
    async fn batch_insert_measurements(
        &self,
        table: &str,
        measurements: &[Measurement],
    ) -> ImportResult<usize>;

    /// 统计目标表行数（运维/校验辅助）
    ///
    /// 导入流程不调用此方法；每次调用独立建立并关闭一次连接
    async fn count_measurements(&self, table: &str) -> ImportResult<i64>;

    /// 后端名称（用于日志）
    fn backend_name(&self) -> &'static str;
}

#[async_trait]
impl<T> MeasurementRepository for Box<T>
where
    T: MeasurementRepository + ?Sized,
{
    async fn batch_insert_measurements(
        &self,
        table: &str,
        measurements: &[Measurement],
    ) -> ImportResult<usize> {
        (**self).batch_insert_measurements(table, measurements).await
    }

    async fn count_measurements(&self, table: &str) -> ImportResult<i64> {
        (**self).count_measurements(table).await
    }

    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }
}
