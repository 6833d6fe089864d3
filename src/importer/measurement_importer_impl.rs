// ==========================================
// 测点数据批量导入工具 - 测点导入器实现
// ==========================================
// 职责: 整合导入流程，从文件到数据库
// 流程: 解析 → 缺失值过滤 → 列选择/重命名 → 单事务批量写入
// 约束: 解析/清洗/映射失败时不建立任何连接
// ==========================================

use crate::config::{ImportConfig, NullPolicy};
use crate::domain::measurement::{
    ImportSummary, Measurement, PreparedBatch, RawTable,
};
use crate::importer::data_cleaner::DataCleaner as DataCleanerImpl;
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::FieldMapper as FieldMapperImpl;
use crate::importer::file_parser::CsvParser;
use crate::importer::measurement_importer_trait::{
    DataCleaner, FieldMapper, FileParser, MeasurementImporter,
};
use crate::perf::PerfGuard;
use crate::repository::MeasurementRepository;
use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// MeasurementImporterImpl - 测点导入器实现
// ==========================================
pub struct MeasurementImporterImpl<R>
where
    R: MeasurementRepository,
{
    // 数据访问层
    repo: R,

    // 目标表与清洗策略
    target_table: String,
    null_policy: NullPolicy,

    // 导入组件
    file_parser: Box<dyn FileParser>,
    data_cleaner: Box<dyn DataCleaner>,
    field_mapper: Box<dyn FieldMapper>,
}

impl<R> MeasurementImporterImpl<R>
where
    R: MeasurementRepository,
{
    /// 创建新的 MeasurementImporter 实例
    ///
    /// # 参数
    /// - repo: 目标库仓储
    /// - target_table: 目标表名
    /// - null_policy: 缺失值检查范围
    /// - file_parser / data_cleaner / field_mapper: 各阶段组件
    pub fn new(
        repo: R,
        target_table: impl Into<String>,
        null_policy: NullPolicy,
        file_parser: Box<dyn FileParser>,
        data_cleaner: Box<dyn DataCleaner>,
        field_mapper: Box<dyn FieldMapper>,
    ) -> Self {
        Self {
            repo,
            target_table: target_table.into(),
            null_policy,
            file_parser,
            data_cleaner,
            field_mapper,
        }
    }

    /// 使用默认组件（CSV 解析 / NA 清洗 / 标准映射）
    pub fn from_config(repo: R, config: &ImportConfig) -> Self {
        Self::new(
            repo,
            config.target_table.clone(),
            config.null_policy,
            Box::new(CsvParser),
            Box::new(DataCleanerImpl),
            Box::new(FieldMapperImpl),
        )
    }

    pub fn target_table(&self) -> &str {
        &self.target_table
    }

    /// load: 读取整表
    pub fn load(&self, file_path: &Path) -> ImportResult<RawTable> {
        self.file_parser.parse_to_raw_table(file_path)
    }

    /// clean: 丢弃含缺失值的行
    pub fn clean(&self, table: RawTable) -> RawTable {
        self.data_cleaner.drop_incomplete_rows(table, self.null_policy)
    }

    /// project: 固定顺序选出 (ts, signal_id, value)
    pub fn project(&self, table: &RawTable) -> ImportResult<Vec<Measurement>> {
        table
            .rows
            .iter()
            .map(|row| self.field_mapper.map_to_measurement(row))
            .collect()
    }

    /// insert: 单事务批量写入
    pub async fn insert(&self, measurements: &[Measurement]) -> ImportResult<usize> {
        self.repo
            .batch_insert_measurements(&self.target_table, measurements)
            .await
    }
}

#[async_trait]
impl<R> MeasurementImporter for MeasurementImporterImpl<R>
where
    R: MeasurementRepository + Send + Sync,
{
    async fn prepare(&self, file_path: &Path) -> ImportResult<PreparedBatch> {
        // === 步骤 1: 解析文件 ===
        debug!("步骤 1: 解析文件");
        let table = self.load(file_path).map_err(|e| {
            error!(error = %e, "文件解析失败");
            e
        })?;
        let (total_rows, total_columns) = table.shape();
        info!(rows = total_rows, columns = total_columns, "文件解析完成");

        // === 步骤 2: 缺失值过滤 ===
        debug!("步骤 2: 缺失值过滤");
        let cleaned = self.clean(table);
        let dropped_rows = total_rows - cleaned.len();
        if dropped_rows > 0 {
            warn!(
                dropped = dropped_rows,
                kept = cleaned.len(),
                policy = ?self.null_policy,
                "已丢弃含缺失值的行"
            );
        }

        // === 步骤 3: 列选择与重命名 ===
        debug!("步骤 3: 列选择与重命名");
        let measurements = self.project(&cleaned).map_err(|e| {
            error!(error = %e, "字段映射失败");
            e
        })?;
        info!(count = measurements.len(), "字段映射完成");

        Ok(PreparedBatch {
            total_rows,
            dropped_rows,
            measurements,
        })
    }

    #[instrument(skip(self, file_path), fields(batch_id))]
    async fn import_from_csv(&self, file_path: &Path) -> ImportResult<ImportSummary> {
        let perf = PerfGuard::new("import_from_csv");
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());

        info!(
            file_path = %file_path.display(),
            target_table = %self.target_table,
            backend = self.repo.backend_name(),
            "开始导入测点数据"
        );

        let prepared = self.prepare(file_path).await?;

        // === 步骤 4: 批量写入 ===
        debug!("步骤 4: 批量写入");
        let inserted_rows = self.insert(&prepared.measurements).await.map_err(|e| {
            error!(error = %e, kind = ?e.kind(), "批量写入失败，未提交任何行");
            e
        })?;

        let summary = ImportSummary {
            batch_id,
            source_path: file_path.to_path_buf(),
            target_table: self.target_table.clone(),
            total_rows: prepared.total_rows,
            dropped_rows: prepared.dropped_rows,
            inserted_rows,
            elapsed: perf.elapsed(),
        };

        info!(
            batch_id = %summary.batch_id,
            total = summary.total_rows,
            dropped = summary.dropped_rows,
            inserted = summary.inserted_rows,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "测点数据导入完成"
        );

        Ok(summary)
    }
}
