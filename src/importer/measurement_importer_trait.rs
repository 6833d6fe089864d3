// ==========================================
// 测点数据批量导入工具 - 导入 Trait
// ==========================================
// 职责: 定义导入各阶段接口（不包含实现）
// 流程: load → clean → project → insert
// ==========================================

use crate::config::NullPolicy;
use crate::domain::measurement::{
    ImportSummary, Measurement, PreparedBatch, RawRecord, RawTable,
};
use crate::importer::error::ImportResult;
use async_trait::async_trait;
use std::path::Path;

// ==========================================
// MeasurementImporter Trait
// ==========================================
// 用途: 导入主接口
// 实现者: MeasurementImporterImpl
#[async_trait]
pub trait MeasurementImporter: Send + Sync {
    /// 解析、清洗、映射，不访问目标库（用于 dry-run）
    ///
    /// # 返回
    /// - Ok(PreparedBatch): 待写入的测点及行数统计
    /// - Err: 解析错误（ErrorKind::Parse）
    async fn prepare(&self, file_path: &Path) -> ImportResult<PreparedBatch>;

    /// 从 CSV 文件导入测点数据
    ///
    /// # 导入流程
    /// 1. 文件读取与解析
    /// 2. 缺失值过滤
    /// 3. 列选择与重命名
    /// 4. 单事务批量写入
    ///
    /// # 返回
    /// - Ok(ImportSummary): 导入结果
    /// - Err: 解析错误在建立连接之前返回；连接/写入错误时无任何行提交
    async fn import_from_csv(&self, file_path: &Path) -> ImportResult<ImportSummary>;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（load）
// 实现者: CsvParser
pub trait FileParser: Send + Sync {
    /// 解析文件为内存表
    ///
    /// # 返回
    /// - Ok(RawTable): 表头 + 行记录
    /// - Err: 文件缺失、不可读或格式错误
    fn parse_to_raw_table(&self, file_path: &Path) -> ImportResult<RawTable>;
}

// ==========================================
// DataCleaner Trait
// ==========================================
// 用途: 缺失值过滤接口（clean）
// 实现者: DataCleaner
pub trait DataCleaner: Send + Sync {
    /// 判断字段是否缺失（不存在 / 空白 / NA 标记）
    fn is_missing(&self, value: Option<&str>) -> bool;

    /// 丢弃含缺失值的行，不报错
    ///
    /// # 参数
    /// - table: 源表
    /// - policy: 检查全部列还是仅检查必需列
    fn drop_incomplete_rows(&self, table: RawTable, policy: NullPolicy) -> RawTable;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 列选择与类型转换接口（project）
// 实现者: FieldMapper
pub trait FieldMapper: Send + Sync {
    /// 将一行源记录映射为 Measurement
    ///
    /// # 返回
    /// - Ok(Measurement): (ts, signal_id, value)
    /// - Err: 类型转换错误（带行号与字段名）
    fn map_to_measurement(&self, row: &RawRecord) -> ImportResult<Measurement>;
}
