// ==========================================
// 测点数据批量导入工具 - 导入层
// ==========================================
// 职责: 外部 CSV 数据导入,生成 (ts, signal_id, value) 行
// 流程: load → clean → project → insert
// ==========================================

// 模块声明
pub mod data_cleaner;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod measurement_importer_impl;
pub mod measurement_importer_trait;

// 重导出核心类型
pub use data_cleaner::DataCleaner as DataCleanerImpl;
pub use error::{ErrorKind, ImportError, ImportResult};
pub use field_mapper::FieldMapper as FieldMapperImpl;
pub use file_parser::CsvParser;
pub use measurement_importer_impl::MeasurementImporterImpl;

// 重导出 Trait 接口
pub use measurement_importer_trait::{DataCleaner, FieldMapper, FileParser, MeasurementImporter};
