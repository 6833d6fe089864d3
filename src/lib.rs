// ==========================================
// 测点数据批量导入工具 - 核心库
// ==========================================
// 技术栈: Rust + csv + sqlx(PostgreSQL) / rusqlite(SQLite)
// 定位: 单次运行的批量导入，无状态，无重试
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 源行与目标行
pub mod domain;

// 数据仓储层 - 目标库写入
pub mod repository;

// 导入层 - 解析/清洗/映射/写入
pub mod importer;

// 配置层 - 导入配置
pub mod config;

// 数据库基础设施（连接初始化/表名校验）
pub mod db;

// 日志系统
pub mod logging;

// 耗时统计
pub mod perf;

// ==========================================
// 重导出核心类型
// ==========================================

pub use config::{ImportConfig, NullPolicy, StoreBackend};
pub use domain::{ImportSummary, Measurement, SignalId};
pub use importer::{ErrorKind, ImportError, ImportResult, MeasurementImporter, MeasurementImporterImpl};
pub use repository::{
    repository_for, MeasurementRepository, PgMeasurementRepository, SqliteMeasurementRepository,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "测点数据批量导入工具";
