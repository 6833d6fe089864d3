// ==========================================
// 测点数据批量导入工具 - 领域模型层
// ==========================================
// 职责: 定义源行、目标行与导入结果
// 红线: 不含数据访问逻辑
// ==========================================

pub mod measurement;

// 重导出核心类型
pub use measurement::{
    ImportSummary, Measurement, PreparedBatch, RawRecord, RawTable, SignalId,
};
