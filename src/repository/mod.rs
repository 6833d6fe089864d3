// ==========================================
// 测点数据批量导入工具 - 数据仓储层
// ==========================================
// 职责: 提供目标库写入接口,屏蔽数据库细节
// 约束: 数据全部参数化绑定,表名经标识符校验
// ==========================================

pub mod measurement_repo;
pub mod measurement_repo_pg;
pub mod measurement_repo_sqlite;

// 重导出核心仓储
pub use measurement_repo::MeasurementRepository;
pub use measurement_repo_pg::PgMeasurementRepository;
pub use measurement_repo_sqlite::SqliteMeasurementRepository;

use crate::config::{ImportConfig, StoreBackend};

/// 按配置选择目标库实现
pub fn repository_for(config: &ImportConfig) -> Box<dyn MeasurementRepository> {
    match config.backend {
        StoreBackend::Postgres => Box::new(PgMeasurementRepository::new(config)),
        StoreBackend::Sqlite => Box::new(SqliteMeasurementRepository::new(&config.database)),
    }
}
