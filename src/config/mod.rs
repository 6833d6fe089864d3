// ==========================================
// 测点数据批量导入工具 - 配置层
// ==========================================
// 职责: 导入配置定义与多级覆写加载
// 来源: 默认值 / JSON 文件 / 环境变量 / 命令行
// ==========================================

pub mod config_loader;
pub mod import_config;

// 重导出核心配置类型
pub use config_loader::{default_config_path, ConfigLoader, ConfigOverrides, ENV_PREFIX};
pub use import_config::{ImportConfig, NullPolicy, SslMode, StoreBackend};
