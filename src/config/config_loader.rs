// ==========================================
// 测点数据批量导入工具 - 配置加载器
// ==========================================
// 优先级(低 → 高): 内置默认值 → JSON 配置文件 → 环境变量 → 命令行参数
// ==========================================

use crate::config::import_config::{ImportConfig, NullPolicy, SslMode, StoreBackend};
use crate::importer::error::{ImportError, ImportResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// 环境变量前缀
pub const ENV_PREFIX: &str = "MEASUREMENT_IMPORT_";

/// 默认配置文件位置: <config_dir>/measurement-importer/config.json
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("measurement-importer").join("config.json"))
}

// ==========================================
// ConfigOverrides - 命令行覆写项
// ==========================================
// 口令不提供命令行入口
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub backend: Option<StoreBackend>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub user: Option<String>,
    pub source_path: Option<PathBuf>,
    pub target_table: Option<String>,
    pub batch_size: Option<usize>,
    pub null_policy: Option<NullPolicy>,
}

// ==========================================
// ConfigLoader
// ==========================================
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config: ImportConfig,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取 JSON 配置文件（未出现的字段取默认值）
    pub fn with_file(mut self, path: &Path) -> ImportResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ImportError::ConfigReadError {
            key: path.display().to_string(),
            message: e.to_string(),
        })?;
        self.config = serde_json::from_str(&content)?;
        info!(path = %path.display(), "已加载配置文件");
        Ok(self)
    }

    /// 若默认位置存在配置文件则加载
    pub fn with_default_file(self) -> ImportResult<Self> {
        match default_config_path() {
            Some(path) if path.is_file() => self.with_file(&path),
            _ => {
                debug!("未发现默认配置文件，使用内置默认值");
                Ok(self)
            }
        }
    }

    /// 应用环境变量
    ///
    /// # 识别的变量
    /// - MEASUREMENT_IMPORT_{BACKEND,HOST,PORT,DATABASE,USER,PASSWORD,SOURCE,TABLE,
    ///   SSL_MODE,CONNECT_TIMEOUT,BATCH_SIZE,NULL_POLICY}
    /// - PGPASSWORD（未设置 MEASUREMENT_IMPORT_PASSWORD 时作为口令）
    pub fn with_env<I>(mut self, vars: I) -> ImportResult<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: HashMap<String, String> = vars.into_iter().collect();
        let get = |name: &str| vars.get(&format!("{}{}", ENV_PREFIX, name)).cloned();
        let c = &mut self.config;

        if let Some(v) = get("BACKEND") {
            c.backend = StoreBackend::from_str(&v)?;
        }
        if let Some(v) = get("HOST") {
            c.host = v;
        }
        if let Some(v) = get("PORT") {
            c.port = parse_number("PORT", &v)?;
        }
        if let Some(v) = get("DATABASE") {
            c.database = v;
        }
        if let Some(v) = get("USER") {
            c.user = v;
        }
        if let Some(v) = get("PASSWORD").or_else(|| vars.get("PGPASSWORD").cloned()) {
            c.credential = v;
        }
        if let Some(v) = get("SOURCE") {
            c.source_path = PathBuf::from(v);
        }
        if let Some(v) = get("TABLE") {
            c.target_table = v;
        }
        if let Some(v) = get("SSL_MODE") {
            c.ssl_mode = SslMode::from_str(&v)?;
        }
        if let Some(v) = get("CONNECT_TIMEOUT") {
            c.connect_timeout_secs = parse_number("CONNECT_TIMEOUT", &v)?;
        }
        if let Some(v) = get("BATCH_SIZE") {
            c.batch_size = parse_number("BATCH_SIZE", &v)?;
        }
        if let Some(v) = get("NULL_POLICY") {
            c.null_policy = NullPolicy::from_str(&v)?;
        }

        Ok(self)
    }

    /// 应用命令行覆写
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        let c = &mut self.config;
        if let Some(v) = overrides.backend {
            c.backend = v;
        }
        if let Some(v) = overrides.host {
            c.host = v;
        }
        if let Some(v) = overrides.port {
            c.port = v;
        }
        if let Some(v) = overrides.database {
            c.database = v;
        }
        if let Some(v) = overrides.user {
            c.user = v;
        }
        if let Some(v) = overrides.source_path {
            c.source_path = v;
        }
        if let Some(v) = overrides.target_table {
            c.target_table = v;
        }
        if let Some(v) = overrides.batch_size {
            c.batch_size = v;
        }
        if let Some(v) = overrides.null_policy {
            c.null_policy = v;
        }
        self
    }

    /// 校验并返回最终配置
    pub fn build(self) -> ImportResult<ImportConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

fn parse_number<T: FromStr>(name: &str, raw: &str) -> ImportResult<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| ImportError::ConfigValueError {
            key: format!("{}{}", ENV_PREFIX, name),
            value: raw.to_string(),
            message: "不是合法的数字".to_string(),
        })
}
