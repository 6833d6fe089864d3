// ==========================================
// 测点数据批量导入工具 - 命令行入口
// ==========================================
// 流程: 加载配置 → 解析/清洗/映射 → 单事务写入 → 打印确认
// 失败: 错误向上传播为进程级错误（非零退出码）
// ==========================================

use anyhow::Context;
use clap::Parser;
use measurement_importer::config::{ConfigLoader, ConfigOverrides, NullPolicy, StoreBackend};
use measurement_importer::importer::{MeasurementImporter, MeasurementImporterImpl};
use measurement_importer::logging::{self, LogFormat};
use measurement_importer::repository::repository_for;
use std::path::PathBuf;

/// CSV 测点数据批量导入
#[derive(Debug, Parser)]
#[command(name = "measurement-importer", version, about)]
struct Cli {
    /// JSON 配置文件（缺省时尝试用户配置目录下的 measurement-importer/config.json）
    #[arg(long)]
    config: Option<PathBuf>,

    /// 源 CSV 文件
    #[arg(long)]
    source: Option<PathBuf>,

    /// 目标表名
    #[arg(long)]
    table: Option<String>,

    /// 目标库类型: postgres | sqlite
    #[arg(long, value_parser = parse_backend)]
    backend: Option<StoreBackend>,

    #[arg(long)]
    host: Option<String>,

    #[arg(long)]
    port: Option<u16>,

    /// 数据库名（sqlite 时为数据库文件路径）
    #[arg(long)]
    database: Option<String>,

    #[arg(long)]
    user: Option<String>,

    /// 单条 INSERT 语句的最大行数
    #[arg(long)]
    batch_size: Option<usize>,

    /// 缺失值检查范围: any-column | required-columns
    #[arg(long, value_parser = parse_null_policy)]
    null_policy: Option<NullPolicy>,

    /// 只解析与清洗，不写库
    #[arg(long)]
    dry_run: bool,

    /// JSON 格式日志
    #[arg(long)]
    log_json: bool,
}

fn parse_backend(s: &str) -> Result<StoreBackend, String> {
    s.parse().map_err(|e: measurement_importer::ImportError| e.to_string())
}

fn parse_null_policy(s: &str) -> Result<NullPolicy, String> {
    s.parse().map_err(|e: measurement_importer::ImportError| e.to_string())
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            backend: self.backend,
            host: self.host.clone(),
            port: self.port,
            database: self.database.clone(),
            user: self.user.clone(),
            source_path: self.source.clone(),
            target_table: self.table.clone(),
            batch_size: self.batch_size,
            null_policy: self.null_policy,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init(if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Text
    });

    tracing::info!(
        "{} v{}",
        measurement_importer::APP_NAME,
        measurement_importer::VERSION
    );

    let loader = match &cli.config {
        Some(path) => ConfigLoader::new().with_file(path)?,
        None => ConfigLoader::new().with_default_file()?,
    };
    let config = loader
        .with_env(std::env::vars())?
        .with_overrides(cli.overrides())
        .build()
        .context("配置无效")?;
    tracing::debug!(?config, "配置加载完成");

    let importer = MeasurementImporterImpl::from_config(repository_for(&config), &config);

    if cli.dry_run {
        let prepared = importer.prepare(&config.source_path).await?;
        println!(
            "dry-run: 共 {} 行，丢弃 {} 行，待写入 {} 行（未写库）",
            prepared.total_rows,
            prepared.dropped_rows,
            prepared.measurements.len()
        );
        return Ok(());
    }

    let summary = importer
        .import_from_csv(&config.source_path)
        .await
        .with_context(|| format!("导入失败: {}", config.source_path.display()))?;

    println!(
        "数据导入成功: {} 行已写入 {}（源文件 {} 行，丢弃 {} 行）",
        summary.inserted_rows, summary.target_table, summary.total_rows, summary.dropped_rows
    );
    Ok(())
}
