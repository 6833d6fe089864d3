// ==========================================
// 测点数据批量导入工具 - 测点领域模型
// ==========================================
// 源行: timestamp / signal_id / value (+ 其它忽略列)
// 目标行: (ts, signal_id, value)
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

// ==========================================
// RawRecord - 源文件中的一行（未类型化）
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub row_number: usize, // 数据行号（从 1 开始，不含表头）
    pub fields: HashMap<String, String>,
}

impl RawRecord {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }
}

// ==========================================
// RawTable - 内存中的整张源表
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRecord>,
}

impl RawTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// (行数, 列数)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.headers.len())
    }
}

// ==========================================
// SignalId - 测点标识
// ==========================================
// 能解析为 i64 的按整数处理，否则按文本处理
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignalId {
    Int(i64),
    Text(String),
}

impl SignalId {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<i64>() {
            Ok(v) => SignalId::Int(v),
            Err(_) => SignalId::Text(trimmed.to_string()),
        }
    }
}

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalId::Int(v) => write!(f, "{}", v),
            SignalId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for SignalId {
    fn from(v: i64) -> Self {
        SignalId::Int(v)
    }
}

impl From<&str> for SignalId {
    fn from(v: &str) -> Self {
        SignalId::Text(v.to_string())
    }
}

// ==========================================
// Measurement - 目标行 (ts, signal_id, value)
// ==========================================
// 对齐: measurements 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub ts: DateTime<Utc>,      // 采集时间点
    pub signal_id: SignalId,    // 测点标识
    pub value: f64,             // 测量值
}

// ==========================================
// PreparedBatch - 清洗映射完成、待写入的批次
// ==========================================
#[derive(Debug, Clone)]
pub struct PreparedBatch {
    pub total_rows: usize,
    pub dropped_rows: usize,
    pub measurements: Vec<Measurement>,
}

// ==========================================
// ImportSummary - 单次导入结果
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub batch_id: String,
    pub source_path: PathBuf,
    pub target_table: String,
    pub total_rows: usize,    // 源文件数据行数
    pub dropped_rows: usize,  // 因缺失值被丢弃的行数
    pub inserted_rows: usize, // 已提交的行数
    pub elapsed: Duration,
}
