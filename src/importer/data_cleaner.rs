// ==========================================
// 测点数据批量导入工具 - 数据清洗器实现
// ==========================================
// 职责: 缺失值判定 / 丢弃含缺失值的行
// 规则: 缺失行静默丢弃，不报错；清洗后 0 行也是合法输入
// ==========================================

use crate::config::NullPolicy;
use crate::domain::measurement::{RawRecord, RawTable};
use crate::importer::field_mapper::{lookup, REQUIRED_COLUMNS};
use crate::importer::measurement_importer_trait::DataCleaner as DataCleanerTrait;
use tracing::debug;

/// 视为缺失值的文本标记（与常见表格工具的 NA 识别保持一致）
pub const NA_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub struct DataCleaner;

/// 缺失值判定：字段不存在、空白或 NA 标记
///
/// 清洗阶段与映射阶段共用此规则
pub fn is_missing_value(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(v) => {
            let trimmed = v.trim();
            trimmed.is_empty() || NA_TOKENS.contains(&trimmed)
        }
    }
}

impl DataCleanerTrait for DataCleaner {
    fn is_missing(&self, value: Option<&str>) -> bool {
        is_missing_value(value)
    }

    fn drop_incomplete_rows(&self, table: RawTable, policy: NullPolicy) -> RawTable {
        let RawTable { headers, rows } = table;

        let rows: Vec<RawRecord> = rows
            .into_iter()
            .filter(|row| {
                let complete = match policy {
                    NullPolicy::AnyColumn => headers
                        .iter()
                        .all(|h| !self.is_missing(row.get(h))),
                    NullPolicy::RequiredColumns => REQUIRED_COLUMNS
                        .iter()
                        .all(|key| !self.is_missing(lookup(row, key))),
                };
                if !complete {
                    debug!(row_number = row.row_number, "丢弃含缺失值的行");
                }
                complete
            })
            .collect();

        RawTable { headers, rows }
    }
}
