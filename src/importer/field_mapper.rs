// ==========================================
// 测点数据批量导入工具 - 字段映射器实现
// ==========================================
// 职责: 源字段 → 目标字段映射 + 类型转换
// 映射: timestamp → ts, signal_id → signal_id, value → value
// ==========================================

use crate::domain::measurement::{Measurement, RawRecord, SignalId};
use crate::importer::data_cleaner::is_missing_value;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::measurement_importer_trait::FieldMapper as FieldMapperTrait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// 源文件必需列（固定顺序）
pub const REQUIRED_COLUMNS: [&str; 3] = ["timestamp", "signal_id", "value"];

/// 列名别名
pub fn column_aliases(key: &str) -> &'static [&'static str] {
    match key {
        "timestamp" => &["timestamp", "ts"],
        "signal_id" => &["signal_id"],
        "value" => &["value"],
        _ => &[],
    }
}

/// 在表头中查找必需列实际使用的列名
pub fn resolve_column<'a>(headers: &'a [String], key: &str) -> Option<&'a str> {
    column_aliases(key)
        .iter()
        .find_map(|alias| headers.iter().find(|h| h.as_str() == *alias))
        .map(String::as_str)
}

/// 按别名读取行内字段
pub fn lookup<'a>(row: &'a RawRecord, key: &str) -> Option<&'a str> {
    column_aliases(key).iter().find_map(|alias| row.get(alias))
}

pub struct FieldMapper;

impl FieldMapperTrait for FieldMapper {
    fn map_to_measurement(&self, row: &RawRecord) -> ImportResult<Measurement> {
        let row_number = row.row_number;

        Ok(Measurement {
            ts: self.parse_timestamp(row, "timestamp", row_number)?,
            signal_id: SignalId::parse(self.get_required(row, "signal_id", row_number)?),
            value: self.parse_f64(row, "value", row_number)?,
        })
    }
}

impl FieldMapper {
    /// 提取必需字段（清洗后应始终存在）
    fn get_required<'a>(
        &self,
        row: &'a RawRecord,
        key: &str,
        row_number: usize,
    ) -> ImportResult<&'a str> {
        match lookup(row, key) {
            Some(v) if !is_missing_value(Some(v)) => Ok(v.trim()),
            _ => Err(ImportError::TypeConversionError {
                row: row_number,
                field: key.to_string(),
                message: "字段缺失".to_string(),
            }),
        }
    }

    /// 解析浮点数
    fn parse_f64(&self, row: &RawRecord, key: &str, row_number: usize) -> ImportResult<f64> {
        let value = self.get_required(row, key, row_number)?;
        value
            .parse::<f64>()
            .map_err(|_| ImportError::TypeConversionError {
                row: row_number,
                field: key.to_string(),
                message: format!("无法解析为浮点数: {}", value),
            })
    }

    /// 解析时间戳（带时区的统一转为 UTC，不带时区的按 UTC 处理）
    fn parse_timestamp(
        &self,
        row: &RawRecord,
        key: &str,
        row_number: usize,
    ) -> ImportResult<DateTime<Utc>> {
        let value = self.get_required(row, key, row_number)?;

        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Ok(dt.with_timezone(&Utc));
        }

        // PostgreSQL 导出格式: 偏移量可为 +HH / +HHMM / +HH:MM
        let offset = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f%#z")
            .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%#z"));
        if let Ok(dt) = offset {
            return Ok(dt.with_timezone(&Utc));
        }

        let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f"))
            .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M"))
            .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
            .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y%m%d%H%M%S"))
            .or_else(|_| {
                NaiveDate::parse_from_str(value, "%Y-%m-%d").map(|d| d.and_time(NaiveTime::MIN))
            })
            .map_err(|_| ImportError::TypeConversionError {
                row: row_number,
                field: key.to_string(),
                message: format!("时间格式错误: {}", value),
            })?;

        Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashMap;

    fn record(pairs: &[(&str, &str)]) -> RawRecord {
        let fields: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RawRecord {
            row_number: 7,
            fields,
        }
    }

    #[test]
    fn test_field_mapper_basic() {
        let row = record(&[
            ("timestamp", "2024-03-01 12:30:00"),
            ("signal_id", "101"),
            ("value", "10.5"),
            ("unit", "kPa"),
        ]);

        let mapper = FieldMapper;
        let m = mapper.map_to_measurement(&row).unwrap();

        assert_eq!(m.ts, Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap());
        assert_eq!(m.signal_id, SignalId::Int(101));
        assert_eq!(m.value, 10.5);
    }

    #[test]
    fn test_field_mapper_ts_alias_and_text_signal() {
        let row = record(&[
            ("ts", "2024-03-01T00:00:00+02:00"),
            ("signal_id", "pump-7"),
            ("value", "-1e3"),
        ]);

        let m = FieldMapper.map_to_measurement(&row).unwrap();

        // +02:00 归一化到 UTC
        assert_eq!(m.ts, Utc.with_ymd_and_hms(2024, 2, 29, 22, 0, 0).unwrap());
        assert_eq!(m.signal_id, SignalId::Text("pump-7".to_string()));
        assert_eq!(m.value, -1000.0);
    }

    #[test]
    fn test_field_mapper_timestamp_formats() {
        let mapper = FieldMapper;
        let expected = Utc.with_ymd_and_hms(2025, 1, 20, 8, 0, 0).unwrap();
        for raw in [
            "2025-01-20 08:00:00",
            "2025-01-20T08:00:00",
            "20250120080000",
            "2025-01-20T08:00:00Z",
            "2025-01-20 08:00:00+00",
            "2025-01-20T08:00:00+00",
            "2025-01-20 10:00:00+02",
            "2025-01-20 13:30:00+0530",
            "2025-01-20 08:00:00.000+00",
            "2025-01-20 08:00",
            "2025-01-20T08:00",
        ] {
            let row = record(&[("timestamp", raw), ("signal_id", "1"), ("value", "1")]);
            assert_eq!(mapper.map_to_measurement(&row).unwrap().ts, expected, "{}", raw);
        }

        let row = record(&[("timestamp", "2025-01-20"), ("signal_id", "1"), ("value", "1")]);
        assert_eq!(
            mapper.map_to_measurement(&row).unwrap().ts,
            Utc.with_ymd_and_hms(2025, 1, 20, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_field_mapper_fractional_seconds() {
        let row = record(&[
            ("timestamp", "2025-01-20 08:00:00.250"),
            ("signal_id", "1"),
            ("value", "1"),
        ]);
        let m = FieldMapper.map_to_measurement(&row).unwrap();
        assert_eq!(m.ts.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_field_mapper_invalid_number() {
        let row = record(&[
            ("timestamp", "2024-03-01 12:30:00"),
            ("signal_id", "1"),
            ("value", "abc"),
        ]);

        let err = FieldMapper.map_to_measurement(&row).unwrap_err();
        match err {
            ImportError::TypeConversionError { row, field, .. } => {
                assert_eq!(row, 7);
                assert_eq!(field, "value");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_field_mapper_na_token_is_missing() {
        // 与清洗阶段同一规则：NA 标记不会被当作数值解析
        for raw in ["NaN", "NULL", "  "] {
            let row = record(&[
                ("timestamp", "2024-03-01 12:30:00"),
                ("signal_id", "1"),
                ("value", raw),
            ]);
            let err = FieldMapper.map_to_measurement(&row).unwrap_err();
            assert!(
                matches!(err, ImportError::TypeConversionError { ref field, .. } if field == "value"),
                "{}: {:?}",
                raw,
                err
            );
        }
    }

    #[test]
    fn test_field_mapper_invalid_timestamp() {
        let row = record(&[
            ("timestamp", "yesterday"),
            ("signal_id", "1"),
            ("value", "1"),
        ]);
        let err = FieldMapper.map_to_measurement(&row).unwrap_err();
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_resolve_column() {
        let headers = vec!["ts".to_string(), "signal_id".to_string()];
        assert_eq!(resolve_column(&headers, "timestamp"), Some("ts"));
        assert_eq!(resolve_column(&headers, "signal_id"), Some("signal_id"));
        assert_eq!(resolve_column(&headers, "value"), None);
    }
}
