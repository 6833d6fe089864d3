// ==========================================
// 测点数据批量导入工具 - 文件解析器实现
// ==========================================
// 阶段 0: 文件读取与解析（整表读入内存）
// 支持: CSV (.csv / .txt)，TSV (.tsv)
// ==========================================

use crate::domain::measurement::{RawRecord, RawTable};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::{resolve_column, REQUIRED_COLUMNS};
use crate::importer::measurement_importer_trait::FileParser;
use csv::ReaderBuilder;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::Path;

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl CsvParser {
    /// 按扩展名选择分隔符
    fn delimiter_for(path: &Path) -> u8 {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("tsv") => b'\t',
            _ => b',',
        }
    }

    /// 校验表头：不允许重复列名，必需列必须存在
    fn validate_headers(headers: &[String]) -> ImportResult<()> {
        let mut seen = HashSet::new();
        for h in headers {
            if !h.is_empty() && !seen.insert(h.as_str()) {
                return Err(ImportError::DuplicateColumn(h.clone()));
            }
        }

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|key| resolve_column(headers, key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ImportError::MissingColumn(missing.join(", ")));
        }

        Ok(())
    }
}

impl FileParser for CsvParser {
    fn parse_to_raw_table(&self, file_path: &Path) -> ImportResult<RawTable> {
        let path = file_path;

        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // 打开 CSV 文件
        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(Self::delimiter_for(path))
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        // 读取表头
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        Self::validate_headers(&headers)?;

        // 读取所有行
        let mut rows = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            let record = result?;
            let row_number = row_idx + 1;

            // 短行允许（尾部字段按缺失处理），长行视为格式错误
            if record.len() > headers.len() {
                return Err(ImportError::CsvParseError(format!(
                    "第 {} 行字段数 {} 超过表头列数 {}",
                    row_number,
                    record.len(),
                    headers.len()
                )));
            }

            let mut fields = HashMap::with_capacity(headers.len());

            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    fields.insert(header.clone(), value.trim().to_string());
                }
            }

            rows.push(RawRecord {
                row_number,
                fields,
            });
        }

        Ok(RawTable { headers, rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(lines: &[&str]) -> NamedTempFile {
        let mut temp_file = NamedTempFile::with_suffix(".csv").unwrap();
        for line in lines {
            writeln!(temp_file, "{}", line).unwrap();
        }
        temp_file
    }

    #[test]
    fn test_csv_parser_valid_file() {
        let temp_file = csv_file(&[
            "timestamp,signal_id,value,unit",
            "2024-01-01 00:00:00,1,10.0,kPa",
            "2024-01-01 00:01:00,2,11.5,kPa",
        ]);

        let table = CsvParser.parse_to_raw_table(temp_file.path()).unwrap();

        assert_eq!(table.shape(), (2, 4));
        assert_eq!(table.rows[0].get("signal_id"), Some("1"));
        assert_eq!(table.rows[1].get("value"), Some("11.5"));
        assert_eq!(table.rows[1].row_number, 2);
    }

    #[test]
    fn test_csv_parser_file_not_found() {
        let err = CsvParser
            .parse_to_raw_table(Path::new("non_existent.csv"))
            .unwrap_err();
        assert!(matches!(err, ImportError::FileNotFound(_)));
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_csv_parser_header_only() {
        let temp_file = csv_file(&["timestamp,signal_id,value"]);
        let table = CsvParser.parse_to_raw_table(temp_file.path()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.headers.len(), 3);
    }

    #[test]
    fn test_csv_parser_missing_required_column() {
        let temp_file = csv_file(&["timestamp,value", "2024-01-01,1.0"]);
        let err = CsvParser.parse_to_raw_table(temp_file.path()).unwrap_err();
        match err {
            ImportError::MissingColumn(cols) => assert_eq!(cols, "signal_id"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_csv_parser_empty_file() {
        let temp_file = csv_file(&[]);
        let err = CsvParser.parse_to_raw_table(temp_file.path()).unwrap_err();
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_csv_parser_duplicate_header() {
        let temp_file = csv_file(&["timestamp,signal_id,value,value", "t,1,2,3"]);
        let err = CsvParser.parse_to_raw_table(temp_file.path()).unwrap_err();
        assert!(matches!(err, ImportError::DuplicateColumn(ref c) if c == "value"));
    }

    #[test]
    fn test_csv_parser_short_rows_and_blank_lines() {
        let temp_file = csv_file(&[
            "timestamp,signal_id,value",
            "2024-01-01,1,1.0",
            "",
            "2024-01-02,2",
        ]);
        let table = CsvParser.parse_to_raw_table(temp_file.path()).unwrap();

        // 空行跳过，短行保留（缺失字段不出现在 fields 中）
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[1].get("value"), None);
    }

    #[test]
    fn test_csv_parser_rejects_extra_fields() {
        let temp_file = csv_file(&[
            "timestamp,signal_id,value",
            "2024-01-01,1,1.0",
            "2024-01-02,2,2.0,999,junk",
        ]);
        let err = CsvParser.parse_to_raw_table(temp_file.path()).unwrap_err();

        assert!(err.is_parse_error());
        match err {
            ImportError::CsvParseError(msg) => assert!(msg.contains("第 2 行"), "{}", msg),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_csv_parser_ts_alias_header() {
        let temp_file = csv_file(&[" ts , signal_id , value ", "2024-01-01,1,1.0"]);
        let table = CsvParser.parse_to_raw_table(temp_file.path()).unwrap();
        assert_eq!(table.headers, vec!["ts", "signal_id", "value"]);
    }

    #[test]
    fn test_csv_parser_tsv() {
        let mut temp_file = NamedTempFile::with_suffix(".tsv").unwrap();
        writeln!(temp_file, "timestamp\tsignal_id\tvalue").unwrap();
        writeln!(temp_file, "2024-01-01\t9\t3.5").unwrap();

        let table = CsvParser.parse_to_raw_table(temp_file.path()).unwrap();
        assert_eq!(table.rows[0].get("signal_id"), Some("9"));
    }
}
