// ==========================================
// TalentPatriot 导入引擎 - 文件解析器实现
// ==========================================
// 职责: 上传文件字节 → 有序原始行
// 支持: CSV (.csv) / Excel (.xlsx/.xls)
// 红线: 日期不做自动转换, 保持字符串交由校验层处理
// ==========================================

use crate::domain::import::{CellValue, RawRow};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::import_trait::{FileParser, ParsedFile};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use csv::{ReaderBuilder, Trim};
use regex::Regex;
use std::io::Cursor;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

/// 支持的文件扩展名
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["csv", "xls", "xlsx"];

/// 提取小写扩展名（无扩展名返回空串）
pub fn file_extension(file_name: &str) -> String {
    Path::new(file_name.trim())
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// 数值字符串: 可选负号 + 十进制数 + 可选指数（不接受前导 +）
const NUMERIC_PATTERN: &str = r"^-?(\d+\.?|\.\d+|\d+\.\d+)([eE][-+]?\d+)?$";

static NUMERIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(NUMERIC_PATTERN).expect("valid regex"));

fn looks_numeric(value: &str) -> bool {
    NUMERIC_RE.is_match(value)
}

/// CSV 单元格类型转换（仅数值; 日期/布尔保持文本）
fn cast_csv_cell(value: &str) -> CellValue {
    let trimmed = value.trim();
    if looks_numeric(trimmed) {
        if let Ok(n) = trimmed.parse::<f64>() {
            if n.is_finite() {
                return CellValue::Number(n);
            }
        }
    }
    CellValue::Text(trimmed.to_string())
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_file(&self, content: &[u8]) -> ImportResult<ParsedFile> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .trim(Trim::All)
            .from_reader(content);

        // 读取表头（去除 BOM）
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let mut row = RawRow::new();

            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    if header.is_empty() {
                        continue;
                    }
                    row.insert(header.clone(), cast_csv_cell(value));
                }
            }

            // 跳过完全空白的行
            if row.values().all(CellValue::is_blank) {
                continue;
            }

            rows.push(row);
        }

        debug!(rows = rows.len(), columns = headers.len(), "CSV 解析完成");
        Ok(ParsedFile { headers, rows })
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl ExcelParser {
    fn cell_value(cell: &Data) -> CellValue {
        match cell {
            Data::Empty => CellValue::Text(String::new()),
            Data::String(s) => CellValue::Text(s.trim().to_string()),
            Data::Float(f) => CellValue::Number(*f),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Bool(b) => CellValue::Bool(*b),
            other => CellValue::Text(other.to_string().trim().to_string()),
        }
    }
}

impl FileParser for ExcelParser {
    fn parse_file(&self, content: &[u8]) -> ImportResult<ParsedFile> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(content))?;

        // 只读第一个 sheet
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::Parse("Excel file contains no worksheets".to_string()))?;

        let range = workbook.worksheet_range(&sheet_name)?;
        let all_rows: Vec<&[Data]> = range.rows().collect();
        if all_rows.len() < 2 {
            return Err(ImportError::Parse(
                "Excel file must contain a header row and at least one data row".to_string(),
            ));
        }

        // 表头: 小写 + TRIM
        let headers: Vec<String> = all_rows[0]
            .iter()
            .map(|cell| cell.to_string().trim().to_lowercase())
            .collect();

        let mut rows = Vec::new();
        for data_row in &all_rows[1..] {
            let mut row = RawRow::new();
            for (col_idx, header) in headers.iter().enumerate() {
                if header.is_empty() {
                    continue;
                }
                let value = data_row
                    .get(col_idx)
                    .map(Self::cell_value)
                    .unwrap_or_else(|| CellValue::Text(String::new()));
                row.insert(header.clone(), value);
            }

            if row.values().all(CellValue::is_blank) {
                continue;
            }

            rows.push(row);
        }

        debug!(sheet = %sheet_name, rows = rows.len(), "Excel 解析完成");
        Ok(ParsedFile { headers, rows })
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    /// 按扩展名选择解析器; 不支持的格式在解析前即失败
    pub fn parser_for(file_name: &str) -> ImportResult<Box<dyn FileParser>> {
        let ext = file_extension(file_name);
        match ext.as_str() {
            "csv" => Ok(Box::new(CsvParser)),
            "xlsx" | "xls" => Ok(Box::new(ExcelParser)),
            "" => Err(ImportError::UnsupportedFormat(file_name.to_string())),
            _ => Err(ImportError::UnsupportedFormat(format!(".{}", ext))),
        }
    }

    pub fn parse(&self, content: &[u8], file_name: &str) -> ImportResult<ParsedFile> {
        Self::parser_for(file_name)?.parse_file(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_parser_casts_numbers_not_dates() {
        let csv = "first_name,experience,start_date,zip\nJane,7,2024-01-15,02134\n";
        let parsed = CsvParser.parse_file(csv.as_bytes()).unwrap();

        assert_eq!(parsed.headers, vec!["first_name", "experience", "start_date", "zip"]);
        assert_eq!(parsed.rows.len(), 1);
        let row = &parsed.rows[0];
        assert_eq!(row.get("first_name"), Some(&CellValue::text("Jane")));
        assert_eq!(row.get("experience"), Some(&CellValue::Number(7.0)));
        assert_eq!(row.get("start_date"), Some(&CellValue::text("2024-01-15")));
        assert_eq!(row.get("zip"), Some(&CellValue::Number(2134.0)));
        let keys: Vec<&String> = row.keys().collect();
        assert_eq!(keys, parsed.headers.iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_csv_parser_skips_blank_lines_and_trims() {
        let csv = "name,email\n  Jane , jane@x.com \n\n,\nJohn,john@x.com\n";
        let parsed = CsvParser.parse_file(csv.as_bytes()).unwrap();

        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[0].get("name"), Some(&CellValue::text("Jane")));
        assert_eq!(parsed.rows[0].get("email"), Some(&CellValue::text("jane@x.com")));
        assert_eq!(parsed.rows[1].get("name"), Some(&CellValue::text("John")));
    }

    #[test]
    fn test_csv_parser_tolerates_ragged_rows() {
        let csv = "title\nTitle,\n";
        let parsed = CsvParser.parse_file(csv.as_bytes()).unwrap();

        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.rows[0].len(), 1);
        assert_eq!(parsed.rows[0].get("title"), Some(&CellValue::text("Title")));
    }

    #[test]
    fn test_csv_parser_rejects_invalid_utf8() {
        let mut bytes = b"name\n".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe, 0xfd, b'\n']);
        let result = CsvParser.parse_file(&bytes);
        assert!(matches!(result, Err(ImportError::Parse(_))));
    }

    #[test]
    fn test_looks_numeric() {
        assert!(looks_numeric("42"));
        assert!(looks_numeric("-3.5"));
        assert!(!looks_numeric("1.2.3"));
        assert!(!looks_numeric("inf"));
        assert!(!looks_numeric("+"));
        assert!(!looks_numeric("555-1234"));
        assert!(!looks_numeric("+447911123456"));
        assert!(!looks_numeric("."));
        assert!(looks_numeric(".5"));
        assert!(looks_numeric("1e3"));
    }

    #[test]
    fn test_csv_parser_keeps_plus_prefixed_values_as_text() {
        let csv = "First Name,Email,Phone\nJane,jane@x.com,+447911123456\n";
        let parsed = CsvParser.parse_file(csv.as_bytes()).unwrap();

        assert_eq!(
            parsed.rows[0].get("Phone"),
            Some(&CellValue::text("+447911123456"))
        );
    }

    #[test]
    fn test_universal_parser_rejects_unsupported_extension() {
        let result = UniversalFileParser.parse(b"hello", "resume.txt");
        match result {
            Err(ImportError::UnsupportedFormat(ext)) => assert_eq!(ext, ".txt"),
            other => panic!("expected UnsupportedFormat, got {:?}", other.map(|p| p.rows.len())),
        }
        assert!(UniversalFileParser::parser_for("candidates.CSV").is_ok());
        assert!(UniversalFileParser::parser_for("no_extension").is_err());
    }

    #[test]
    fn test_excel_parser_rejects_garbage() {
        let result = ExcelParser.parse_file(b"definitely not a workbook");
        assert!(matches!(result, Err(ImportError::Parse(_))));
    }
}
