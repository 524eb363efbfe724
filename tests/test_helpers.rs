// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试文件生成等功能
// ==========================================

#![allow(dead_code)]

use rust_xlsxwriter::Workbook;
use std::error::Error;
use talentpatriot_import::db::{ensure_schema, open_sqlite_connection};
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("temp path is not valid UTF-8")?
        .to_string();

    let conn = open_sqlite_connection(&db_path)?;
    ensure_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 写入 global 配置
pub fn insert_test_config(db_path: &str, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
    let conn = open_sqlite_connection(db_path)?;
    conn.execute(
        "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
         ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
        rusqlite::params![key, value],
    )?;
    Ok(())
}

/// 生成候选人 CSV: 前 valid 行有效, 后 invalid 行缺少邮箱
pub fn candidate_csv(valid: usize, invalid: usize) -> String {
    let mut csv = String::from("First Name,Last Name,Email,Phone\n");
    for i in 0..valid {
        csv.push_str(&format!("Valid{},Person,valid{}@example.com,555-010{}\n", i, i, i % 10));
    }
    for i in 0..invalid {
        csv.push_str(&format!("Broken{},Person,,\n", i));
    }
    csv
}

/// 生成 xlsx 文件字节（首行为表头）
pub fn xlsx_bytes(rows: &[&[&str]]) -> Result<Vec<u8>, Box<dyn Error>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            worksheet.write_string(r as u32, c as u16, *value)?;
        }
    }
    Ok(workbook.save_to_buffer()?)
}
