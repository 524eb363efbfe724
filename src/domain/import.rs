// ==========================================
// TalentPatriot 导入引擎 - 导入领域模型
// ==========================================
// 职责: 导入任务 (DataImport) / 行记录 (ImportRecord) / 原始单元格
// 用途: 编排器写入, 其他调用方只读
// 对齐: data_imports / import_records 表
// ==========================================

use crate::domain::types::{EntityType, ImportStatus, RecordStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use indexmap::IndexMap;
use std::collections::BTreeMap;

// ==========================================
// CellValue - 原始单元格值
// ==========================================
// 文件解析层产出的松散类型, 只在 RecordValidator 边界解析为实体字段类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// 空白判定（空字符串/纯空白）
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// 文本表示（整数值的数字不带小数点）
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
        }
    }

    /// 数值表示（文本可解析时也返回）
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            CellValue::Bool(_) => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

/// 原始行（列名 → 单元格值, 保持源文件列顺序）
pub type RawRow = IndexMap<String, CellValue>;

/// 用户确认的字段映射（原始列名 → 标准字段名）
pub type FieldMapping = BTreeMap<String, String>;

// ==========================================
// DataImport - 导入任务
// ==========================================
// 红线: successful_records + failed_records <= total_records
// 红线: total_records 确定后不回退
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataImport {
    pub id: String,
    pub org_id: String,
    pub user_id: String,
    pub import_type: String, // 持久化文本, 编排器边界解析为 ImportType
    pub file_name: String,
    pub file_size: i64,
    pub status: ImportStatus,
    pub total_records: i64,
    pub successful_records: i64,
    pub failed_records: i64,
    pub field_mapping: Option<FieldMapping>,
    pub error_summary: Option<String>,
    pub processing_started_at: Option<DateTime<Utc>>,
    pub processing_completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl DataImport {
    /// 计数不变量校验
    pub fn counters_consistent(&self) -> bool {
        self.total_records >= 0
            && self.successful_records >= 0
            && self.failed_records >= 0
            && self.successful_records + self.failed_records <= self.total_records
    }

    /// 应用增量更新（未设置的字段保持不变）
    pub fn apply_update(&mut self, update: &DataImportUpdate) {
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(total) = update.total_records {
            self.total_records = total;
        }
        if let Some(success) = update.successful_records {
            self.successful_records = success;
        }
        if let Some(failed) = update.failed_records {
            self.failed_records = failed;
        }
        if let Some(summary) = &update.error_summary {
            self.error_summary = Some(summary.clone());
        }
        if let Some(started) = update.processing_started_at {
            self.processing_started_at = Some(started);
        }
        if let Some(completed) = update.processing_completed_at {
            self.processing_completed_at = Some(completed);
        }
    }
}

// ==========================================
// NewDataImport - 新建导入任务参数
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDataImport {
    pub org_id: String,
    pub user_id: String,
    pub import_type: String,
    pub file_name: String,
    pub file_size: i64,
    pub field_mapping: Option<FieldMapping>,
}

// ==========================================
// DataImportUpdate - 导入任务增量更新
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataImportUpdate {
    pub status: Option<ImportStatus>,
    pub total_records: Option<i64>,
    pub successful_records: Option<i64>,
    pub failed_records: Option<i64>,
    pub error_summary: Option<String>,
    pub processing_started_at: Option<DateTime<Utc>>,
    pub processing_completed_at: Option<DateTime<Utc>>,
}

impl DataImportUpdate {
    pub fn status(mut self, status: ImportStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn total_records(mut self, total: i64) -> Self {
        self.total_records = Some(total);
        self
    }

    pub fn counters(mut self, successful: i64, failed: i64) -> Self {
        self.successful_records = Some(successful);
        self.failed_records = Some(failed);
        self
    }

    pub fn error_summary(mut self, summary: impl Into<String>) -> Self {
        self.error_summary = Some(summary.into());
        self
    }

    pub fn started_at(mut self, at: DateTime<Utc>) -> Self {
        self.processing_started_at = Some(at);
        self
    }

    pub fn completed_at(mut self, at: DateTime<Utc>) -> Self {
        self.processing_completed_at = Some(at);
        self
    }
}

// ==========================================
// ImportRecord - 行级导入记录
// ==========================================
// 红线: 每个源数据行恰好一条, 创建后不可变
// 红线: status = success ⇔ entity_id 与 processed_data 均非空
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRecord {
    pub id: String,
    pub import_id: String,
    pub row_number: i64, // 1 起, 源文件顺序
    pub original_data: serde_json::Value,
    pub processed_data: Option<serde_json::Value>,
    pub status: RecordStatus,
    pub error_message: Option<String>,
    pub entity_id: Option<String>,
    pub entity_type: EntityType,
    pub created_at: DateTime<Utc>,
}

// ==========================================
// NewImportRecord - 新建行记录参数
// ==========================================
// 只能通过 success / failed 构造, 保证状态与实体字段一致
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewImportRecord {
    pub import_id: String,
    pub row_number: i64,
    pub original_data: serde_json::Value,
    pub processed_data: Option<serde_json::Value>,
    pub status: RecordStatus,
    pub error_message: Option<String>,
    pub entity_id: Option<String>,
    pub entity_type: EntityType,
}

impl NewImportRecord {
    pub fn success(
        import_id: &str,
        row_number: i64,
        original_data: serde_json::Value,
        processed_data: serde_json::Value,
        entity_id: String,
        entity_type: EntityType,
    ) -> Self {
        Self {
            import_id: import_id.to_string(),
            row_number,
            original_data,
            processed_data: Some(processed_data),
            status: RecordStatus::Success,
            error_message: None,
            entity_id: Some(entity_id),
            entity_type,
        }
    }

    pub fn failed(
        import_id: &str,
        row_number: i64,
        original_data: serde_json::Value,
        error_message: String,
        entity_type: EntityType,
    ) -> Self {
        Self {
            import_id: import_id.to_string(),
            row_number,
            original_data,
            processed_data: None,
            status: RecordStatus::Failed,
            error_message: Some(error_message),
            entity_id: None,
            entity_type,
        }
    }
}

// ==========================================
// ImportOutcome - 导入执行结果
// ==========================================
// 调用方只会收到此结构, 不会收到错误
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub success: bool,
    pub message: String,
    pub status: ImportStatus,
    pub total_records: i64,
    pub successful_records: i64,
    pub failed_records: i64,
}

impl ImportOutcome {
    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            status: ImportStatus::Failed,
            total_records: 0,
            successful_records: 0,
            failed_records: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value_as_text() {
        assert_eq!(CellValue::Number(5551234.0).as_text(), "5551234");
        assert_eq!(CellValue::Number(2.5).as_text(), "2.5");
        assert_eq!(CellValue::text("  Jane ").as_text(), "Jane");
        assert_eq!(CellValue::Bool(true).as_text(), "true");
    }

    #[test]
    fn test_cell_value_serializes_untagged() {
        let mut row = RawRow::new();
        row.insert("age".to_string(), CellValue::Number(3.0));
        row.insert("name".to_string(), CellValue::text("Jane"));
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json, serde_json::json!({"age": 3.0, "name": "Jane"}));
    }

    #[test]
    fn test_new_import_record_invariant() {
        let ok = NewImportRecord::success(
            "imp-1",
            1,
            serde_json::json!({}),
            serde_json::json!({"email": "a@b.co"}),
            "cand-1".to_string(),
            EntityType::Candidate,
        );
        assert_eq!(ok.status, RecordStatus::Success);
        assert!(ok.entity_id.is_some() && ok.processed_data.is_some());

        let bad = NewImportRecord::failed(
            "imp-1",
            2,
            serde_json::json!({}),
            "Email is required".to_string(),
            EntityType::Candidate,
        );
        assert_eq!(bad.status, RecordStatus::Failed);
        assert!(bad.entity_id.is_none() && bad.processed_data.is_none());
    }

    #[test]
    fn test_apply_update_keeps_unset_fields() {
        let mut job = DataImport {
            id: "imp-1".to_string(),
            org_id: "org-1".to_string(),
            user_id: "user-1".to_string(),
            import_type: "candidates".to_string(),
            file_name: "a.csv".to_string(),
            file_size: 10,
            status: ImportStatus::Processing,
            total_records: 12,
            successful_records: 0,
            failed_records: 0,
            field_mapping: None,
            error_summary: None,
            processing_started_at: None,
            processing_completed_at: None,
            created_at: Utc::now(),
        };

        job.apply_update(&DataImportUpdate::default().counters(8, 2));
        assert_eq!(job.total_records, 12);
        assert_eq!(job.successful_records, 8);
        assert_eq!(job.status, ImportStatus::Processing);
        assert!(job.counters_consistent());
    }
}
