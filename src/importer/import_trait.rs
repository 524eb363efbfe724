// ==========================================
// TalentPatriot 导入引擎 - 导入组件 Trait
// ==========================================
// 职责: 定义导入管道各阶段接口（不包含实现）
// 阶段: 文件解析 → 字段映射 → 行校验 → 落库（编排器）
// ==========================================

use crate::domain::entity::{NewCandidate, NewJob};
use crate::domain::import::{DataImport, FieldMapping, ImportOutcome, RawRow};
use crate::domain::types::ImportType;
use crate::importer::error::ImportResult;
use crate::importer::record_validator::ValidationResult;
use async_trait::async_trait;

// ==========================================
// ParsedFile - 解析结果
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ParsedFile {
    pub headers: Vec<String>, // 源列名（列顺序）
    pub rows: Vec<RawRow>,    // 数据行（源顺序, 不含表头与空行）
}

// ==========================================
// DataImporter Trait
// ==========================================
// 用途: 导入主接口
// 实现者: ImportOrchestrator
#[async_trait]
pub trait DataImporter: Send + Sync {
    /// 执行一次导入任务
    ///
    /// # 参数
    /// - job: 导入任务（pending 状态）
    /// - file_content: 上传文件字节
    /// - file_name: 原始文件名（用于选择解析器）
    ///
    /// # 返回
    /// - ImportOutcome: 始终返回结构化结果, 不返回错误
    async fn process_import(
        &self,
        job: &DataImport,
        file_content: &[u8],
        file_name: &str,
    ) -> ImportOutcome;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（阶段 0）
// 实现者: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    /// 解析文件字节为原始行记录
    ///
    /// # 返回
    /// - Ok(ParsedFile): 表头与行记录
    /// - Err(ImportError::Parse): 格式错误
    fn parse_file(&self, content: &[u8]) -> ImportResult<ParsedFile>;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 字段映射接口（阶段 1）
// 实现者: field_mapper::FieldMapper
pub trait FieldMapper: Send + Sync {
    /// 将原始行的列名映射为标准字段名
    ///
    /// # 参数
    /// - row: 原始行
    /// - import_type: 目标实体
    /// - overrides: 用户确认的映射（优先于自动识别）
    fn map_row(
        &self,
        row: &RawRow,
        import_type: ImportType,
        overrides: Option<&FieldMapping>,
    ) -> RawRow;

    /// 自动识别的列映射（仅包含识别成功的列）
    fn suggested_mappings(&self, headers: &[String], import_type: ImportType) -> FieldMapping;
}

// ==========================================
// RecordValidator Trait
// ==========================================
// 用途: 行级校验接口（阶段 2）
// 实现者: record_validator::RecordValidator
pub trait RecordValidator: Send + Sync {
    /// 校验候选人行
    fn validate_candidate(&self, row: &RawRow, org_id: &str) -> ValidationResult<NewCandidate>;

    /// 校验职位行
    fn validate_job(&self, row: &RawRow, org_id: &str) -> ValidationResult<NewJob>;
}
