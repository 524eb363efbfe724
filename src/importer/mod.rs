// ==========================================
// TalentPatriot 导入引擎 - 导入层
// ==========================================
// 职责: 上传文件 → 候选人 / 职位
// 支持: CSV, XLS, XLSX
// ==========================================

// 模块声明
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod import_orchestrator;
pub mod import_trait;
pub mod record_validator;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use field_mapper::FieldMapper as FieldMapperImpl;
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use import_orchestrator::ImportOrchestrator;
pub use record_validator::RecordValidator as RecordValidatorImpl;
pub use record_validator::ValidationResult;

// 重导出 Trait 接口
pub use import_trait::{DataImporter, FieldMapper, FileParser, ParsedFile, RecordValidator};
