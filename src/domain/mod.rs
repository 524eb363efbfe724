// ==========================================
// TalentPatriot 导入引擎 - 领域模型层
// ==========================================
// 职责: 定义导入任务、行记录、产出实体与枚举类型
// 红线: 不含数据访问逻辑, 不含导入流程逻辑
// ==========================================

pub mod entity;
pub mod import;
pub mod types;

// 重导出核心类型
pub use entity::{NewCandidate, NewJob};
pub use import::{
    CellValue, DataImport, DataImportUpdate, FieldMapping, ImportOutcome, ImportRecord,
    NewDataImport, NewImportRecord, RawRow,
};
pub use types::{
    EmploymentType, EntityType, ImportStatus, ImportType, JobPriority, JobStatus, RecordStatus,
};
