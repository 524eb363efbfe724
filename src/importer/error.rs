// ==========================================
// TalentPatriot 导入引擎 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分类: 致命错误（终止整个任务） / 行级错误（记录后继续）
// ==========================================

use crate::domain::types::ImportStatus;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 致命: 文件相关 =====
    #[error("Unsupported file format: {0}. Only .csv, .xls and .xlsx files are supported")]
    UnsupportedFormat(String),

    #[error("Failed to parse file: {0}")]
    Parse(String),

    #[error("File contains no data rows")]
    EmptyFile,

    // ===== 致命: 任务相关 =====
    #[error("Unknown import type: {0}")]
    UnknownImportType(String),

    #[error("Import is already {0}; only pending imports can be processed")]
    NotPending(ImportStatus),

    // ===== 行级: 实体创建失败 =====
    #[error("{0}")]
    RowPersistence(String),

    // ===== 致命: 任务/行记录状态写入失败 =====
    #[error("Import store failure: {0}")]
    Store(#[from] RepositoryError),

    // ===== 通用错误 =====
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ImportError {
    /// 是否为致命错误（终止整个导入任务）
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ImportError::RowPersistence(_))
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::Parse(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::Parse(err.to_string())
    }
}

// 实现 From<serde_json::Error>
impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::Internal(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ImportError::UnsupportedFormat("txt".to_string());
        assert!(err.to_string().starts_with("Unsupported file format"));
        assert!(err.is_fatal());

        let row = ImportError::RowPersistence("duplicate email".to_string());
        assert_eq!(row.to_string(), "duplicate email");
        assert!(!row.is_fatal());
    }
}
