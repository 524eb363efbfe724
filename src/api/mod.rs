// ==========================================
// TalentPatriot 导入引擎 - API 层
// ==========================================
// 职责: 对外业务接口（CLI / 宿主服务调用）
// ==========================================

pub mod error;
pub mod import_api;

pub use error::{ApiError, ApiResult};
pub use import_api::{ImportApi, ImportPreview, ImportUpload};
