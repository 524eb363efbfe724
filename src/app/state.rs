// ==========================================
// TalentPatriot 导入引擎 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::Arc;

use crate::api::{ApiResult, ImportApi};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "TALENTPATRIOT_DB_PATH";

/// 应用状态
///
/// 持有共享的 API 实例, 由宿主进程（CLI / 服务）创建一次
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 导入API
    pub import_api: Arc<ImportApi>,
}

impl AppState {
    /// 打开数据库并初始化所有 API
    pub fn new(db_path: String) -> ApiResult<Self> {
        tracing::info!(db_path = %db_path, "initializing app state");
        let import_api = Arc::new(ImportApi::new(&db_path)?);
        Ok(Self {
            db_path,
            import_api,
        })
    }
}

/// 默认数据库路径
///
/// 优先级: 环境变量 TALENTPATRIOT_DB_PATH > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./talentpatriot_import.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("talentpatriot");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("talentpatriot_import.db");
        }
    }

    path.to_string_lossy().to_string()
}
