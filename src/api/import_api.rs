// ==========================================
// TalentPatriot 导入引擎 - 导入API
// ==========================================
// 职责: 封装导入任务的创建、预览、执行与查询
// 约束: 所有查询均按 org_id 隔离
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, ImportConfigReader};
use crate::db::{ensure_schema, open_sqlite_connection};
use crate::domain::import::{DataImport, FieldMapping, ImportOutcome, ImportRecord, NewDataImport, RawRow};
use crate::domain::types::{ImportStatus, ImportType, RecordStatus};
use crate::importer::{DataImporter, ImportOrchestrator};
use crate::repository::{EntityRepositoryImpl, ImportRepositoryImpl, ImportStore};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{error, info};

/// 历史查询单页上限
const MAX_LIST_LIMIT: usize = 100;

type SqliteOrchestrator =
    ImportOrchestrator<ImportRepositoryImpl, EntityRepositoryImpl, ConfigManager>;

/// 导入预览响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportPreview {
    /// 源列名（列顺序）
    pub headers: Vec<String>,
    /// 自动识别的列映射
    pub suggested_mappings: FieldMapping,
    /// 映射后的样例行
    pub sample_rows: Vec<RawRow>,
    /// 数据行总数
    pub total_rows: usize,
}

/// 批量执行的单个上传
#[derive(Debug, Clone)]
pub struct ImportUpload {
    pub import_id: String,
    pub file_name: String,
    pub content: Vec<u8>,
}

/// 导入API
pub struct ImportApi {
    orchestrator: SqliteOrchestrator,
}

impl ImportApi {
    /// 打开数据库并初始化表结构
    pub fn new(db_path: &str) -> ApiResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .and_then(|conn| ensure_schema(&conn).map(|_| conn))
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    /// 共享已有连接（连接需已建表）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ApiResult<Self> {
        let config = ConfigManager::from_connection(conn.clone())
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
        let orchestrator = ImportOrchestrator::new(
            ImportRepositoryImpl::from_connection(conn.clone()),
            EntityRepositoryImpl::from_connection(conn),
            config,
        );
        Ok(Self { orchestrator })
    }

    pub fn config(&self) -> &ConfigManager {
        self.orchestrator.config()
    }

    pub fn entities(&self) -> &EntityRepositoryImpl {
        self.orchestrator.entity_store()
    }

    fn store(&self) -> &ImportRepositoryImpl {
        self.orchestrator.import_store()
    }

    async fn max_file_size(&self) -> ApiResult<u64> {
        self.config()
            .get_max_file_size_bytes()
            .await
            .map_err(|e| ApiError::InternalError(e.to_string()))
    }

    fn parse_import_type(import_type: &str) -> ApiResult<ImportType> {
        import_type
            .parse()
            .map_err(|_| ApiError::InvalidInput(format!("unknown import type: {}", import_type)))
    }

    /// 创建导入任务（pending）
    ///
    /// # 返回
    /// - Ok(DataImport): 新任务
    /// - Err(InvalidInput): 未知导入类型 / 空文件名 / 文件超限
    pub async fn create_import(
        &self,
        org_id: &str,
        user_id: &str,
        import_type: &str,
        file_name: &str,
        file_size: u64,
        field_mapping: Option<FieldMapping>,
    ) -> ApiResult<DataImport> {
        if org_id.trim().is_empty() || user_id.trim().is_empty() {
            return Err(ApiError::InvalidInput(
                "org_id and user_id are required".to_string(),
            ));
        }
        let import_type = Self::parse_import_type(import_type)?;
        if file_name.trim().is_empty() {
            return Err(ApiError::InvalidInput("file name is required".to_string()));
        }
        let max_size = self.max_file_size().await?;
        if file_size > max_size {
            return Err(ApiError::InvalidInput(format!(
                "file size {} exceeds the {} byte limit",
                file_size, max_size
            )));
        }

        let job = self
            .store()
            .create_import(NewDataImport {
                org_id: org_id.to_string(),
                user_id: user_id.to_string(),
                import_type: import_type.as_str().to_string(),
                file_name: file_name.to_string(),
                file_size: file_size as i64,
                field_mapping,
            })
            .await?;

        info!(import_id = %job.id, org_id = %org_id, import_type = %import_type, "import created");
        Ok(job)
    }

    /// 预览上传文件（不落库）
    pub async fn preview(
        &self,
        content: &[u8],
        file_name: &str,
        import_type: &str,
    ) -> ApiResult<ImportPreview> {
        let import_type = Self::parse_import_type(import_type)?;
        let parsed = self.orchestrator.file_parser().parse(content, file_name)?;
        let sample_size = self
            .config()
            .get_preview_rows()
            .await
            .map_err(|e| ApiError::InternalError(e.to_string()))?;

        let mapper = self.orchestrator.field_mapper();
        let suggested_mappings = mapper.suggested_mappings(&parsed.headers, import_type);
        let sample_rows = parsed
            .rows
            .iter()
            .take(sample_size)
            .map(|row| mapper.map_row(row, import_type, None))
            .collect();

        Ok(ImportPreview {
            total_rows: parsed.rows.len(),
            headers: parsed.headers,
            suggested_mappings,
            sample_rows,
        })
    }

    /// 执行导入任务
    ///
    /// # 说明
    /// 仅 pending 状态且属于该组织的任务可执行; 执行过程中的失败体现在 ImportOutcome 中
    pub async fn run_import(
        &self,
        org_id: &str,
        import_id: &str,
        content: &[u8],
        file_name: &str,
    ) -> ApiResult<ImportOutcome> {
        let job = self.get_import(org_id, import_id).await?;
        if job.status != ImportStatus::Pending {
            return Err(ApiError::InvalidStateTransition {
                from: job.status.to_string(),
                to: ImportStatus::Processing.to_string(),
            });
        }

        let max_size = self.max_file_size().await?;
        if content.len() as u64 > max_size {
            return Err(ApiError::InvalidInput(format!(
                "file size {} exceeds the {} byte limit",
                content.len(),
                max_size
            )));
        }

        Ok(self.orchestrator.process_import(&job, content, file_name).await)
    }

    /// 并发执行多个导入任务（各任务互不影响）
    pub async fn run_imports(
        &self,
        org_id: &str,
        uploads: Vec<ImportUpload>,
    ) -> Vec<ApiResult<ImportOutcome>> {
        use futures::future::join_all;

        info!(count = uploads.len(), "running imports");

        let tasks = uploads.iter().map(|upload| async move {
            let result = self
                .run_import(org_id, &upload.import_id, &upload.content, &upload.file_name)
                .await;
            if let Err(e) = &result {
                error!(import_id = %upload.import_id, error = %e, "import could not run");
            }
            result
        });

        let results = join_all(tasks).await;

        info!(
            total = results.len(),
            completed = results
                .iter()
                .filter(|r| matches!(r, Ok(outcome) if outcome.success))
                .count(),
            "imports finished"
        );

        results
    }

    /// 导入历史（按创建时间倒序, limit 限制在 1-100）
    pub async fn list_imports(&self, org_id: &str, limit: usize) -> ApiResult<Vec<DataImport>> {
        let limit = limit.clamp(1, MAX_LIST_LIMIT);
        Ok(self.store().list_imports_by_org(org_id, limit).await?)
    }

    /// 查询单个导入任务（跨组织访问视为不存在）
    pub async fn get_import(&self, org_id: &str, import_id: &str) -> ApiResult<DataImport> {
        match self.store().get_import(import_id).await? {
            Some(job) if job.org_id == org_id => Ok(job),
            _ => Err(ApiError::NotFound(format!("DataImport (id={})", import_id))),
        }
    }

    /// 查询导入任务的行记录
    ///
    /// # 参数
    /// - status: 可选过滤（success / failed）
    pub async fn list_import_records(
        &self,
        org_id: &str,
        import_id: &str,
        status: Option<&str>,
    ) -> ApiResult<Vec<ImportRecord>> {
        let status = status
            .map(|s| {
                s.parse::<RecordStatus>().map_err(|_| {
                    ApiError::InvalidInput(format!(
                        "invalid record status: {}, expected success/failed",
                        s
                    ))
                })
            })
            .transpose()?;

        let job = self.get_import(org_id, import_id).await?;
        Ok(self.store().list_import_records(&job.id, status).await?)
    }

    /// 自动识别的列映射
    pub fn suggested_mappings(
        &self,
        headers: &[String],
        import_type: &str,
    ) -> ApiResult<FieldMapping> {
        let import_type = Self::parse_import_type(import_type)?;
        Ok(self
            .orchestrator
            .field_mapper()
            .suggested_mappings(headers, import_type))
    }
}
