// ==========================================
// TalentPatriot 导入引擎 - 导入 Repository Trait
// ==========================================
// 职责: 定义导入任务/行记录数据访问接口（不包含业务逻辑）
// 红线: Repository 不含导入流程规则, 只做数据 CRUD
// ==========================================

use crate::domain::entity::{NewCandidate, NewJob};
use crate::domain::import::{
    DataImport, DataImportUpdate, ImportRecord, NewDataImport, NewImportRecord,
};
use crate::domain::types::RecordStatus;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// ImportStore Trait
// ==========================================
// 用途: DataImport / ImportRecord 持久化
// 实现者: ImportRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait ImportStore: Send + Sync {
    // ===== 导入任务 =====

    /// 创建导入任务（pending 状态）
    async fn create_import(&self, new_import: NewDataImport) -> RepositoryResult<DataImport>;

    /// 按 ID 查询导入任务
    async fn get_import(&self, import_id: &str) -> RepositoryResult<Option<DataImport>>;

    /// 增量更新导入任务
    ///
    /// # 返回
    /// - Ok(DataImport): 更新后的任务
    /// - Err(NotFound): 任务不存在
    /// - Err(InvalidStateTransition): 非法状态迁移
    /// - Err(ValidationError): 计数不变量被破坏
    async fn update_import(
        &self,
        import_id: &str,
        update: DataImportUpdate,
    ) -> RepositoryResult<DataImport>;

    /// 查询组织的导入历史（按创建时间倒序）
    async fn list_imports_by_org(
        &self,
        org_id: &str,
        limit: usize,
    ) -> RepositoryResult<Vec<DataImport>>;

    // ===== 行记录 =====

    /// 创建行记录（创建后不可变）
    async fn create_import_record(&self, record: NewImportRecord) -> RepositoryResult<ImportRecord>;

    /// 查询导入任务的行记录（按行号升序, 可按状态过滤）
    async fn list_import_records(
        &self,
        import_id: &str,
        status: Option<RecordStatus>,
    ) -> RepositoryResult<Vec<ImportRecord>>;

    /// 统计导入任务的行记录数
    async fn count_import_records(&self, import_id: &str) -> RepositoryResult<i64>;
}

// ==========================================
// EntityStore Trait
// ==========================================
// 用途: 导入产出实体的创建（外部协作方）
// 实现者: EntityRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// 创建候选人, 返回生成的 ID
    async fn create_candidate(&self, candidate: &NewCandidate) -> RepositoryResult<String>;

    /// 创建职位, 返回生成的 ID
    async fn create_job(&self, job: &NewJob) -> RepositoryResult<String>;
}
