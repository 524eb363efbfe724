// ==========================================
// 记录型 ImportStore - 用于观察编排器的中间状态
// ==========================================
// 包装 SQLite 实现, 记录每次 update_import 后的任务快照;
// 可配置在第 N 条行记录写入时失败
// ==========================================

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use talentpatriot_import::domain::import::{
    DataImport, DataImportUpdate, ImportRecord, NewDataImport, NewImportRecord,
};
use talentpatriot_import::domain::types::RecordStatus;
use talentpatriot_import::repository::{
    ImportRepositoryImpl, ImportStore, RepositoryError, RepositoryResult,
};

pub struct RecordingImportStore {
    inner: ImportRepositoryImpl,
    snapshots: Arc<Mutex<Vec<DataImport>>>,
    records_written: AtomicUsize,
    fail_on_record: Option<usize>,
}

impl RecordingImportStore {
    pub fn new(inner: ImportRepositoryImpl) -> Self {
        Self {
            inner,
            snapshots: Arc::new(Mutex::new(Vec::new())),
            records_written: AtomicUsize::new(0),
            fail_on_record: None,
        }
    }

    /// 第 n 条（1 起）行记录写入时返回错误
    pub fn failing_on_record(inner: ImportRepositoryImpl, n: usize) -> Self {
        Self {
            fail_on_record: Some(n),
            ..Self::new(inner)
        }
    }

    /// 所有 update_import 之后的任务快照（按调用顺序）
    pub fn snapshots(&self) -> Vec<DataImport> {
        self.snapshots.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImportStore for RecordingImportStore {
    async fn create_import(&self, new_import: NewDataImport) -> RepositoryResult<DataImport> {
        self.inner.create_import(new_import).await
    }

    async fn get_import(&self, import_id: &str) -> RepositoryResult<Option<DataImport>> {
        self.inner.get_import(import_id).await
    }

    async fn update_import(
        &self,
        import_id: &str,
        update: DataImportUpdate,
    ) -> RepositoryResult<DataImport> {
        let updated = self.inner.update_import(import_id, update).await?;
        self.snapshots.lock().unwrap().push(updated.clone());
        Ok(updated)
    }

    async fn list_imports_by_org(
        &self,
        org_id: &str,
        limit: usize,
    ) -> RepositoryResult<Vec<DataImport>> {
        self.inner.list_imports_by_org(org_id, limit).await
    }

    async fn create_import_record(&self, record: NewImportRecord) -> RepositoryResult<ImportRecord> {
        let n = self.records_written.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_record == Some(n) {
            return Err(RepositoryError::DatabaseQueryError(
                "disk I/O error".to_string(),
            ));
        }
        self.inner.create_import_record(record).await
    }

    async fn list_import_records(
        &self,
        import_id: &str,
        status: Option<RecordStatus>,
    ) -> RepositoryResult<Vec<ImportRecord>> {
        self.inner.list_import_records(import_id, status).await
    }

    async fn count_import_records(&self, import_id: &str) -> RepositoryResult<i64> {
        self.inner.count_import_records(import_id).await
    }
}
