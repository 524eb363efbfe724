// ==========================================
// TalentPatriot 导入引擎 - 导入编排器
// ==========================================
// 职责: 驱动一个导入任务从 pending 到终态
// 流程: 标记处理中 → 解析 → 分批(映射 → 校验 → 创建实体 → 写行记录) → 终态
// 红线: 行级失败只写入该行记录, 不终止任务
// 红线: 任何致命错误都在本层收敛为 ImportOutcome, 不向上抛出
// ==========================================

use crate::config::config_manager::DEFAULT_BATCH_SIZE;
use crate::config::ImportConfigReader;
use crate::domain::import::{DataImport, DataImportUpdate, ImportOutcome, NewImportRecord, RawRow};
use crate::domain::types::{ImportStatus, ImportType};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::FieldMapper as FieldMapperImpl;
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::import_trait::{DataImporter, FieldMapper, RecordValidator};
use crate::importer::record_validator::RecordValidator as RecordValidatorImpl;
use crate::repository::error::RepositoryError;
use crate::repository::import_repo::{EntityStore, ImportStore};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

/// 单行成功落库后的产出
struct CreatedEntity {
    entity_id: String,
    processed_data: Value,
}

// ==========================================
// ImportOrchestrator - 导入编排器
// ==========================================
pub struct ImportOrchestrator<S, E, C>
where
    S: ImportStore,
    E: EntityStore,
    C: ImportConfigReader,
{
    // 数据访问层
    import_store: S,
    entity_store: E,

    // 配置读取器
    config: C,

    // 导入组件
    file_parser: UniversalFileParser,
    field_mapper: Box<dyn FieldMapper>,
    record_validator: Box<dyn RecordValidator>,
}

impl<S, E, C> ImportOrchestrator<S, E, C>
where
    S: ImportStore,
    E: EntityStore,
    C: ImportConfigReader,
{
    /// 使用默认映射器/校验器创建编排器
    pub fn new(import_store: S, entity_store: E, config: C) -> Self {
        Self::with_components(
            import_store,
            entity_store,
            config,
            Box::new(FieldMapperImpl),
            Box::new(RecordValidatorImpl),
        )
    }

    /// 注入自定义组件
    pub fn with_components(
        import_store: S,
        entity_store: E,
        config: C,
        field_mapper: Box<dyn FieldMapper>,
        record_validator: Box<dyn RecordValidator>,
    ) -> Self {
        Self {
            import_store,
            entity_store,
            config,
            file_parser: UniversalFileParser,
            field_mapper,
            record_validator,
        }
    }

    pub fn import_store(&self) -> &S {
        &self.import_store
    }

    pub fn entity_store(&self) -> &E {
        &self.entity_store
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    pub fn file_parser(&self) -> &UniversalFileParser {
        &self.file_parser
    }

    pub fn field_mapper(&self) -> &dyn FieldMapper {
        self.field_mapper.as_ref()
    }

    async fn batch_size(&self) -> usize {
        match self.config.get_batch_size().await {
            Ok(size) if size > 0 => size,
            Ok(_) => DEFAULT_BATCH_SIZE,
            Err(e) => {
                warn!(error = %e, "failed to read batch size, using default");
                DEFAULT_BATCH_SIZE
            }
        }
    }

    /// 主流程（致命错误以 Err 返回, 由 process_import 收敛）
    async fn run(
        &self,
        job: &DataImport,
        file_content: &[u8],
        file_name: &str,
    ) -> ImportResult<ImportOutcome> {
        if job.status != ImportStatus::Pending {
            return Err(ImportError::NotPending(job.status));
        }

        // 存储层拒绝重复进入 processing（快照过期或并发执行）
        let started = self
            .import_store
            .update_import(
                &job.id,
                DataImportUpdate::default()
                    .status(ImportStatus::Processing)
                    .started_at(Utc::now()),
            )
            .await
            .map_err(|e| match e {
                RepositoryError::InvalidStateTransition { from, .. } => {
                    ImportError::NotPending(from.parse().unwrap_or(ImportStatus::Processing))
                }
                other => ImportError::Store(other),
            })?;
        debug!(status = %started.status, "import marked processing");

        let import_type: ImportType = job
            .import_type
            .parse()
            .map_err(|_| ImportError::UnknownImportType(job.import_type.clone()))?;

        let parsed = self.file_parser.parse(file_content, file_name)?;
        if parsed.rows.is_empty() {
            return Err(ImportError::EmptyFile);
        }

        let total = parsed.rows.len() as i64;
        self.import_store
            .update_import(&job.id, DataImportUpdate::default().total_records(total))
            .await?;
        info!(total_records = total, headers = parsed.headers.len(), "file parsed");

        let batch_size = self.batch_size().await;
        let mut successful: i64 = 0;
        let mut failed: i64 = 0;
        let mut row_number: i64 = 0;

        for (batch_idx, batch) in parsed.rows.chunks(batch_size).enumerate() {
            for row in batch {
                row_number += 1;
                if self.process_row(job, import_type, row_number, row).await? {
                    successful += 1;
                } else {
                    failed += 1;
                }
            }

            self.import_store
                .update_import(&job.id, DataImportUpdate::default().counters(successful, failed))
                .await?;
            debug!(
                batch = batch_idx + 1,
                successful_records = successful,
                failed_records = failed,
                "batch processed"
            );
        }

        let final_status = if successful == 0 && failed > 0 {
            ImportStatus::Failed
        } else {
            ImportStatus::Completed
        };

        let mut update = DataImportUpdate::default()
            .status(final_status)
            .completed_at(Utc::now());
        if failed > 0 {
            update = update.error_summary(format!("{} records failed to import", failed));
        }
        let finished = self.import_store.update_import(&job.id, update).await?;

        info!(
            status = %finished.status,
            total_records = finished.total_records,
            successful_records = finished.successful_records,
            failed_records = finished.failed_records,
            "import finished"
        );

        Ok(ImportOutcome {
            success: finished.status == ImportStatus::Completed,
            message: format!(
                "Import completed. {} records imported successfully, {} failed.",
                successful, failed
            ),
            status: finished.status,
            total_records: finished.total_records,
            successful_records: finished.successful_records,
            failed_records: finished.failed_records,
        })
    }

    /// 处理单行并写入行记录
    ///
    /// # 返回
    /// - Ok(true): 行成功
    /// - Ok(false): 行失败（已记录）
    /// - Err: 行记录写入失败（致命）
    async fn process_row(
        &self,
        job: &DataImport,
        import_type: ImportType,
        row_number: i64,
        row: &RawRow,
    ) -> ImportResult<bool> {
        let original_data = serde_json::to_value(row)?;
        let mapped = self
            .field_mapper
            .map_row(row, import_type, job.field_mapping.as_ref());
        let entity_type = import_type.entity_type();

        let record = match self.create_entity(job, import_type, &mapped).await {
            Ok(created) => NewImportRecord::success(
                &job.id,
                row_number,
                original_data,
                created.processed_data,
                created.entity_id,
                entity_type,
            ),
            Err(message) => {
                debug!(row_number = row_number, error = %message, "row rejected");
                NewImportRecord::failed(&job.id, row_number, original_data, message, entity_type)
            }
        };

        let succeeded = record.entity_id.is_some();
        self.import_store.create_import_record(record).await?;
        Ok(succeeded)
    }

    /// 校验并创建实体; 失败时返回写入行记录的错误信息
    async fn create_entity(
        &self,
        job: &DataImport,
        import_type: ImportType,
        mapped: &RawRow,
    ) -> Result<CreatedEntity, String> {
        match import_type {
            ImportType::Candidates => {
                let candidate = self
                    .record_validator
                    .validate_candidate(mapped, &job.org_id)
                    .into_result()
                    .map_err(|errors| errors.join("; "))?;
                let processed_data = serde_json::to_value(&candidate).map_err(|e| e.to_string())?;
                let entity_id = self
                    .entity_store
                    .create_candidate(&candidate)
                    .await
                    .map_err(|e| ImportError::RowPersistence(e.to_string()).to_string())?;
                Ok(CreatedEntity {
                    entity_id,
                    processed_data,
                })
            }
            ImportType::Jobs => {
                let new_job = self
                    .record_validator
                    .validate_job(mapped, &job.org_id)
                    .into_result()
                    .map_err(|errors| errors.join("; "))?;
                let processed_data = serde_json::to_value(&new_job).map_err(|e| e.to_string())?;
                let entity_id = self
                    .entity_store
                    .create_job(&new_job)
                    .await
                    .map_err(|e| ImportError::RowPersistence(e.to_string()).to_string())?;
                Ok(CreatedEntity {
                    entity_id,
                    processed_data,
                })
            }
        }
    }

    /// 致命错误收敛: 标记任务失败并返回结构化结果
    async fn fail_job(&self, job: &DataImport, err: &ImportError) -> ImportOutcome {
        let message = err.to_string();
        error!(error = %message, fatal = err.is_fatal(), "import aborted");

        let update = DataImportUpdate::default()
            .status(ImportStatus::Failed)
            .error_summary(message.clone())
            .completed_at(Utc::now());

        match self.import_store.update_import(&job.id, update).await {
            Ok(failed_job) => ImportOutcome {
                success: false,
                message,
                status: ImportStatus::Failed,
                total_records: failed_job.total_records,
                successful_records: failed_job.successful_records,
                failed_records: failed_job.failed_records,
            },
            Err(store_err) => {
                error!(error = %store_err, "failed to mark import as failed");
                ImportOutcome::fatal(message)
            }
        }
    }
}

#[async_trait]
impl<S, E, C> DataImporter for ImportOrchestrator<S, E, C>
where
    S: ImportStore,
    E: EntityStore,
    C: ImportConfigReader,
{
    #[instrument(skip(self, job, file_content), fields(import_id = %job.id, org_id = %job.org_id))]
    async fn process_import(
        &self,
        job: &DataImport,
        file_content: &[u8],
        file_name: &str,
    ) -> ImportOutcome {
        info!(
            import_type = %job.import_type,
            file_size = file_content.len(),
            "starting import"
        );

        match self.run(job, file_content, file_name).await {
            Ok(outcome) => outcome,
            // 任务已被其他执行占用或已结束: 不改动任务状态
            Err(ImportError::NotPending(status)) => {
                warn!(status = %status, "import rejected");
                ImportOutcome {
                    status,
                    total_records: job.total_records,
                    successful_records: job.successful_records,
                    failed_records: job.failed_records,
                    ..ImportOutcome::fatal(ImportError::NotPending(status).to_string())
                }
            }
            Err(e) => self.fail_job(job, &e).await,
        }
    }
}
