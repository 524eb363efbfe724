// ==========================================
// TalentPatriot 导入引擎 - 导入 Repository 实现
// ==========================================
// 职责: 实现导入任务/行记录数据访问（使用 rusqlite）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::db::{ensure_schema, open_sqlite_connection};
use crate::domain::import::{
    DataImport, DataImportUpdate, FieldMapping, ImportRecord, NewDataImport, NewImportRecord,
};
use crate::domain::types::{EntityType, ImportStatus, RecordStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::import_repo::ImportStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

const IMPORT_COLUMNS: &str = "id, org_id, user_id, import_type, file_name, file_size, status, \
     total_records, successful_records, failed_records, field_mapping, error_summary, \
     processing_started_at, processing_completed_at, created_at";

const RECORD_COLUMNS: &str = "id, import_id, row_number, original_data, processed_data, status, \
     error_message, entity_id, entity_type, created_at";

// ==========================================
// 列解析辅助
// ==========================================

fn conversion_error(idx: usize, msg: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, msg.into())
}

fn parse_text_enum<T: FromStr<Err = String>>(row: &Row, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    T::from_str(&raw).map_err(|e| conversion_error(idx, e))
}

fn parse_timestamp(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, format!("invalid timestamp '{}': {}", raw, e)))
}

fn parse_optional_timestamp(row: &Row, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    match raw {
        Some(_) => parse_timestamp(row, idx).map(Some),
        None => Ok(None),
    }
}

fn parse_json<T: serde::de::DeserializeOwned>(row: &Row, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| conversion_error(idx, e.to_string()))
}

fn parse_optional_json<T: serde::de::DeserializeOwned>(
    row: &Row,
    idx: usize,
) -> rusqlite::Result<Option<T>> {
    let raw: Option<String> = row.get(idx)?;
    match raw {
        Some(_) => parse_json(row, idx).map(Some),
        None => Ok(None),
    }
}

fn map_import_row(row: &Row) -> rusqlite::Result<DataImport> {
    Ok(DataImport {
        id: row.get(0)?,
        org_id: row.get(1)?,
        user_id: row.get(2)?,
        import_type: row.get(3)?,
        file_name: row.get(4)?,
        file_size: row.get(5)?,
        status: parse_text_enum::<ImportStatus>(row, 6)?,
        total_records: row.get(7)?,
        successful_records: row.get(8)?,
        failed_records: row.get(9)?,
        field_mapping: parse_optional_json::<FieldMapping>(row, 10)?,
        error_summary: row.get(11)?,
        processing_started_at: parse_optional_timestamp(row, 12)?,
        processing_completed_at: parse_optional_timestamp(row, 13)?,
        created_at: parse_timestamp(row, 14)?,
    })
}

fn map_record_row(row: &Row) -> rusqlite::Result<ImportRecord> {
    Ok(ImportRecord {
        id: row.get(0)?,
        import_id: row.get(1)?,
        row_number: row.get(2)?,
        original_data: parse_json(row, 3)?,
        processed_data: parse_optional_json(row, 4)?,
        status: parse_text_enum::<RecordStatus>(row, 5)?,
        error_message: row.get(6)?,
        entity_id: row.get(7)?,
        entity_type: parse_text_enum::<EntityType>(row, 8)?,
        created_at: parse_timestamp(row, 9)?,
    })
}

fn field_mapping_to_text(mapping: &Option<FieldMapping>) -> RepositoryResult<Option<String>> {
    mapping
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(RepositoryError::from)
}

// ==========================================
// ImportRepositoryImpl
// ==========================================
pub struct ImportRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl ImportRepositoryImpl {
    /// 创建新的 Repository 实例（自动建表）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        ensure_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 共享已有连接（与 EntityRepositoryImpl / ConfigManager 共用）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn select_import(conn: &Connection, import_id: &str) -> RepositoryResult<Option<DataImport>> {
        let sql = format!("SELECT {} FROM data_imports WHERE id = ?1", IMPORT_COLUMNS);
        let found = conn
            .query_row(&sql, params![import_id], map_import_row)
            .optional()?;
        Ok(found)
    }
}

#[async_trait]
impl ImportStore for ImportRepositoryImpl {
    async fn create_import(&self, new_import: NewDataImport) -> RepositoryResult<DataImport> {
        let job = DataImport {
            id: Uuid::new_v4().to_string(),
            org_id: new_import.org_id,
            user_id: new_import.user_id,
            import_type: new_import.import_type,
            file_name: new_import.file_name,
            file_size: new_import.file_size,
            status: ImportStatus::Pending,
            total_records: 0,
            successful_records: 0,
            failed_records: 0,
            field_mapping: new_import.field_mapping,
            error_summary: None,
            processing_started_at: None,
            processing_completed_at: None,
            created_at: Utc::now(),
        };

        let mapping_text = field_mapping_to_text(&job.field_mapping)?;
        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO data_imports (
                id, org_id, user_id, import_type, file_name, file_size, status,
                total_records, successful_records, failed_records, field_mapping,
                error_summary, processing_started_at, processing_completed_at, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, 0, 0, ?8, NULL, NULL, NULL, ?9)
            "#,
            params![
                job.id,
                job.org_id,
                job.user_id,
                job.import_type,
                job.file_name,
                job.file_size,
                job.status.as_str(),
                mapping_text,
                job.created_at.to_rfc3339(),
            ],
        )?;

        Ok(job)
    }

    async fn get_import(&self, import_id: &str) -> RepositoryResult<Option<DataImport>> {
        let conn = self.lock()?;
        Self::select_import(&conn, import_id)
    }

    async fn update_import(
        &self,
        import_id: &str,
        update: DataImportUpdate,
    ) -> RepositoryResult<DataImport> {
        let conn = self.lock()?;
        let mut job =
            Self::select_import(&conn, import_id)?.ok_or_else(|| RepositoryError::NotFound {
                entity: "DataImport".to_string(),
                id: import_id.to_string(),
            })?;

        if let Some(next) = update.status {
            if !job.status.can_transition_to(next) {
                return Err(RepositoryError::InvalidStateTransition {
                    from: job.status.to_string(),
                    to: next.to_string(),
                });
            }
        }
        if let Some(total) = update.total_records {
            if total < job.total_records {
                return Err(RepositoryError::ValidationError(format!(
                    "total_records cannot decrease ({} -> {})",
                    job.total_records, total
                )));
            }
        }

        job.apply_update(&update);
        if !job.counters_consistent() {
            return Err(RepositoryError::ValidationError(format!(
                "successful_records ({}) + failed_records ({}) exceeds total_records ({})",
                job.successful_records, job.failed_records, job.total_records
            )));
        }

        conn.execute(
            r#"
            UPDATE data_imports SET
                status = ?2,
                total_records = ?3,
                successful_records = ?4,
                failed_records = ?5,
                error_summary = ?6,
                processing_started_at = ?7,
                processing_completed_at = ?8
            WHERE id = ?1
            "#,
            params![
                job.id,
                job.status.as_str(),
                job.total_records,
                job.successful_records,
                job.failed_records,
                job.error_summary,
                job.processing_started_at.map(|t| t.to_rfc3339()),
                job.processing_completed_at.map(|t| t.to_rfc3339()),
            ],
        )?;

        Ok(job)
    }

    async fn list_imports_by_org(
        &self,
        org_id: &str,
        limit: usize,
    ) -> RepositoryResult<Vec<DataImport>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM data_imports WHERE org_id = ?1 ORDER BY created_at DESC, rowid DESC LIMIT ?2",
            IMPORT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let jobs = stmt
            .query_map(params![org_id, limit as i64], map_import_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(jobs)
    }

    async fn create_import_record(&self, record: NewImportRecord) -> RepositoryResult<ImportRecord> {
        let created = ImportRecord {
            id: Uuid::new_v4().to_string(),
            import_id: record.import_id,
            row_number: record.row_number,
            original_data: record.original_data,
            processed_data: record.processed_data,
            status: record.status,
            error_message: record.error_message,
            entity_id: record.entity_id,
            entity_type: record.entity_type,
            created_at: Utc::now(),
        };

        let original_text = serde_json::to_string(&created.original_data)?;
        let processed_text = created
            .processed_data
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO import_records (
                id, import_id, row_number, original_data, processed_data, status,
                error_message, entity_id, entity_type, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                created.id,
                created.import_id,
                created.row_number,
                original_text,
                processed_text,
                created.status.as_str(),
                created.error_message,
                created.entity_id,
                created.entity_type.as_str(),
                created.created_at.to_rfc3339(),
            ],
        )?;

        Ok(created)
    }

    async fn list_import_records(
        &self,
        import_id: &str,
        status: Option<RecordStatus>,
    ) -> RepositoryResult<Vec<ImportRecord>> {
        let conn = self.lock()?;
        let records = match status {
            Some(status) => {
                let sql = format!(
                    "SELECT {} FROM import_records WHERE import_id = ?1 AND status = ?2 ORDER BY row_number ASC",
                    RECORD_COLUMNS
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params![import_id, status.as_str()], map_record_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let sql = format!(
                    "SELECT {} FROM import_records WHERE import_id = ?1 ORDER BY row_number ASC",
                    RECORD_COLUMNS
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params![import_id], map_record_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };
        Ok(records)
    }

    async fn count_import_records(&self, import_id: &str) -> RepositoryResult<i64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM import_records WHERE import_id = ?1",
            params![import_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
