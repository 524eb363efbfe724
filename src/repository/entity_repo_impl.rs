// ==========================================
// TalentPatriot 导入引擎 - 实体 Repository 实现
// ==========================================
// 职责: 候选人 / 职位落库（使用 rusqlite）
// 约束: candidates 表 (org_id, email) 唯一
// ==========================================

use crate::db::{ensure_schema, open_sqlite_connection};
use crate::domain::entity::{NewCandidate, NewJob};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::import_repo::EntityStore;
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

pub struct EntityRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl EntityRepositoryImpl {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        ensure_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 统计组织下的候选人数
    pub fn count_candidates(&self, org_id: &str) -> RepositoryResult<i64> {
        let conn = self.lock()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM candidates WHERE org_id = ?1",
            params![org_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// 统计组织下的职位数
    pub fn count_jobs(&self, org_id: &str) -> RepositoryResult<i64> {
        let conn = self.lock()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM jobs WHERE org_id = ?1",
            params![org_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

#[async_trait]
impl EntityStore for EntityRepositoryImpl {
    async fn create_candidate(&self, candidate: &NewCandidate) -> RepositoryResult<String> {
        let id = Uuid::new_v4().to_string();
        let skills = serde_json::to_string(&candidate.skills)?;

        let conn = self.lock()?;
        let result = conn.execute(
            r#"
            INSERT INTO candidates (
                id, org_id, name, first_name, last_name, email, phone, location,
                linkedin_url, portfolio_url, current_title, current_company,
                experience_years, skills, salary_expectation, notes, source, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
            "#,
            params![
                id,
                candidate.org_id,
                candidate.name,
                candidate.first_name,
                candidate.last_name,
                candidate.email,
                candidate.phone,
                candidate.location,
                candidate.linkedin_url,
                candidate.portfolio_url,
                candidate.current_title,
                candidate.current_company,
                candidate.experience_years,
                skills,
                candidate.salary_expectation,
                candidate.notes,
                candidate.source,
                Utc::now().to_rfc3339(),
            ],
        );

        match result {
            Ok(_) => Ok(id),
            Err(e) => match RepositoryError::from(e) {
                RepositoryError::UniqueConstraintViolation(_) => {
                    Err(RepositoryError::UniqueConstraintViolation(format!(
                        "a candidate with email {} already exists",
                        candidate.email
                    )))
                }
                other => Err(other),
            },
        }
    }

    async fn create_job(&self, job: &NewJob) -> RepositoryResult<String> {
        let id = Uuid::new_v4().to_string();
        let requirements = serde_json::to_string(&job.requirements)?;

        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO jobs (
                id, org_id, title, description, location, department, employment_type,
                experience_level, salary_min, salary_max, is_remote, requirements,
                status, priority, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
            params![
                id,
                job.org_id,
                job.title,
                job.description,
                job.location,
                job.department,
                job.employment_type.as_str(),
                job.experience_level,
                job.salary_min,
                job.salary_max,
                job.is_remote,
                requirements,
                job.status.as_str(),
                job.priority.as_str(),
                Utc::now().to_rfc3339(),
            ],
        )?;

        Ok(id)
    }
}
