// ==========================================
// TalentPatriot 导入引擎 - 导入产出实体
// ==========================================
// 职责: 候选人 / 职位的可插入载荷
// 红线: 仅由 RecordValidator 在校验通过后构造
// 对齐: candidates / jobs 表
// ==========================================

use crate::domain::types::{EmploymentType, JobPriority, JobStatus};
use serde::{Deserialize, Serialize};

// ==========================================
// NewCandidate - 待创建候选人
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCandidate {
    pub org_id: String,
    pub name: String, // 派生: "first last"
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub linkedin_url: Option<String>,
    pub portfolio_url: Option<String>,
    pub current_title: Option<String>,
    pub current_company: Option<String>,
    pub experience_years: Option<i32>,
    pub skills: Vec<String>,
    pub salary_expectation: Option<String>,
    pub notes: Option<String>,
    pub source: String,
}

// ==========================================
// NewJob - 待创建职位
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewJob {
    pub org_id: String,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub department: Option<String>,
    pub employment_type: EmploymentType,
    pub experience_level: Option<String>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub is_remote: bool,
    pub requirements: Vec<String>,
    pub status: JobStatus,
    pub priority: JobPriority,
}
