// ==========================================
// TalentPatriot 导入引擎 - 行记录校验器实现
// ==========================================
// 职责: 规范化行 → 可插入实体 或 错误列表
// 两级校验:
//   1. 业务规则（必填/格式/默认值）
//   2. Schema 校验（字段级, 最终关口, 仅在规则通过后执行）
// 红线: 校验结果只依赖输入行与 org_id（无时间/随机依赖）
// ==========================================

use crate::domain::entity::{NewCandidate, NewJob};
use crate::domain::import::{CellValue, RawRow};
use crate::domain::types::{EmploymentType, JobPriority, JobStatus};
use crate::importer::import_trait::RecordValidator as RecordValidatorTrait;
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;
use url::Url;

/// 默认候选人来源
pub const DEFAULT_CANDIDATE_SOURCE: &str = "import";

/// 远程办公真值标记（大小写不敏感）
const REMOTE_TRUTHY_TOKENS: [&str; 4] = ["true", "yes", "1", "remote"];

const MAX_SHORT_TEXT: usize = 255;
const MAX_NOTES: usize = 5000;
const MAX_EXPERIENCE_YEARS: i64 = 80;

// ==========================================
// ValidationResult - 校验结果
// ==========================================
// 红线: data 存在 ⇔ is_valid ⇔ errors 为空
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult<T> {
    is_valid: bool,
    data: Option<T>,
    errors: Vec<String>,
}

impl<T> ValidationResult<T> {
    pub fn valid(data: T) -> Self {
        Self {
            is_valid: true,
            data: Some(data),
            errors: Vec::new(),
        }
    }

    pub fn invalid(mut errors: Vec<String>) -> Self {
        if errors.is_empty() {
            errors.push("Validation failed".to_string());
        }
        Self {
            is_valid: false,
            data: None,
            errors,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn into_result(self) -> Result<T, Vec<String>> {
        match self.data {
            Some(data) if self.is_valid => Ok(data),
            _ => Err(self.errors),
        }
    }
}

// ==========================================
// 字段提取辅助函数
// ==========================================

/// 文本字段（空白视为缺失）
fn text_field(row: &RawRow, key: &str) -> Option<String> {
    row.get(key)
        .map(CellValue::as_text)
        .filter(|v| !v.is_empty())
}

/// 列表字段: 文本按逗号拆分并 TRIM; 布尔等其他类型视为空列表
fn list_field(row: &RawRow, key: &str) -> Vec<String> {
    match row.get(key) {
        Some(cell @ (CellValue::Text(_) | CellValue::Number(_))) => cell
            .as_text()
            .split(',')
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

/// 远程办公标记
fn remote_flag(row: &RawRow, key: &str) -> bool {
    match row.get(key) {
        Some(CellValue::Bool(b)) => *b,
        Some(CellValue::Number(n)) => *n == 1.0,
        Some(CellValue::Text(t)) => {
            let lowered = t.trim().to_lowercase();
            REMOTE_TRUTHY_TOKENS.contains(&lowered.as_str())
        }
        None => false,
    }
}

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN).expect("valid regex"));

/// 标准邮箱格式: ^[^\s@]+@[^\s@]+\.[^\s@]+$
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// 绝对 http(s) URL
fn is_valid_url(value: &str) -> bool {
    match Url::parse(value) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https") && parsed.host().is_some(),
        Err(_) => false,
    }
}

/// 枚举文本规范化: 小写, 空白/下划线/连字符统一为指定分隔符
fn normalize_enum_text(value: &str, separator: char) -> String {
    value
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_whitespace() || c == '_' || c == '-' {
                separator
            } else {
                c
            }
        })
        .collect()
}

// ==========================================
// Schema 校验
// ==========================================

/// 字段级违规（path: message）
#[derive(Debug, Default)]
struct SchemaViolations(Vec<String>);

impl SchemaViolations {
    fn push(&mut self, path: &str, message: impl AsRef<str>) {
        self.0.push(format!("{}: {}", path, message.as_ref()));
    }

    fn check_len(&mut self, path: &str, value: Option<&str>, max: usize) {
        if let Some(v) = value {
            if v.chars().count() > max {
                self.push(path, format!("String must contain at most {} character(s)", max));
            }
        }
    }

    fn into_errors(self) -> Vec<String> {
        self.0
    }
}

fn enum_expectation(options: &[&str], received: &str) -> String {
    let expected = options
        .iter()
        .map(|o| format!("'{}'", o))
        .collect::<Vec<_>>()
        .join(" | ");
    format!("Invalid enum value. Expected {}, received '{}'", expected, received)
}

/// 候选人草稿（规则通过后、Schema 校验前）
#[derive(Debug, Clone)]
struct CandidateDraft {
    org_id: String,
    first_name: Option<String>,
    last_name: Option<String>,
    email: String,
    phone: Option<String>,
    location: Option<String>,
    linkedin_url: Option<String>,
    portfolio_url: Option<String>,
    current_title: Option<String>,
    current_company: Option<String>,
    experience_years: Option<CellValue>,
    skills: Vec<String>,
    salary_expectation: Option<String>,
    notes: Option<String>,
    source: String,
}

impl CandidateDraft {
    fn into_candidate(self) -> Result<NewCandidate, Vec<String>> {
        let mut v = SchemaViolations::default();

        if self.org_id.trim().is_empty() {
            v.push("orgId", "Required");
        }

        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        if name.is_empty() {
            v.push("name", "String must contain at least 1 character(s)");
        }
        v.check_len("name", Some(&name), MAX_SHORT_TEXT);

        if !is_valid_email(&self.email) {
            v.push("email", "Invalid email");
        }
        v.check_len("email", Some(&self.email), MAX_SHORT_TEXT);
        v.check_len("phone", self.phone.as_deref(), 50);
        v.check_len("location", self.location.as_deref(), MAX_SHORT_TEXT);
        v.check_len("currentTitle", self.current_title.as_deref(), MAX_SHORT_TEXT);
        v.check_len("currentCompany", self.current_company.as_deref(), MAX_SHORT_TEXT);
        v.check_len("salaryExpectation", self.salary_expectation.as_deref(), 100);
        v.check_len("notes", self.notes.as_deref(), MAX_NOTES);
        v.check_len("source", Some(&self.source), 100);

        for (path, url) in [
            ("linkedinUrl", &self.linkedin_url),
            ("portfolioUrl", &self.portfolio_url),
        ] {
            if let Some(u) = url {
                if !is_valid_url(u) {
                    v.push(path, "Invalid url");
                }
            }
        }

        for (idx, skill) in self.skills.iter().enumerate() {
            if skill.chars().count() > 100 {
                v.push(
                    &format!("skills.{}", idx),
                    "String must contain at most 100 character(s)",
                );
            }
        }

        let experience_years = match &self.experience_years {
            None => None,
            Some(cell) => match cell.as_f64() {
                Some(n) if n.fract() == 0.0 && (0.0..=MAX_EXPERIENCE_YEARS as f64).contains(&n) => {
                    Some(n as i32)
                }
                Some(_) => {
                    v.push(
                        "experienceYears",
                        format!("Expected a whole number between 0 and {}", MAX_EXPERIENCE_YEARS),
                    );
                    None
                }
                None => {
                    v.push(
                        "experienceYears",
                        format!("Expected number, received '{}'", cell.as_text()),
                    );
                    None
                }
            },
        };

        let errors = v.into_errors();
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewCandidate {
            org_id: self.org_id,
            name,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            location: self.location,
            linkedin_url: self.linkedin_url,
            portfolio_url: self.portfolio_url,
            current_title: self.current_title,
            current_company: self.current_company,
            experience_years,
            skills: self.skills,
            salary_expectation: self.salary_expectation,
            notes: self.notes,
            source: self.source,
        })
    }
}

/// 职位草稿
#[derive(Debug, Clone)]
struct JobDraft {
    org_id: String,
    title: String,
    description: String,
    location: Option<String>,
    department: Option<String>,
    employment_type: String,
    experience_level: Option<String>,
    salary_min: Option<CellValue>,
    salary_max: Option<CellValue>,
    is_remote: bool,
    requirements: Vec<String>,
    status: String,
    priority: String,
}

impl JobDraft {
    fn parse_enum<E: FromStr>(
        v: &mut SchemaViolations,
        path: &str,
        raw: &str,
        options: &[&str],
    ) -> Option<E> {
        match raw.parse::<E>() {
            Ok(value) => Some(value),
            Err(_) => {
                v.push(path, enum_expectation(options, raw));
                None
            }
        }
    }

    fn parse_salary(v: &mut SchemaViolations, path: &str, cell: &Option<CellValue>) -> Option<f64> {
        let cell = cell.as_ref()?;
        match cell.as_f64() {
            Some(n) if n >= 0.0 => Some(n),
            Some(_) => {
                v.push(path, "Number must be greater than or equal to 0");
                None
            }
            None => {
                v.push(path, format!("Expected number, received '{}'", cell.as_text()));
                None
            }
        }
    }

    fn into_job(self) -> Result<NewJob, Vec<String>> {
        let mut v = SchemaViolations::default();

        if self.org_id.trim().is_empty() {
            v.push("orgId", "Required");
        }
        v.check_len("title", Some(&self.title), MAX_SHORT_TEXT);
        v.check_len("location", self.location.as_deref(), MAX_SHORT_TEXT);
        v.check_len("department", self.department.as_deref(), MAX_SHORT_TEXT);
        v.check_len("experienceLevel", self.experience_level.as_deref(), 100);

        let employment_options: Vec<&str> =
            EmploymentType::ALL.iter().map(EmploymentType::as_str).collect();
        let status_options: Vec<&str> = JobStatus::ALL.iter().map(JobStatus::as_str).collect();
        let priority_options: Vec<&str> = JobPriority::ALL.iter().map(JobPriority::as_str).collect();

        let employment_type = Self::parse_enum::<EmploymentType>(
            &mut v,
            "employmentType",
            &self.employment_type,
            &employment_options,
        );
        let status = Self::parse_enum::<JobStatus>(&mut v, "status", &self.status, &status_options);
        let priority =
            Self::parse_enum::<JobPriority>(&mut v, "priority", &self.priority, &priority_options);

        let salary_min = Self::parse_salary(&mut v, "salaryMin", &self.salary_min);
        let salary_max = Self::parse_salary(&mut v, "salaryMax", &self.salary_max);
        if let (Some(min), Some(max)) = (salary_min, salary_max) {
            if min > max {
                v.push("salaryMax", "Must be greater than or equal to salaryMin");
            }
        }

        let errors = v.into_errors();
        match (employment_type, status, priority) {
            (Some(employment_type), Some(status), Some(priority)) if errors.is_empty() => {
                Ok(NewJob {
                    org_id: self.org_id,
                    title: self.title,
                    description: self.description,
                    location: self.location,
                    department: self.department,
                    employment_type,
                    experience_level: self.experience_level,
                    salary_min,
                    salary_max,
                    is_remote: self.is_remote,
                    requirements: self.requirements,
                    status,
                    priority,
                })
            }
            _ => Err(errors),
        }
    }
}

// ==========================================
// RecordValidator 实现
// ==========================================
pub struct RecordValidator;

impl RecordValidatorTrait for RecordValidator {
    fn validate_candidate(&self, row: &RawRow, org_id: &str) -> ValidationResult<NewCandidate> {
        let mut errors = Vec::new();

        let first_name = text_field(row, "firstName");
        let last_name = text_field(row, "lastName");
        if first_name.is_none() && last_name.is_none() {
            errors.push("First name or last name is required".to_string());
        }

        let email = text_field(row, "email");
        match &email {
            None => errors.push("Email is required".to_string()),
            Some(e) if !is_valid_email(e) => errors.push(format!("Invalid email format: {}", e)),
            Some(_) => {}
        }

        if !errors.is_empty() {
            return ValidationResult::invalid(errors);
        }

        let draft = CandidateDraft {
            org_id: org_id.to_string(),
            first_name,
            last_name,
            email: email.unwrap_or_default(),
            phone: text_field(row, "phone"),
            location: text_field(row, "location"),
            linkedin_url: text_field(row, "linkedinUrl"),
            portfolio_url: text_field(row, "portfolioUrl"),
            current_title: text_field(row, "currentTitle"),
            current_company: text_field(row, "currentCompany"),
            experience_years: row.get("experienceYears").filter(|c| !c.is_blank()).cloned(),
            skills: list_field(row, "skills"),
            salary_expectation: text_field(row, "salaryExpectation"),
            notes: text_field(row, "notes"),
            source: text_field(row, "source").unwrap_or_else(|| DEFAULT_CANDIDATE_SOURCE.to_string()),
        };

        match draft.into_candidate() {
            Ok(candidate) => ValidationResult::valid(candidate),
            Err(schema_errors) => ValidationResult::invalid(schema_errors),
        }
    }

    fn validate_job(&self, row: &RawRow, org_id: &str) -> ValidationResult<NewJob> {
        let mut errors = Vec::new();

        let title = text_field(row, "title");
        if title.is_none() {
            errors.push("Job title is required".to_string());
        }
        let description = text_field(row, "description");
        if description.is_none() {
            errors.push("Job description is required".to_string());
        }

        if !errors.is_empty() {
            return ValidationResult::invalid(errors);
        }

        let draft = JobDraft {
            org_id: org_id.to_string(),
            title: title.unwrap_or_default(),
            description: description.unwrap_or_default(),
            location: text_field(row, "location"),
            department: text_field(row, "department"),
            employment_type: text_field(row, "employmentType")
                .map(|t| normalize_enum_text(&t, '-'))
                .unwrap_or_else(|| EmploymentType::FullTime.as_str().to_string()),
            experience_level: text_field(row, "experienceLevel"),
            salary_min: row.get("salaryMin").filter(|c| !c.is_blank()).cloned(),
            salary_max: row.get("salaryMax").filter(|c| !c.is_blank()).cloned(),
            is_remote: remote_flag(row, "isRemote"),
            requirements: list_field(row, "requirements"),
            status: text_field(row, "status")
                .map(|t| normalize_enum_text(&t, '_'))
                .unwrap_or_else(|| JobStatus::Draft.as_str().to_string()),
            priority: text_field(row, "priority")
                .map(|t| normalize_enum_text(&t, '_'))
                .unwrap_or_else(|| JobPriority::Medium.as_str().to_string()),
        };

        match draft.into_job() {
            Ok(job) => ValidationResult::valid(job),
            Err(schema_errors) => ValidationResult::invalid(schema_errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, CellValue)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_candidate_valid_with_defaults() {
        let result = RecordValidator.validate_candidate(
            &row(&[
                ("firstName", "Jane".into()),
                ("lastName", "Doe".into()),
                ("email", "jane@x.com".into()),
                ("skills", " rust, sql ,, go ".into()),
                ("phone", CellValue::Number(5551234.0)),
            ]),
            "org-1",
        );

        assert!(result.is_valid());
        assert!(result.errors().is_empty());
        let candidate = result.data().unwrap();
        assert_eq!(candidate.name, "Jane Doe");
        assert_eq!(candidate.skills, vec!["rust", "sql", "go"]);
        assert_eq!(candidate.phone.as_deref(), Some("5551234"));
        assert_eq!(candidate.source, DEFAULT_CANDIDATE_SOURCE);
        assert_eq!(candidate.location, None);
    }

    #[test]
    fn test_candidate_missing_name_and_email() {
        let result = RecordValidator.validate_candidate(&row(&[("phone", "555".into())]), "org-1");

        assert!(!result.is_valid());
        assert!(result.data().is_none());
        assert_eq!(
            result.errors(),
            &["First name or last name is required", "Email is required"]
        );
    }

    #[test]
    fn test_candidate_invalid_email() {
        let result = RecordValidator.validate_candidate(
            &row(&[("lastName", "Doe".into()), ("email", "not-an-email".into())]),
            "org-1",
        );
        assert!(!result.is_valid());
        assert_eq!(result.errors(), &["Invalid email format: not-an-email"]);
    }

    #[test]
    fn test_candidate_schema_errors_are_field_level() {
        let result = RecordValidator.validate_candidate(
            &row(&[
                ("firstName", "Jane".into()),
                ("email", "jane@x.com".into()),
                ("linkedinUrl", "linkedin.com/in/jane".into()),
                ("experienceYears", "lots".into()),
            ]),
            "org-1",
        );

        assert!(!result.is_valid());
        assert_eq!(
            result.errors(),
            &[
                "linkedinUrl: Invalid url",
                "experienceYears: Expected number, received 'lots'",
            ]
        );
    }

    #[test]
    fn test_candidate_requires_org_id() {
        let result = RecordValidator.validate_candidate(
            &row(&[("firstName", "Jane".into()), ("email", "jane@x.com".into())]),
            "  ",
        );
        assert_eq!(result.errors(), &["orgId: Required"]);
    }

    #[test]
    fn test_job_missing_description() {
        let result = RecordValidator.validate_job(&row(&[("title", "Title".into())]), "org-1");

        assert!(!result.is_valid());
        assert!(result
            .errors()
            .contains(&"Job description is required".to_string()));
    }

    #[test]
    fn test_job_defaults_and_remote_tokens() {
        let base = [
            ("title", CellValue::from("Backend Engineer")),
            ("description", CellValue::from("Build things")),
        ];

        let mut with_remote = row(&base);
        with_remote.insert("isRemote".to_string(), "YES".into());
        with_remote.insert("requirements".to_string(), "Rust, Postgres".into());
        let job = RecordValidator
            .validate_job(&with_remote, "org-1")
            .into_result()
            .unwrap();

        assert!(job.is_remote);
        assert_eq!(job.requirements, vec!["Rust", "Postgres"]);
        assert_eq!(job.employment_type, EmploymentType::FullTime);
        assert_eq!(job.status, JobStatus::Draft);
        assert_eq!(job.priority, JobPriority::Medium);

        let mut numeric_remote = row(&base);
        numeric_remote.insert("isRemote".to_string(), CellValue::Number(1.0));
        assert!(RecordValidator.validate_job(&numeric_remote, "org-1").data().unwrap().is_remote);

        let mut onsite = row(&base);
        onsite.insert("isRemote".to_string(), "onsite".into());
        assert!(!RecordValidator.validate_job(&onsite, "org-1").data().unwrap().is_remote);
    }

    #[test]
    fn test_job_enum_normalization_and_schema_gate() {
        let ok = RecordValidator.validate_job(
            &row(&[
                ("title", "Designer".into()),
                ("description", "Design".into()),
                ("employmentType", "Part Time".into()),
                ("status", "On Hold".into()),
            ]),
            "org-1",
        );
        let job = ok.data().unwrap();
        assert_eq!(job.employment_type, EmploymentType::PartTime);
        assert_eq!(job.status, JobStatus::OnHold);

        let bad = RecordValidator.validate_job(
            &row(&[
                ("title", "Designer".into()),
                ("description", "Design".into()),
                ("employmentType", "gig".into()),
                ("salaryMin", CellValue::Number(90000.0)),
                ("salaryMax", CellValue::Number(60000.0)),
            ]),
            "org-1",
        );
        assert!(!bad.is_valid());
        assert_eq!(bad.errors().len(), 2);
        assert!(bad.errors()[0].starts_with("employmentType: Invalid enum value"));
        assert_eq!(bad.errors()[1], "salaryMax: Must be greater than or equal to salaryMin");
    }

    #[test]
    fn test_validation_is_deterministic() {
        let input = row(&[
            ("firstName", "Jane".into()),
            ("email", "jane@x.com".into()),
            ("experienceYears", CellValue::Number(4.0)),
        ]);
        let first = RecordValidator.validate_candidate(&input, "org-1");
        let second = RecordValidator.validate_candidate(&input, "org-1");
        assert_eq!(first, second);
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("a@@c.com"));
        assert!(!is_valid_email("@c.com"));
        assert!(!is_valid_email("a@.com"));
        assert!(!is_valid_email("a@com."));
    }

    #[test]
    fn test_is_valid_url() {
        assert!(is_valid_url("https://linkedin.com/in/jane"));
        assert!(is_valid_url("http://example.org"));
        assert!(!is_valid_url("linkedin.com/in/jane"));
        assert!(!is_valid_url("ftp://example.org/file"));
        assert!(!is_valid_url("https://"));
        assert!(!is_valid_url("mailto:jane@x.com"));
    }
}
