// ==========================================
// TalentPatriot 导入引擎 - 字段映射器实现
// ==========================================
// 职责: 源列名 → 标准字段名（静态同义词表）
// 规则: 小写 + TRIM + 空白/下划线连续段折叠为单个下划线
// 未命中: 原列名透传（便于人工映射与诊断）
// ==========================================

use crate::domain::import::{FieldMapping, RawRow};
use crate::domain::types::ImportType;
use crate::importer::import_trait::FieldMapper as FieldMapperTrait;

// ==========================================
// 候选人同义词表（规范化列名 → 标准字段）
// ==========================================
// 红线: 每个标准字段的小写形式必须映射回自身（幂等）
const CANDIDATE_FIELD_SYNONYMS: &[(&str, &str)] = &[
    // 姓名
    ("firstname", "firstName"),
    ("first_name", "firstName"),
    ("first", "firstName"),
    ("given_name", "firstName"),
    ("forename", "firstName"),
    ("fname", "firstName"),
    ("lastname", "lastName"),
    ("last_name", "lastName"),
    ("last", "lastName"),
    ("surname", "lastName"),
    ("family_name", "lastName"),
    ("lname", "lastName"),
    // 联系方式
    ("email", "email"),
    ("email_address", "email"),
    ("emailaddress", "email"),
    ("e-mail", "email"),
    ("e_mail", "email"),
    ("mail", "email"),
    ("phone", "phone"),
    ("phone_number", "phone"),
    ("phonenumber", "phone"),
    ("mobile", "phone"),
    ("mobile_phone", "phone"),
    ("cell", "phone"),
    ("cell_phone", "phone"),
    ("telephone", "phone"),
    ("tel", "phone"),
    ("contact_number", "phone"),
    ("location", "location"),
    ("city", "location"),
    ("address", "location"),
    ("current_location", "location"),
    // 线上资料
    ("linkedinurl", "linkedinUrl"),
    ("linkedin", "linkedinUrl"),
    ("linkedin_url", "linkedinUrl"),
    ("linkedin_profile", "linkedinUrl"),
    ("portfoliourl", "portfolioUrl"),
    ("portfolio", "portfolioUrl"),
    ("portfolio_url", "portfolioUrl"),
    ("website", "portfolioUrl"),
    ("personal_website", "portfolioUrl"),
    // 职业信息
    ("currenttitle", "currentTitle"),
    ("current_title", "currentTitle"),
    ("title", "currentTitle"),
    ("job_title", "currentTitle"),
    ("position", "currentTitle"),
    ("current_position", "currentTitle"),
    ("currentcompany", "currentCompany"),
    ("current_company", "currentCompany"),
    ("company", "currentCompany"),
    ("employer", "currentCompany"),
    ("current_employer", "currentCompany"),
    ("experienceyears", "experienceYears"),
    ("experience", "experienceYears"),
    ("experience_years", "experienceYears"),
    ("years_of_experience", "experienceYears"),
    ("years_experience", "experienceYears"),
    ("yoe", "experienceYears"),
    ("skills", "skills"),
    ("skill_set", "skills"),
    ("skillset", "skills"),
    ("technologies", "skills"),
    ("salaryexpectation", "salaryExpectation"),
    ("salary", "salaryExpectation"),
    ("salary_expectation", "salaryExpectation"),
    ("expected_salary", "salaryExpectation"),
    ("desired_salary", "salaryExpectation"),
    // 其他
    ("notes", "notes"),
    ("note", "notes"),
    ("comments", "notes"),
    ("comment", "notes"),
    ("source", "source"),
    ("candidate_source", "source"),
    ("lead_source", "source"),
];

// ==========================================
// 职位同义词表
// ==========================================
const JOB_FIELD_SYNONYMS: &[(&str, &str)] = &[
    ("title", "title"),
    ("job_title", "title"),
    ("jobtitle", "title"),
    ("position", "title"),
    ("position_title", "title"),
    ("role", "title"),
    ("description", "description"),
    ("job_description", "description"),
    ("jobdescription", "description"),
    ("details", "description"),
    ("summary", "description"),
    ("location", "location"),
    ("job_location", "location"),
    ("city", "location"),
    ("office", "location"),
    ("department", "department"),
    ("dept", "department"),
    ("team", "department"),
    ("employmenttype", "employmentType"),
    ("employment_type", "employmentType"),
    ("job_type", "employmentType"),
    ("type", "employmentType"),
    ("contract_type", "employmentType"),
    ("experiencelevel", "experienceLevel"),
    ("experience_level", "experienceLevel"),
    ("seniority", "experienceLevel"),
    ("level", "experienceLevel"),
    ("salarymin", "salaryMin"),
    ("salary_min", "salaryMin"),
    ("min_salary", "salaryMin"),
    ("minimum_salary", "salaryMin"),
    ("salarymax", "salaryMax"),
    ("salary_max", "salaryMax"),
    ("max_salary", "salaryMax"),
    ("maximum_salary", "salaryMax"),
    ("isremote", "isRemote"),
    ("is_remote", "isRemote"),
    ("remote", "isRemote"),
    ("remote_work", "isRemote"),
    ("work_from_home", "isRemote"),
    ("requirements", "requirements"),
    ("qualifications", "requirements"),
    ("required_skills", "requirements"),
    ("skills", "requirements"),
    ("status", "status"),
    ("job_status", "status"),
    ("priority", "priority"),
    ("urgency", "priority"),
];

/// 按导入类型选择同义词表
fn synonyms_for(import_type: ImportType) -> &'static [(&'static str, &'static str)] {
    match import_type {
        ImportType::Candidates => CANDIDATE_FIELD_SYNONYMS,
        ImportType::Jobs => JOB_FIELD_SYNONYMS,
    }
}

/// 列名规范化: 小写 + TRIM + 空白/下划线连续段折叠为 "_"
pub fn normalize_header(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut in_separator = false;
    for ch in lowered.chars() {
        if ch.is_whitespace() || ch == '_' {
            if !in_separator {
                out.push('_');
                in_separator = true;
            }
        } else {
            out.push(ch);
            in_separator = false;
        }
    }
    out
}

/// 查询标准字段名（先查折叠形式, 再查原始小写形式）
pub fn canonical_field(raw: &str, import_type: ImportType) -> Option<&'static str> {
    let table = synonyms_for(import_type);
    let collapsed = normalize_header(raw);
    let lowered = raw.trim().to_lowercase();

    table
        .iter()
        .find(|(synonym, _)| *synonym == collapsed)
        .or_else(|| table.iter().find(|(synonym, _)| *synonym == lowered))
        .map(|(_, canonical)| *canonical)
}

/// 某导入类型的全部标准字段名（去重, 保持表内顺序）
pub fn canonical_fields(import_type: ImportType) -> Vec<&'static str> {
    let mut fields: Vec<&'static str> = Vec::new();
    for (_, canonical) in synonyms_for(import_type) {
        if !fields.contains(canonical) {
            fields.push(*canonical);
        }
    }
    fields
}

// ==========================================
// FieldMapper 实现
// ==========================================
pub struct FieldMapper;

impl FieldMapperTrait for FieldMapper {
    fn map_row(
        &self,
        row: &RawRow,
        import_type: ImportType,
        overrides: Option<&FieldMapping>,
    ) -> RawRow {
        let mut mapped = RawRow::new();

        for (raw_key, value) in row {
            // 用户确认的映射优先; 映射到空字符串表示丢弃该列
            let target = match overrides.and_then(|m| m.get(raw_key)) {
                Some(field) if field.trim().is_empty() => continue,
                Some(field) => field.trim().to_string(),
                None => canonical_field(raw_key, import_type)
                    .map(str::to_string)
                    .unwrap_or_else(|| raw_key.clone()),
            };

            // 多列映射到同一字段时, 空值不覆盖已有非空值
            match mapped.get(&target) {
                Some(existing) if !existing.is_blank() && value.is_blank() => {}
                _ => {
                    mapped.insert(target, value.clone());
                }
            }
        }

        mapped
    }

    fn suggested_mappings(&self, headers: &[String], import_type: ImportType) -> FieldMapping {
        headers
            .iter()
            .filter_map(|header| {
                canonical_field(header, import_type)
                    .map(|canonical| (header.clone(), canonical.to_string()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::import::CellValue;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), CellValue::text(*v)))
            .collect()
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("  First   Name "), "first_name");
        assert_eq!(normalize_header("first__name"), "first_name");
        assert_eq!(normalize_header("Email _ Address"), "email_address");
        assert_eq!(normalize_header("E-Mail"), "e-mail");
    }

    #[test]
    fn test_map_candidate_headers() {
        let mapper = FieldMapper;
        let mapped = mapper.map_row(
            &row(&[("first_name", "Jane"), ("Last Name", "Doe"), ("E-mail", "jane@x.com")]),
            ImportType::Candidates,
            None,
        );

        assert_eq!(mapped.get("firstName"), Some(&CellValue::text("Jane")));
        assert_eq!(mapped.get("lastName"), Some(&CellValue::text("Doe")));
        assert_eq!(mapped.get("email"), Some(&CellValue::text("jane@x.com")));
        assert_eq!(mapped.len(), 3);
    }

    #[test]
    fn test_unknown_header_passes_through() {
        let mapper = FieldMapper;
        let mapped = mapper.map_row(
            &row(&[("Favourite Colour", "blue")]),
            ImportType::Candidates,
            None,
        );
        assert_eq!(mapped.get("Favourite Colour"), Some(&CellValue::text("blue")));
    }

    #[test]
    fn test_same_header_maps_per_entity() {
        assert_eq!(canonical_field("Title", ImportType::Candidates), Some("currentTitle"));
        assert_eq!(canonical_field("Title", ImportType::Jobs), Some("title"));
        assert_eq!(canonical_field("Expected Salary", ImportType::Candidates), Some("salaryExpectation"));
    }

    #[test]
    fn test_mapping_is_idempotent_on_canonical_keys() {
        let mapper = FieldMapper;
        for import_type in [ImportType::Candidates, ImportType::Jobs] {
            let canonical_row: RawRow = canonical_fields(import_type)
                .into_iter()
                .map(|f| (f.to_string(), CellValue::text("x")))
                .collect();

            let once = mapper.map_row(&canonical_row, import_type, None);
            let twice = mapper.map_row(&once, import_type, None);
            assert_eq!(once, canonical_row);
            assert_eq!(twice, once);
        }
    }

    #[test]
    fn test_override_wins_and_empty_override_drops_column() {
        let mapper = FieldMapper;
        let mut overrides = FieldMapping::new();
        overrides.insert("Contact".to_string(), "email".to_string());
        overrides.insert("Internal Id".to_string(), "".to_string());
        overrides.insert("phone".to_string(), "notes".to_string());

        let mapped = mapper.map_row(
            &row(&[("Contact", "a@b.co"), ("Internal Id", "42"), ("phone", "555")]),
            ImportType::Candidates,
            Some(&overrides),
        );

        assert_eq!(mapped.get("email"), Some(&CellValue::text("a@b.co")));
        assert_eq!(mapped.get("notes"), Some(&CellValue::text("555")));
        assert!(!mapped.contains_key("Internal Id"));
        assert!(!mapped.contains_key("phone"));
    }

    #[test]
    fn test_blank_duplicate_does_not_clobber_value() {
        let mapper = FieldMapper;
        let mapped = mapper.map_row(
            &row(&[("Email", "a@b.co"), ("email_address", "")]),
            ImportType::Candidates,
            None,
        );
        assert_eq!(mapped.get("email"), Some(&CellValue::text("a@b.co")));
    }

    #[test]
    fn test_duplicate_columns_resolved_in_source_order() {
        let mapper = FieldMapper;
        let mapped = mapper.map_row(
            &row(&[
                ("email_address", "first@b.co"),
                ("first_name", "Jane"),
                ("Email", "second@b.co"),
            ]),
            ImportType::Candidates,
            None,
        );

        // 后出现的非空列覆盖先出现的列
        assert_eq!(mapped.get("email"), Some(&CellValue::text("second@b.co")));
        let keys: Vec<&str> = mapped.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["email", "firstName"]);
    }

    #[test]
    fn test_suggested_mappings() {
        let mapper = FieldMapper;
        let headers = vec![
            "Email Address".to_string(),
            "Phone Number".to_string(),
            "Shoe Size".to_string(),
        ];
        let suggested = mapper.suggested_mappings(&headers, ImportType::Candidates);

        assert_eq!(suggested.len(), 2);
        assert_eq!(suggested.get("Email Address"), Some(&"email".to_string()));
        assert_eq!(suggested.get("Phone Number"), Some(&"phone".to_string()));
    }
}
