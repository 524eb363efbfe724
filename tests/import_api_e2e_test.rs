// ==========================================
// ImportApi 端到端测试
// ==========================================
// 测试目标: 创建 → 预览 → 执行 → 查询, 以及组织隔离
// ==========================================

mod test_helpers;

use talentpatriot_import::api::{ApiError, ImportApi, ImportUpload};
use talentpatriot_import::config::config_keys;
use talentpatriot_import::domain::types::{ImportStatus, RecordStatus};
use talentpatriot_import::logging;
use tempfile::NamedTempFile;
use test_helpers::{candidate_csv, create_test_db, insert_test_config};

fn setup() -> (NamedTempFile, String, ImportApi) {
    logging::init_test();
    let (db, db_path) = create_test_db().expect("Failed to create test db");
    let api = ImportApi::new(&db_path).expect("Failed to create ImportApi");
    (db, db_path, api)
}

#[tokio::test]
async fn test_create_import_validation() {
    let (_db, db_path, api) = setup();

    let err = api
        .create_import("org-1", "user-1", "interviews", "a.csv", 10, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));

    let err = api
        .create_import("org-1", "user-1", "candidates", "  ", 10, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));

    insert_test_config(&db_path, config_keys::MAX_FILE_SIZE_BYTES, "100").unwrap();
    let err = api
        .create_import("org-1", "user-1", "candidates", "a.csv", 101, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(ref m) if m.contains("exceeds")));

    let job = api
        .create_import("org-1", "user-1", " Candidates ", "a.csv", 100, None)
        .await
        .unwrap();
    assert_eq!(job.status, ImportStatus::Pending);
    assert_eq!(job.import_type, "candidates");
}

#[tokio::test]
async fn test_preview_limits_sample_rows() {
    let (_db, db_path, api) = setup();
    let csv = candidate_csv(6, 2);

    let preview = api
        .preview(csv.as_bytes(), "people.csv", "candidates")
        .await
        .unwrap();
    assert_eq!(preview.total_rows, 8);
    assert_eq!(preview.sample_rows.len(), 5);
    assert_eq!(preview.headers, vec!["First Name", "Last Name", "Email", "Phone"]);
    assert_eq!(
        preview.suggested_mappings.get("Email").map(String::as_str),
        Some("email")
    );
    assert!(preview.sample_rows[0].contains_key("firstName"));

    insert_test_config(&db_path, config_keys::PREVIEW_ROWS, "2").unwrap();
    let preview = api
        .preview(csv.as_bytes(), "people.csv", "candidates")
        .await
        .unwrap();
    assert_eq!(preview.sample_rows.len(), 2);

    let err = api
        .preview(csv.as_bytes(), "people.txt", "candidates")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::ImportError(_)));
}

#[tokio::test]
async fn test_suggested_mappings() {
    let (_db, _db_path, api) = setup();
    let headers = vec!["Email Address".to_string(), "Phone Number".to_string()];

    let mapping = api.suggested_mappings(&headers, "candidates").unwrap();
    assert_eq!(mapping.len(), 2);
    assert_eq!(mapping["Email Address"], "email");
    assert_eq!(mapping["Phone Number"], "phone");

    let unmapped = vec!["Favourite Colour".to_string()];
    assert!(api.suggested_mappings(&unmapped, "jobs").unwrap().is_empty());
}

#[tokio::test]
async fn test_run_import_scoped_to_org_and_pending() {
    let (_db, _db_path, api) = setup();
    let csv = candidate_csv(3, 1);
    let job = api
        .create_import("org-1", "user-1", "candidates", "people.csv", csv.len() as u64, None)
        .await
        .unwrap();

    let err = api
        .run_import("org-2", &job.id, csv.as_bytes(), "people.csv")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    let outcome = api
        .run_import("org-1", &job.id, csv.as_bytes(), "people.csv")
        .await
        .unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.total_records, 4);

    let err = api
        .run_import("org-1", &job.id, csv.as_bytes(), "people.csv")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidStateTransition { .. }));
    assert_eq!(api.entities().count_candidates("org-1").unwrap(), 3);

    let failed = api
        .list_import_records("org-1", &job.id, Some("failed"))
        .await
        .unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].status, RecordStatus::Failed);
    assert_eq!(failed[0].row_number, 4);

    let err = api
        .list_import_records("org-1", &job.id, Some("bogus"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));

    let err = api
        .list_import_records("org-2", &job.id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_run_imports_and_history() {
    let (_db, _db_path, api) = setup();
    let candidates = candidate_csv(2, 0);
    let jobs = "Job Title,Description,Priority\nEngineer,Build things,High\nAnalyst,,low\n";

    let candidate_job = api
        .create_import("org-1", "user-1", "candidates", "people.csv", 0, None)
        .await
        .unwrap();
    let jobs_job = api
        .create_import("org-1", "user-1", "jobs", "jobs.csv", 0, None)
        .await
        .unwrap();
    api.create_import("org-2", "user-9", "jobs", "other.csv", 0, None)
        .await
        .unwrap();

    let results = api
        .run_imports(
            "org-1",
            vec![
                ImportUpload {
                    import_id: candidate_job.id.clone(),
                    file_name: "people.csv".to_string(),
                    content: candidates.into_bytes(),
                },
                ImportUpload {
                    import_id: jobs_job.id.clone(),
                    file_name: "jobs.csv".to_string(),
                    content: jobs.as_bytes().to_vec(),
                },
                ImportUpload {
                    import_id: "missing".to_string(),
                    file_name: "x.csv".to_string(),
                    content: Vec::new(),
                },
            ],
        )
        .await;

    assert_eq!(results.len(), 3);
    let first = results[0].as_ref().unwrap();
    assert_eq!((first.successful_records, first.failed_records), (2, 0));
    let second = results[1].as_ref().unwrap();
    assert_eq!((second.successful_records, second.failed_records), (1, 1));
    assert!(matches!(results[2], Err(ApiError::NotFound(_))));

    let history = api.list_imports("org-1", 50).await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|job| job.status == ImportStatus::Completed));
    assert_eq!(api.list_imports("org-2", 0).await.unwrap().len(), 1);
}
