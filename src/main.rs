// ==========================================
// TalentPatriot 导入引擎 - 命令行入口
// ==========================================
// 用法:
//   talentpatriot-import <db_path> <file> <candidates|jobs> [org_id] [user_id]
//
// db_path 传 "-" 时使用默认路径（TALENTPATRIOT_DB_PATH 或用户数据目录）
// ==========================================

use anyhow::{bail, Context};
use std::path::Path;
use talentpatriot_import::app::{get_default_db_path, AppState};
use talentpatriot_import::logging;

const USAGE: &str =
    "usage: talentpatriot-import <db_path> <file> <candidates|jobs> [org_id] [user_id]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let (db_arg, file_arg, import_type) = match (args.next(), args.next(), args.next()) {
        (Some(db), Some(file), Some(kind)) => (db, file, kind),
        _ => bail!(USAGE),
    };
    let org_id = args.next().unwrap_or_else(|| "default-org".to_string());
    let user_id = args.next().unwrap_or_else(|| "cli".to_string());

    let db_path = if db_arg == "-" {
        get_default_db_path()
    } else {
        db_arg
    };

    tracing::info!(
        version = talentpatriot_import::VERSION,
        db_path = %db_path,
        "{}",
        talentpatriot_import::APP_NAME
    );

    let file_path = Path::new(&file_arg);
    let content = std::fs::read(file_path)
        .with_context(|| format!("failed to read {}", file_path.display()))?;
    let file_name = file_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| file_arg.clone());

    let state = AppState::new(db_path)?;
    let api = &state.import_api;

    let job = api
        .create_import(
            &org_id,
            &user_id,
            &import_type,
            &file_name,
            content.len() as u64,
            None,
        )
        .await?;
    let outcome = api.run_import(&org_id, &job.id, &content, &file_name).await?;

    println!("import_id={}", job.id);
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    if !outcome.success {
        std::process::exit(1);
    }
    Ok(())
}
