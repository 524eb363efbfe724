// ==========================================
// TalentPatriot 导入引擎 - 核心库
// ==========================================
// 职责: 将上传的 CSV / Excel 文件导入为候选人或职位
// 技术栈: Rust + SQLite
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 解析/映射/校验/编排
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 共享状态
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{EntityType, ImportStatus, ImportType, RecordStatus};

// 领域实体
pub use domain::{DataImport, ImportOutcome, ImportRecord, NewCandidate, NewJob};

// 导入
pub use importer::{DataImporter, ImportError, ImportOrchestrator};

// API
pub use api::{ApiError, ImportApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "TalentPatriot Import";
