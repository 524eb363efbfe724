// ==========================================
// TalentPatriot 导入引擎 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use std::error::Error;

pub type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入模块所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// 每批处理的行数
    ///
    /// # 默认值
    /// - 10（非正数或无法解析时回退默认值）
    async fn get_batch_size(&self) -> ConfigResult<usize>;

    /// 预览返回的样例行数
    ///
    /// # 默认值
    /// - 5
    async fn get_preview_rows(&self) -> ConfigResult<usize>;

    /// 上传文件大小上限（字节）
    ///
    /// # 默认值
    /// - 10485760 (10 MiB)
    async fn get_max_file_size_bytes(&self) -> ConfigResult<u64>;
}
