// ==========================================
// Mock 配置实现 - 用于集成测试
// ==========================================

use async_trait::async_trait;
use talentpatriot_import::config::{ConfigResult, ImportConfigReader};

/// Mock 配置结构
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub batch_size: usize,
    pub preview_rows: usize,
    pub max_file_size_bytes: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            preview_rows: 5,
            max_file_size_bytes: 10 * 1024 * 1024,
        }
    }
}

impl MockConfig {
    /// 指定批大小
    pub fn with_batch_size(batch_size: usize) -> Self {
        Self {
            batch_size,
            ..Self::default()
        }
    }
}

#[async_trait]
impl ImportConfigReader for MockConfig {
    async fn get_batch_size(&self) -> ConfigResult<usize> {
        Ok(self.batch_size)
    }

    async fn get_preview_rows(&self) -> ConfigResult<usize> {
        Ok(self.preview_rows)
    }

    async fn get_max_file_size_bytes(&self) -> ConfigResult<u64> {
        Ok(self.max_file_size_bytes)
    }
}
