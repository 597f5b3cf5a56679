use crate::domain::model::{ApiKey, Generation};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

pub trait Storage: Send + Sync {
    /// 檔案實際寫入的目錄
    fn base_path(&self) -> &Path;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn model(&self) -> &str;
    fn api_key(&self) -> Option<&ApiKey>;
    fn parallel_dispatch(&self) -> bool;
    fn request_timeout(&self) -> Option<Duration>;
}

/// 文字產生服務；失敗以 `Err` 值回傳，而不是中斷整個執行
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate_content(&self, api_key: &ApiKey, prompt: &str) -> Generation;
}
