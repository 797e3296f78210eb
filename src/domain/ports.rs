use crate::domain::model::{DiffResult, ExportInput};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn following_path(&self) -> Option<&str>;
    fn followers_path(&self) -> Option<&str>;
    fn archive_path(&self) -> Option<&str>;
    /// 宣告的內容類型 (例如 `text/html`、`json`)；None 時依副檔名與內容判斷
    fn following_content_type(&self) -> Option<&str> {
        None
    }
    fn followers_content_type(&self) -> Option<&str> {
        None
    }
    /// 請求期間暫存檔的位置；None 使用系統暫存目錄
    fn upload_dir(&self) -> Option<&str>;
    fn backend_executable(&self) -> Option<&str>;
    fn backend_timeout(&self) -> Option<Duration>;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
    /// Some(filename) 時把所有報表打包成單一 ZIP
    fn compressed_output(&self) -> Option<&str>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<ExportInput>;
    async fn transform(&self, input: ExportInput) -> Result<DiffResult>;
    async fn load(&self, result: DiffResult) -> Result<String>;
}
