use crate::domain::model::{ExtractionReport, Record};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn batch_size(&self) -> usize;
    fn model(&self) -> &str;
    fn output_path(&self) -> &str;
    fn max_attempts(&self) -> u32;
    fn retry_delay(&self) -> Duration;
    fn request_timeout(&self) -> Duration;
    fn summary_file(&self) -> Option<&str>;
}

/// 對文字生成服務的單次請求
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
    pub timeout: Duration,
}

/// Text-generation backend: takes a prompt, returns free-form text.
#[async_trait]
pub trait ExtractionService: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Record>>;
    async fn transform(&self, records: Vec<Record>) -> Result<ExtractionReport>;
    async fn load(&self, report: ExtractionReport) -> Result<String>;
}
