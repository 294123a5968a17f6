use crate::core::retry::RetryPolicy;
use crate::core::{CompletionRequest, ExtractionService};
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// OpenAI-compatible chat completions backend.
pub struct OpenAiService {
    client: Client,
    api_base: String,
    api_key: String,
}

impl OpenAiService {
    pub fn new(api_base: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageContent,
}

#[derive(Deserialize)]
struct ChatMessageContent {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl ExtractionService for OpenAiService {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = ChatRequest {
            model: &request.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            temperature: request.temperature,
        };

        tracing::debug!("Making completion request to: {}", self.endpoint());

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .timeout(request.timeout)
            .json(&body)
            .send()
            .await?;

        tracing::debug!("Completion response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(EtlError::ServiceError { status, body });
        }

        let parsed: ChatResponse = response.json().await?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or_else(|| EtlError::ServiceError {
                status: 200,
                body: "response contained no choices".to_string(),
            })
    }
}

/// 包裝服務呼叫：固定逾時、溫度 0、有限次重試
pub struct ExtractionClient<X: ExtractionService> {
    service: X,
    model: String,
    timeout: Duration,
    retry: RetryPolicy,
}

impl<X: ExtractionService> ExtractionClient<X> {
    pub fn new(service: X, model: impl Into<String>, timeout: Duration, retry: RetryPolicy) -> Self {
        Self {
            service,
            model: model.into(),
            timeout,
            retry,
        }
    }

    pub fn service(&self) -> &X {
        &self.service
    }

    /// Returns the raw response text, or `ExtractionFailed` once every attempt has failed.
    pub async fn extract(&self, prompt: &str) -> Result<String> {
        let request = CompletionRequest {
            model: self.model.clone(),
            system: crate::core::prompt::SYSTEM_INSTRUCTION.to_string(),
            prompt: prompt.to_string(),
            temperature: 0.0,
            timeout: self.timeout,
        };
        let request = &request;

        self.retry
            .run(|attempt| async move {
                tracing::debug!("Extraction attempt {}", attempt);
                self.service.complete(request).await
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn request(prompt: &str) -> CompletionRequest {
        CompletionRequest {
            model: "test-model".to_string(),
            system: "system".to_string(),
            prompt: prompt.to_string(),
            temperature: 0.0,
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice_content() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/chat/completions")
                .header("Authorization", "Bearer secret")
                .json_body_partial(r#"{"model": "test-model", "temperature": 0.0}"#);
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "choices": [{"message": {"role": "assistant", "content": "{\"descriptors\": []}"}}]
                }));
        });

        let service = OpenAiService::new(server.base_url(), "secret");
        let text = service.complete(&request("hello")).await.unwrap();

        api_mock.assert();
        assert_eq!(text, "{\"descriptors\": []}");
    }

    #[tokio::test]
    async fn test_non_success_status_is_service_error() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(429).body("rate limited");
        });

        let service = OpenAiService::new(format!("{}/", server.base_url()), "secret");
        let err = service.complete(&request("hello")).await.unwrap_err();

        api_mock.assert();
        match err {
            EtlError::ServiceError { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, "rate limited");
            }
            other => panic!("expected service error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_extraction_client_retries_three_times() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(500);
        });

        let client = ExtractionClient::new(
            OpenAiService::new(server.base_url(), "secret"),
            "test-model",
            Duration::from_secs(5),
            RetryPolicy::new(3, Duration::ZERO),
        );

        let err = client.extract("prompt").await.unwrap_err();

        api_mock.assert_hits(3);
        assert!(matches!(err, EtlError::ExtractionFailed { attempts: 3, .. }));
    }

    #[tokio::test]
    async fn test_timeout_counts_as_failed_attempt() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200)
                .delay(Duration::from_millis(500))
                .json_body(serde_json::json!({"choices": []}));
        });

        let client = ExtractionClient::new(
            OpenAiService::new(server.base_url(), "secret"),
            "test-model",
            Duration::from_millis(50),
            RetryPolicy::new(2, Duration::ZERO),
        );

        let err = client.extract("prompt").await.unwrap_err();

        assert!(api_mock.hits() >= 1);
        assert!(matches!(err, EtlError::ExtractionFailed { attempts: 2, .. }));
    }
}
