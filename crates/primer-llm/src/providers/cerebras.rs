use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::client::build_client;
use crate::provider::{CompletionProvider, LLMError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.cerebras.ai/v1";
pub const DEFAULT_MODEL: &str = "qwen-3-235b-a22b-instruct-2507";

pub struct CerebrasProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl CerebrasProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: build_client(None),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.client = build_client(timeout);
        self
    }

    fn build_request_body<'a>(&'a self, prompt: &'a str) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
        }
    }
}

#[async_trait]
impl CompletionProvider for CerebrasProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = self.build_request_body(prompt);
        log::debug!(
            "Sending completion request to {} (model: {}, prompt chars: {})",
            self.base_url,
            self.model,
            prompt.len()
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    LLMError::Auth(format!("HTTP {}: {}", status, text))
                }
                _ => LLMError::Api(format!("HTTP {}: {}", status, text)),
            });
        }

        let text = response.text().await?;
        let parsed: ChatCompletionResponse = serde_json::from_str(&text)?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LLMError::Api("completion response contained no message".to_string()))
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn network_tests_disabled() -> bool {
        std::env::var_os("CODEX_SANDBOX_NETWORK_DISABLED").is_some()
    }

    fn completion_body(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "created": 1234567890,
            "model": DEFAULT_MODEL,
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }]
        })
    }

    #[test]
    fn test_new_provider() {
        let provider = CerebrasProvider::new("test_key");
        assert_eq!(provider.api_key, "test_key");
        assert_eq!(provider.base_url, DEFAULT_BASE_URL);
        assert_eq!(provider.model(), DEFAULT_MODEL);
    }

    #[test]
    fn test_with_base_url_strips_trailing_slash() {
        let provider = CerebrasProvider::new("k").with_base_url("http://localhost:9999/v1/");
        assert_eq!(provider.base_url, "http://localhost:9999/v1");
    }

    #[test]
    fn test_request_body_is_single_user_message_without_streaming() {
        let provider = CerebrasProvider::new("k").with_model("tiny");
        let body = serde_json::to_value(provider.build_request_body("hello")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "model": "tiny",
                "messages": [{"role": "user", "content": "hello"}],
                "stream": false
            })
        );
    }

    #[tokio::test]
    async fn complete_returns_first_choice_content() {
        if network_tests_disabled() {
            return;
        }

        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer csk-test"))
            .and(body_partial_json(serde_json::json!({"stream": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("  Eiffel Tower \n")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = CerebrasProvider::new("csk-test").with_base_url(mock_server.uri());
        let text = provider.complete("Tell me about Paris").await.unwrap();

        assert_eq!(text, "  Eiffel Tower \n");
    }

    #[tokio::test]
    async fn complete_maps_unauthorized_to_auth_error() {
        if network_tests_disabled() {
            return;
        }

        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"error": "bad key"}"#))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = CerebrasProvider::new("wrong").with_base_url(mock_server.uri());
        let err = provider.complete("hi").await.unwrap_err();

        assert!(matches!(err, LLMError::Auth(ref msg) if msg.contains("bad key")));
    }

    #[tokio::test]
    async fn complete_maps_server_error_to_api_error() {
        if network_tests_disabled() {
            return;
        }

        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let provider = CerebrasProvider::new("k").with_base_url(mock_server.uri());
        let err = provider.complete("hi").await.unwrap_err();

        assert!(matches!(err, LLMError::Api(ref msg) if msg.contains("503")));
    }

    #[tokio::test]
    async fn complete_rejects_response_without_choices() {
        if network_tests_disabled() {
            return;
        }

        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
            .mount(&mock_server)
            .await;

        let provider = CerebrasProvider::new("k").with_base_url(mock_server.uri());
        let err = provider.complete("hi").await.unwrap_err();

        assert!(matches!(err, LLMError::Api(_)));
    }

    #[tokio::test]
    async fn complete_reports_malformed_json() {
        if network_tests_disabled() {
            return;
        }

        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let provider = CerebrasProvider::new("k").with_base_url(mock_server.uri());
        let err = provider.complete("hi").await.unwrap_err();

        assert!(matches!(err, LLMError::Json(_)));
    }
}
