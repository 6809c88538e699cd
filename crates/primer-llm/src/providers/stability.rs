use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::client::build_client;
use crate::provider::{ImageArtifact, ImageGenerationRequest, ImageProvider, LLMError, Result};

pub const DEFAULT_API_HOST: &str = "https://api.stability.ai";
pub const DEFAULT_ENGINE_ID: &str = "stable-diffusion-xl-1024-v1-0";

pub struct StabilityProvider {
    client: Client,
    api_key: String,
    api_host: String,
    engine_id: String,
}

impl StabilityProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: build_client(None),
            api_key: api_key.into(),
            api_host: DEFAULT_API_HOST.to_string(),
            engine_id: DEFAULT_ENGINE_ID.to_string(),
        }
    }

    pub fn with_api_host(mut self, host: impl Into<String>) -> Self {
        self.api_host = host.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_engine(mut self, engine_id: impl Into<String>) -> Self {
        self.engine_id = engine_id.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.client = build_client(timeout);
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/generation/{}/text-to-image",
            self.api_host, self.engine_id
        )
    }

    fn build_request_body(request: &ImageGenerationRequest) -> TextToImageBody<'_> {
        TextToImageBody {
            text_prompts: vec![TextPrompt {
                text: &request.prompt,
            }],
            cfg_scale: request.cfg_scale,
            height: request.height,
            width: request.width,
            samples: request.samples,
            steps: request.steps,
            seed: request.seed,
        }
    }
}

#[async_trait]
impl ImageProvider for StabilityProvider {
    async fn text_to_image(&self, request: &ImageGenerationRequest) -> Result<Vec<ImageArtifact>> {
        log::debug!(
            "Requesting {} image(s) from {} (seed: {})",
            request.samples,
            self.engine_id,
            request.seed
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&Self::build_request_body(request))
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let text = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    LLMError::Auth(format!("Non-200 response from API: {}", text))
                }
                _ => LLMError::Api(format!("Non-200 response from API: {}", text)),
            });
        }

        let text = response.text().await?;
        let parsed: TextToImageResponse = serde_json::from_str(&text)?;
        Ok(parsed.artifacts)
    }
}

#[derive(Debug, Serialize)]
struct TextToImageBody<'a> {
    text_prompts: Vec<TextPrompt<'a>>,
    cfg_scale: f32,
    height: u32,
    width: u32,
    samples: u32,
    steps: u32,
    seed: u64,
}

#[derive(Debug, Serialize)]
struct TextPrompt<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct TextToImageResponse {
    artifacts: Vec<ImageArtifact>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn network_tests_disabled() -> bool {
        std::env::var_os("CODEX_SANDBOX_NETWORK_DISABLED").is_some()
    }

    #[test]
    fn endpoint_includes_engine() {
        let provider = StabilityProvider::new("k").with_api_host("http://host/");
        assert_eq!(
            provider.endpoint(),
            "http://host/v1/generation/stable-diffusion-xl-1024-v1-0/text-to-image"
        );
    }

    #[tokio::test]
    async fn text_to_image_sends_fixed_parameters_and_returns_artifacts() {
        if network_tests_disabled() {
            return;
        }

        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!(
                "/v1/generation/{}/text-to-image",
                DEFAULT_ENGINE_ID
            )))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_json(serde_json::json!({
                "text_prompts": [{"text": "a green tree frog"}],
                "cfg_scale": 7.0,
                "height": 1024,
                "width": 1024,
                "samples": 1,
                "steps": 30,
                "seed": 101
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "artifacts": [{"base64": "iVBORw0K", "seed": 101, "finishReason": "SUCCESS"}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = StabilityProvider::new("sk-test").with_api_host(mock_server.uri());
        let artifacts = provider
            .text_to_image(&ImageGenerationRequest::new("a green tree frog", 101))
            .await
            .unwrap();

        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].base64, "iVBORw0K");
        assert_eq!(artifacts[0].seed, Some(101));
    }

    #[tokio::test]
    async fn text_to_image_treats_non_200_as_failure() {
        if network_tests_disabled() {
            return;
        }

        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid prompt"))
            .mount(&mock_server)
            .await;

        let provider = StabilityProvider::new("sk").with_api_host(mock_server.uri());
        let err = provider
            .text_to_image(&ImageGenerationRequest::new("x", 1))
            .await
            .unwrap_err();

        assert!(matches!(err, LLMError::Api(ref msg) if msg.contains("invalid prompt")));
    }

    #[tokio::test]
    async fn text_to_image_maps_forbidden_to_auth_error() {
        if network_tests_disabled() {
            return;
        }

        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&mock_server)
            .await;

        let provider = StabilityProvider::new("sk").with_api_host(mock_server.uri());
        let err = provider
            .text_to_image(&ImageGenerationRequest::new("x", 1))
            .await
            .unwrap_err();

        assert!(matches!(err, LLMError::Auth(_)));
    }
}
