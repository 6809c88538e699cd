use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LLMError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Decode error: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, LLMError>;

/// A hosted chat-completion service.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send `prompt` as a single user message and return the first choice's text.
    ///
    /// The call is non-streaming and the returned text is not trimmed.
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Model identifier requests are sent with
    fn model(&self) -> &str;
}

/// Parameters of one text-to-image request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageGenerationRequest {
    pub prompt: String,
    pub seed: u64,
    pub samples: u32,
    pub cfg_scale: f32,
    pub width: u32,
    pub height: u32,
    pub steps: u32,
}

impl ImageGenerationRequest {
    pub const CFG_SCALE: f32 = 7.0;
    pub const RESOLUTION: u32 = 1024;
    pub const STEPS: u32 = 30;

    pub fn new(prompt: impl Into<String>, seed: u64) -> Self {
        Self {
            prompt: prompt.into(),
            seed,
            samples: 1,
            cfg_scale: Self::CFG_SCALE,
            width: Self::RESOLUTION,
            height: Self::RESOLUTION,
            steps: Self::STEPS,
        }
    }

    pub fn with_samples(mut self, samples: u32) -> Self {
        self.samples = samples;
        self
    }
}

/// One generated image as returned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageArtifact {
    pub base64: String,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default, rename = "finishReason")]
    pub finish_reason: Option<String>,
}

impl ImageArtifact {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            base64: general_purpose::STANDARD.encode(bytes),
            seed: None,
            finish_reason: Some("SUCCESS".to_string()),
        }
    }

    pub fn decode(&self) -> Result<Vec<u8>> {
        general_purpose::STANDARD
            .decode(self.base64.trim())
            .map_err(|e| LLMError::Decode(format!("Failed to decode base64: {}", e)))
    }
}

/// A hosted text-to-image service.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    async fn text_to_image(&self, request: &ImageGenerationRequest) -> Result<Vec<ImageArtifact>>;
}
