//! In-memory providers for tests and offline runs.
//!
//! Both mocks count their calls so callers can assert how many hosted requests a code
//! path would have made.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::provider::{
    CompletionProvider, ImageArtifact, ImageGenerationRequest, ImageProvider, LLMError, Result,
};

type CompletionResponder = dyn Fn(&str) -> Result<String> + Send + Sync;
type ImageResponder = dyn Fn(&ImageGenerationRequest) -> Result<Vec<ImageArtifact>> + Send + Sync;

/// Mock completion provider answering through a closure
pub struct MockCompletionProvider {
    responder: Arc<CompletionResponder>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl MockCompletionProvider {
    pub fn from_fn<F>(responder: F) -> Self
    where
        F: Fn(&str) -> Result<String> + Send + Sync + 'static,
    {
        Self {
            responder: Arc::new(responder),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// Always answers with `text`
    pub fn with_response(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::from_fn(move |_| Ok(text.clone()))
    }

    /// Always fails with an API error carrying `message`
    pub fn failing(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::from_fn(move |_| Err(LLMError::Api(message.clone())))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CompletionProvider for MockCompletionProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.responder)(prompt)
    }

    fn model(&self) -> &str {
        "mock-model"
    }
}

/// Mock image provider answering through a closure
pub struct MockImageProvider {
    responder: Arc<ImageResponder>,
    calls: AtomicUsize,
    requests: Mutex<Vec<ImageGenerationRequest>>,
    delay: Option<Duration>,
}

impl MockImageProvider {
    pub fn from_fn<F>(responder: F) -> Self
    where
        F: Fn(&ImageGenerationRequest) -> Result<Vec<ImageArtifact>> + Send + Sync + 'static,
    {
        Self {
            responder: Arc::new(responder),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// Returns one artifact per requested sample, each encoding `bytes`
    pub fn with_image(bytes: &[u8]) -> Self {
        let bytes = bytes.to_vec();
        Self::from_fn(move |request| {
            Ok((0..request.samples.max(1))
                .map(|_| ImageArtifact::from_bytes(&bytes))
                .collect())
        })
    }

    pub fn failing(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::from_fn(move |_| Err(LLMError::Api(format!("Non-200 response from API: {}", message))))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ImageGenerationRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ImageProvider for MockImageProvider {
    async fn text_to_image(&self, request: &ImageGenerationRequest) -> Result<Vec<ImageArtifact>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.responder)(request)
    }
}
