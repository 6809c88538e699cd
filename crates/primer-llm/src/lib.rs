pub mod client;
pub mod mock;
pub mod provider;
pub mod providers;

pub use client::build_client;
pub use mock::{MockCompletionProvider, MockImageProvider};
pub use provider::{
    CompletionProvider, ImageArtifact, ImageGenerationRequest, ImageProvider, LLMError, Result,
};
pub use providers::{CerebrasProvider, StabilityProvider};
