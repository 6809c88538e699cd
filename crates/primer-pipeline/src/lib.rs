pub mod completion;
pub mod enricher;
pub mod error;
pub mod explainer;
pub mod extractor;
pub mod image_cache;
pub mod orchestrator;
pub mod prompts;

pub use enricher::PromptEnricher;
pub use error::PipelineError;
pub use explainer::Explainer;
pub use extractor::SubjectExtractor;
pub use image_cache::{normalize_entity, ImageCache, ImageFetch};
pub use orchestrator::{Pipeline, PipelineOptions};
