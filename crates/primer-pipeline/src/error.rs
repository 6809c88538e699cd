use primer_core::ConfigError;
use primer_llm::LLMError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Entity extraction failed: {0}")]
    Extraction(String),

    #[error("API image generation failed for {0}")]
    ImageGeneration(String),

    #[error("Invalid JSON returned by model. Error: {0}")]
    InvalidJson(String),

    #[error("Error extracting entities: {0}")]
    EntityExtraction(String),

    #[error("Subject task panicked: {0}")]
    TaskPanicked(String),

    #[error("LLM error: {0}")]
    LLM(#[from] LLMError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
