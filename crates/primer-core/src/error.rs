use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("CEREBRAS_API_KEY not found in environment or config file")]
    MissingCompletionKey,

    #[error("STABILITY_API_KEY not found in environment or config file")]
    MissingImageKey,

    #[error("Invalid cache key mode '{0}' (expected 'entity' or 'fingerprint')")]
    InvalidCacheKeyMode(String),
}
