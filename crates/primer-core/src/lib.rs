pub mod config;
pub mod error;
pub mod types;

pub use config::{CacheKeyMode, Config};
pub use error::ConfigError;
pub use types::{
    EnrichedPrompt, Explanation, PotentialEntity, PromptSource, ResultRecord, DECLINE_MESSAGE,
};
