//! Hosted service providers
//!
//! Text completion goes through an OpenAI-compatible chat endpoint (Cerebras by default),
//! image generation through the Stability AI REST API.

pub mod cerebras;
pub mod stability;

pub use cerebras::CerebrasProvider;
pub use stability::StabilityProvider;
