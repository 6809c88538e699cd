use std::fmt;

use serde::{Deserialize, Serialize};

/// Returned by the explainer when the caller declines a focused exploration.
pub const DECLINE_MESSAGE: &str = "No problem! Feel free to ask for a focused exploration anytime.";

/// Per-subject output of a pipeline run.
///
/// Serializes without a tag so the wire shape is either
/// `{entity, prompt, image_path, explanation}` or `{entity, error}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultRecord {
    Success {
        entity: String,
        prompt: String,
        image_path: String,
        explanation: String,
    },
    Failure {
        entity: String,
        error: String,
    },
}

impl ResultRecord {
    pub fn failure(entity: impl Into<String>, error: impl Into<String>) -> Self {
        Self::Failure {
            entity: entity.into(),
            error: error.into(),
        }
    }

    pub fn entity(&self) -> &str {
        match self {
            Self::Success { entity, .. } | Self::Failure { entity, .. } => entity,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failure { error, .. } => Some(error),
            Self::Success { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptSource {
    /// Hand-curated entry from the static table; no model call was made.
    Template,
    Model,
    /// The model call failed and the generic photograph prompt was used.
    Fallback,
}

/// An image-generation prompt together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedPrompt {
    pub text: String,
    pub source: PromptSource,
}

impl EnrichedPrompt {
    pub fn new(text: impl Into<String>, source: PromptSource) -> Self {
        Self {
            text: text.into(),
            source,
        }
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

impl fmt::Display for EnrichedPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Outcome of an explanation request.
///
/// Failures are data: [`Explanation::render`] turns every variant into the text shown to
/// the user, including `"Error generating content: ..."` for failed calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "text", rename_all = "snake_case")]
pub enum Explanation {
    Generated(String),
    Declined,
    Failed(String),
}

impl Explanation {
    pub fn render(&self) -> String {
        self.to_string()
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generated(text) => f.write_str(text),
            Self::Declined => f.write_str(DECLINE_MESSAGE),
            Self::Failed(message) => write!(f, "Error generating content: {}", message),
        }
    }
}

/// A visualisable entity suggested by the model for an interest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PotentialEntity {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub relevance: String,
}
