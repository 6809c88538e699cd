use std::sync::Arc;

use primer_core::{Explanation, PotentialEntity};
use primer_llm::CompletionProvider;
use serde::Deserialize;

use crate::completion::complete_with;
use crate::error::PipelineError;
use crate::prompts;

const DECLINING_FOCUS: &[&str] = &["no", "none", ""];

/// True when the focus directive means "no focused exploration".
pub fn is_declined_focus(focus: &str) -> bool {
    DECLINING_FOCUS.contains(&focus.trim().to_lowercase().as_str())
}

#[derive(Debug, Deserialize)]
struct EntityEnvelope {
    #[serde(default)]
    entities: Vec<PotentialEntity>,
}

/// Parses the JSON object between the first `{` and the last `}` of a model reply.
pub fn parse_entity_listing(response: &str) -> Result<Vec<PotentialEntity>, PipelineError> {
    let json = match (response.find('{'), response.rfind('}')) {
        (Some(start), Some(end)) if start < end => &response[start..=end],
        _ => "",
    };

    serde_json::from_str::<EntityEnvelope>(json)
        .map(|envelope| envelope.entities)
        .map_err(|e| PipelineError::InvalidJson(e.to_string()))
}

/// Generates explanatory text about a subject.
pub struct Explainer {
    llm: Arc<dyn CompletionProvider>,
}

impl Explainer {
    pub fn new(llm: Arc<dyn CompletionProvider>) -> Self {
        Self { llm }
    }

    /// Answers `focus` for `subject` without meta-commentary.
    ///
    /// A declining focus (`no`, `none`, empty) short-circuits without a model call.
    pub async fn explain(&self, subject: &str, focus: &str) -> Explanation {
        if is_declined_focus(focus) {
            return Explanation::Declined;
        }

        let prompt = prompts::focused_explanation(subject, focus);
        match complete_with(self.llm.as_ref(), &prompt, str::to_string).await {
            Ok(text) => Explanation::Generated(text),
            Err(e) => {
                log::warn!("Completion error explaining '{}': {}", subject, e);
                Explanation::Failed(e.to_string())
            }
        }
    }

    /// Multi-paragraph exploration sized to roughly `minutes_to_read` minutes.
    pub async fn explore(&self, interest: &str, minutes_to_read: u32) -> Explanation {
        let prompt = prompts::exploration(interest, minutes_to_read);
        match complete_with(self.llm.as_ref(), &prompt, str::to_string).await {
            Ok(text) => Explanation::Generated(text),
            Err(e) => {
                log::warn!("Completion error exploring '{}': {}", interest, e);
                Explanation::Failed(e.to_string())
            }
        }
    }

    /// Asks the model for three visualisable entities mentioned in `text`.
    pub async fn potential_entities(
        &self,
        text: &str,
        interest: &str,
    ) -> Result<Vec<PotentialEntity>, PipelineError> {
        let prompt = prompts::potential_entities(text, interest);
        let response = self
            .llm
            .complete(&prompt)
            .await
            .map_err(|e| PipelineError::EntityExtraction(e.to_string()))?;

        parse_entity_listing(&response)
    }
}
