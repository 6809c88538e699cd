use std::sync::Arc;

use primer_llm::CompletionProvider;

use crate::completion::complete_with;
use crate::error::PipelineError;
use crate::prompts;

/// Prefix marking an extraction failure rendered as a subject list.
pub const ERROR_SENTINEL_PREFIX: &str = "error:";

/// True when `subject` has the `error: ...` shape of a failed extraction.
pub fn is_error_sentinel(subject: &str) -> bool {
    subject
        .trim_start()
        .to_ascii_lowercase()
        .starts_with(ERROR_SENTINEL_PREFIX)
}

/// Splits a comma-separated model reply into trimmed, non-empty subjects.
pub fn parse_subjects(response: &str) -> Vec<String> {
    response
        .split(',')
        .map(str::trim)
        .filter(|subject| !subject.is_empty())
        .map(str::to_string)
        .collect()
}

/// Finds the primary physical subject of a free-text topic.
pub struct SubjectExtractor {
    llm: Arc<dyn CompletionProvider>,
}

impl SubjectExtractor {
    pub fn new(llm: Arc<dyn CompletionProvider>) -> Self {
        Self { llm }
    }

    /// One completion call, no retries. The model's answer is trusted as physical.
    pub async fn extract(&self, text: &str) -> Result<Vec<String>, PipelineError> {
        log::info!("Extracting main subject from '{}'", text.trim());
        let prompt = prompts::subject_extraction(text);

        match complete_with(self.llm.as_ref(), &prompt, parse_subjects).await {
            Ok(subjects) => {
                log::info!("Extracted subject(s): {:?}", subjects);
                Ok(subjects)
            }
            Err(e) => {
                log::error!("Completion error during subject extraction: {}", e);
                Err(PipelineError::Extraction(e.to_string()))
            }
        }
    }

    /// List form of [`extract`](Self::extract): a failure becomes a single
    /// `error: {message}` element.
    pub async fn extract_concepts(&self, text: &str) -> Vec<String> {
        match self.extract(text).await {
            Ok(subjects) => subjects,
            Err(PipelineError::Extraction(message)) => {
                vec![format!("{} {}", ERROR_SENTINEL_PREFIX, message)]
            }
            Err(other) => vec![format!("{} {}", ERROR_SENTINEL_PREFIX, other)],
        }
    }
}
