use std::collections::HashMap;
use std::sync::Arc;

use primer_core::{EnrichedPrompt, PromptSource};
use primer_llm::CompletionProvider;

use crate::completion::complete_with;
use crate::prompts;

const DEFAULT_TEMPLATES: &[(&str, &str)] = &[
    (
        "Earth",
        "a high-quality, realistic photograph of the planet Earth from space",
    ),
    (
        "Sun",
        "a scientifically accurate photograph of the Sun, showing its fiery surface and solar flares",
    ),
    (
        "Moon",
        "a detailed photograph of the Moon's surface, showing craters clearly",
    ),
    (
        "Galaxy",
        "a beautiful deep space photograph of a spiral galaxy",
    ),
    (
        "Blackhole",
        "a scientifically accurate photograph of a black hole with its accretion disk",
    ),
];

/// Title-cases `value` word by word: a letter is uppercased when it follows a non-letter,
/// lowercased otherwise.
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut previous_is_letter = false;

    for c in value.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(c);
            previous_is_letter = false;
        }
    }

    out
}

/// Turns a subject into an image-generation prompt.
pub struct PromptEnricher {
    llm: Arc<dyn CompletionProvider>,
    templates: HashMap<String, String>,
}

impl PromptEnricher {
    pub fn new(llm: Arc<dyn CompletionProvider>) -> Self {
        let templates = DEFAULT_TEMPLATES
            .iter()
            .map(|(name, prompt)| (name.to_string(), prompt.to_string()))
            .collect();
        Self { llm, templates }
    }

    /// Static prompt for a well-known subject, matched on its title-cased name.
    pub fn template_for(&self, subject: &str) -> Option<&str> {
        self.templates
            .get(&title_case(subject))
            .map(String::as_str)
    }

    /// Never fails: a completion error yields the generic photograph prompt.
    pub async fn enrich(&self, subject: &str) -> EnrichedPrompt {
        if let Some(template) = self.template_for(subject) {
            log::info!("Found template for '{}'", subject);
            return EnrichedPrompt::new(template, PromptSource::Template);
        }

        log::info!("No template found for '{}', enriching with the model", subject);
        let prompt = prompts::photograph_prompt(subject);
        match complete_with(self.llm.as_ref(), &prompt, str::to_string).await {
            Ok(text) => EnrichedPrompt::new(text, PromptSource::Model),
            Err(e) => {
                log::warn!("Completion error enriching prompt for '{}': {}", subject, e);
                EnrichedPrompt::new(prompts::fallback_photograph(subject), PromptSource::Fallback)
            }
        }
    }

    /// Enriches each subject in turn, keeping input order.
    pub async fn enrich_all(&self, subjects: &[String]) -> Vec<(String, EnrichedPrompt)> {
        let mut enriched = Vec::with_capacity(subjects.len());
        for subject in subjects {
            enriched.push((subject.clone(), self.enrich(subject).await));
        }
        enriched
    }
}
