//! Prompt templates sent to the completion service.

/// Words per minute of reading time used to size explorations.
pub const WORDS_PER_MINUTE: u32 = 250;

pub fn subject_extraction(text: &str) -> String {
    format!(
        r#"From the user's question or topic below, identify the single most important physical subject (a character, object, or place).

Rules:
1. IMPORTANT: Return only the main subject.
2. Do not return abstract ideas such as "information", "explanation" or "color".
3. Return only a single, comma-separated word or name.

Example Input: Tell me about the Eiffel Tower in Paris.
Example Output: Eiffel Tower

Example Input: Superman
Example Output: Superman

Example Input: Which is the longest river in India?
Example Output: Ganges River

User's question or topic to analyze:
"{text}""#
    )
}

pub fn photograph_prompt(subject: &str) -> String {
    format!(
        r#"You write simple, clear and descriptive prompts for an AI image generator.
Turn the concept below into a prompt for a high-quality, realistic photograph.

Rules:
- Start the prompt with "a high-quality, detailed photograph of..."
- Add one or two key descriptive details about the entity.
- Do not use artistic or cinematic words such as "dramatic", "8k" or "hyperdetailed".
- Return only the prompt text.

Example Input: Frog
Example Output: a high-quality, detailed photograph of a green tree frog sitting on a wet leaf

Create a prompt for the following entity: {subject}"#
    )
}

/// Prompt used when the completion call for [`photograph_prompt`] fails.
pub fn fallback_photograph(subject: &str) -> String {
    format!("a high-quality photograph of {}", subject)
}

pub fn focused_explanation(subject: &str, focus: &str) -> String {
    format!(
        r#"Follow the user's instruction precisely and nothing more.
Do not add commentary, analysis or reflection about your own response.
Only provide the educational text that is requested.

User's instruction: "{focus}" for the topic "{subject}"."#
    )
}

/// Focus directive the pipeline uses for every subject.
pub fn child_explanation_focus(subject: &str) -> String {
    format!(
        "a simple, one-paragraph explanation of what a {} is, for a child",
        subject
    )
}

pub fn exploration(interest: &str, minutes_to_read: u32) -> String {
    let word_count = minutes_to_read.max(1) * WORDS_PER_MINUTE;
    format!(
        r#"Generate an engaging exploration about {interest}. The response should:
- Be approximately {word_count} words
- Be structured in 3-4 clear paragraphs
- Include specific examples and insights
- Be written in an enthusiastic, knowledgeable tone
- Highlight what makes {interest} fascinating"#
    )
}

pub fn potential_entities(text: &str, interest: &str) -> String {
    format!(
        r#"Analyze the following text about {interest} and identify 3 physical entities
(objects, places, or things) that would be most suitable for visual representation.

Return ONLY a valid JSON object with an 'entities' array containing exactly 3 objects with these properties:
- "name": The specific name of the entity
- "description": A brief, clear description focusing on visual aspects
- "relevance": Why this entity is important to understanding {interest}

Text:
{text}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_prompt_embeds_topic_in_quotes() {
        let prompt = subject_extraction("Tell me about frogs");
        assert!(prompt.ends_with("\"Tell me about frogs\""));
    }

    #[test]
    fn exploration_sizes_by_reading_time() {
        assert!(exploration("volcanoes", 2).contains("approximately 500 words"));
        assert!(exploration("volcanoes", 0).contains("approximately 250 words"));
    }

    #[test]
    fn child_focus_names_subject() {
        assert_eq!(
            child_explanation_focus("Moon"),
            "a simple, one-paragraph explanation of what a Moon is, for a child"
        );
    }
}
