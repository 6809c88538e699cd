//! Single-call completion helper shared by the extractor, enricher and explainer.

use primer_llm::{CompletionProvider, Result};

/// Sends `prompt` once, trims the reply and hands it to `post`.
///
/// No retries. Callers map the error into their own fallback value.
pub async fn complete_with<T, F>(provider: &dyn CompletionProvider, prompt: &str, post: F) -> Result<T>
where
    F: FnOnce(&str) -> T,
{
    let raw = provider.complete(prompt).await?;
    log::debug!(
        "Completion from {} returned {} chars",
        provider.model(),
        raw.len()
    );
    Ok(post(raw.trim()))
}
