use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use futures::FutureExt;
use primer_core::{CacheKeyMode, Config, ResultRecord};
use primer_llm::{CerebrasProvider, CompletionProvider, ImageProvider, StabilityProvider};

use crate::enricher::PromptEnricher;
use crate::error::PipelineError;
use crate::explainer::Explainer;
use crate::extractor::{is_error_sentinel, SubjectExtractor};
use crate::image_cache::ImageCache;
use crate::prompts;

/// Images requested per subject.
const IMAGES_PER_SUBJECT: u32 = 1;

/// Options for a [`Pipeline`].
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub image_dir: PathBuf,
    pub cache_key_mode: CacheKeyMode,
    /// Subject `i` of a run is generated with seed `base_seed + i`.
    pub base_seed: u64,
}

impl From<&Config> for PipelineOptions {
    fn from(config: &Config) -> Self {
        Self {
            image_dir: config.image_dir(),
            cache_key_mode: config.cache_key_mode,
            base_seed: config.base_seed,
        }
    }
}

/// Topic → per-subject illustrated explanations.
///
/// Holds no state between runs apart from the image cache directory.
pub struct Pipeline {
    extractor: SubjectExtractor,
    enricher: PromptEnricher,
    explainer: Explainer,
    images: ImageCache,
    base_seed: u64,
}

impl Pipeline {
    pub fn new(
        llm: Arc<dyn CompletionProvider>,
        image_provider: Arc<dyn ImageProvider>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            extractor: SubjectExtractor::new(llm.clone()),
            enricher: PromptEnricher::new(llm.clone()),
            explainer: Explainer::new(llm),
            images: ImageCache::new(image_provider, options.image_dir)
                .with_key_mode(options.cache_key_mode),
            base_seed: options.base_seed,
        }
    }

    /// Builds the hosted providers from `config` and prepares the image directory.
    pub fn from_config(config: &Config) -> Result<Self, PipelineError> {
        config.validate()?;

        let timeout = config.request_timeout_secs.map(Duration::from_secs);
        let llm = CerebrasProvider::new(config.completion_api_key.clone().unwrap_or_default())
            .with_base_url(config.completion_base_url.clone())
            .with_model(config.completion_model.clone())
            .with_timeout(timeout);
        let images = StabilityProvider::new(config.image_api_key.clone().unwrap_or_default())
            .with_api_host(config.image_base_url.clone())
            .with_engine(config.image_engine.clone())
            .with_timeout(timeout);

        let options = PipelineOptions::from(config);
        std::fs::create_dir_all(&options.image_dir)?;
        log::info!(
            "Pipeline ready (model: {}, images: {:?}, cache keys: {})",
            config.completion_model,
            options.image_dir,
            options.cache_key_mode
        );

        Ok(Self::new(Arc::new(llm), Arc::new(images), options))
    }

    pub fn extractor(&self) -> &SubjectExtractor {
        &self.extractor
    }

    pub fn enricher(&self) -> &PromptEnricher {
        &self.enricher
    }

    pub fn explainer(&self) -> &Explainer {
        &self.explainer
    }

    pub fn image_cache(&self) -> &ImageCache {
        &self.images
    }

    /// Runs the whole pipeline for `topic`.
    ///
    /// Returns one record per extracted subject in extraction order. A failed extraction
    /// yields an empty result.
    pub async fn run(&self, topic: &str) -> Vec<ResultRecord> {
        log::info!("Starting pipeline for topic '{}'", topic.trim());

        let subjects = self.extractor.extract_concepts(topic).await;
        match subjects.first() {
            None => {
                log::error!("Entity extraction returned no subjects");
                return Vec::new();
            }
            Some(first) if is_error_sentinel(first) => {
                log::error!("Entity extraction failed: {:?}", subjects);
                return Vec::new();
            }
            Some(_) => {}
        }

        let tasks = subjects.iter().enumerate().map(|(i, subject)| {
            let seed = self.base_seed.wrapping_add(i as u64);
            async move {
                match AssertUnwindSafe(self.process_subject(subject, seed))
                    .catch_unwind()
                    .await
                {
                    Ok(record) => record,
                    Err(panic) => {
                        let error = PipelineError::TaskPanicked(panic_message(panic.as_ref()));
                        log::error!("[{}] {}", subject, error);
                        ResultRecord::failure(subject.clone(), error.to_string())
                    }
                }
            }
        });

        let records = join_all(tasks).await;
        let failed = records.iter().filter(|r| !r.is_success()).count();
        log::info!(
            "Pipeline finished: {} subject(s), {} failed",
            records.len(),
            failed
        );
        records
    }

    /// Enriches, explains and illustrates one subject. Errors become a failure record.
    pub async fn process_subject(&self, subject: &str, seed: u64) -> ResultRecord {
        match self.try_process_subject(subject, seed).await {
            Ok(record) => record,
            Err(e) => {
                log::warn!("[{}] {}", subject, e);
                ResultRecord::failure(subject, e.to_string())
            }
        }
    }

    async fn try_process_subject(
        &self,
        subject: &str,
        seed: u64,
    ) -> Result<ResultRecord, PipelineError> {
        log::info!("[{}] Processing subject (seed {})", subject, seed);

        let focus = prompts::child_explanation_focus(subject);
        let (prompt, explanation) = futures::join!(
            self.enricher.enrich(subject),
            self.explainer.explain(subject, &focus)
        );
        log::debug!("[{}] Image prompt: {}", subject, prompt);

        let fetch = self
            .images
            .fetch(subject, &prompt.text, seed, IMAGES_PER_SUBJECT)
            .await;
        let image_path = fetch
            .first_path()
            .ok_or_else(|| PipelineError::ImageGeneration(subject.to_string()))?
            .to_string_lossy()
            .into_owned();

        Ok(ResultRecord::Success {
            entity: subject.to_string(),
            prompt: prompt.into_text(),
            image_path,
            explanation: explanation.render(),
        })
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
