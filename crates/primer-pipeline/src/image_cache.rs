//! Entity-keyed image cache in front of the image-generation service.
//!
//! The cache directory is a flat set of `{key}.png` files. A file's existence is the only
//! hit signal: no TTL, no content hash, no invalidation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use primer_core::CacheKeyMode;
use primer_llm::{ImageGenerationRequest, ImageProvider, LLMError};
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use crate::error::PipelineError;

const IMAGE_EXTENSION: &str = "png";
const FINGERPRINT_LEN: usize = 12;

/// Filesystem-safe key for an entity name.
///
/// Keeps alphanumerics, space, hyphen and underscore, trims surrounding whitespace,
/// turns spaces into underscores and lowercases. `"Tree Frog"` and `"tree frog "` both map
/// to `tree_frog`.
pub fn normalize_entity(entity: &str) -> String {
    let kept: String = entity
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();

    kept.trim().replace(' ', "_").to_lowercase()
}

fn fingerprint(prompt: &str, seed: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prompt.as_bytes());
    hasher.update([0u8]);
    hasher.update(seed.to_le_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..FINGERPRINT_LEN].to_string()
}

/// Outcome of [`ImageCache::fetch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageFetch {
    CacheHit(PathBuf),
    Generated(Vec<PathBuf>),
    Failed(String),
}

impl ImageFetch {
    /// Written or cached paths; empty on failure.
    pub fn paths(&self) -> Vec<PathBuf> {
        match self {
            Self::CacheHit(path) => vec![path.clone()],
            Self::Generated(paths) => paths.clone(),
            Self::Failed(_) => Vec::new(),
        }
    }

    pub fn first_path(&self) -> Option<&Path> {
        match self {
            Self::CacheHit(path) => Some(path),
            Self::Generated(paths) => paths.first().map(PathBuf::as_path),
            Self::Failed(_) => None,
        }
    }

    pub fn is_cache_hit(&self) -> bool {
        matches!(self, Self::CacheHit(_))
    }
}

pub struct ImageCache {
    provider: Arc<dyn ImageProvider>,
    dir: PathBuf,
    key_mode: CacheKeyMode,
    // Serializes fetches of the same key so duplicate subjects generate once.
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ImageCache {
    pub fn new(provider: Arc<dyn ImageProvider>, dir: impl Into<PathBuf>) -> Self {
        Self {
            provider,
            dir: dir.into(),
            key_mode: CacheKeyMode::Entity,
            locks: DashMap::new(),
        }
    }

    pub fn with_key_mode(mut self, key_mode: CacheKeyMode) -> Self {
        self.key_mode = key_mode;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn key_mode(&self) -> CacheKeyMode {
        self.key_mode
    }

    /// Cache file stem for a request. In [`CacheKeyMode::Entity`] prompt and seed are
    /// ignored.
    pub fn cache_key(&self, entity: &str, prompt: &str, seed: u64) -> String {
        let mut key = normalize_entity(entity);
        if key.is_empty() {
            key.push_str("untitled");
        }

        match self.key_mode {
            CacheKeyMode::Entity => key,
            CacheKeyMode::Fingerprint => format!("{}-{}", key, fingerprint(prompt, seed)),
        }
    }

    pub fn path_for(&self, entity: &str, prompt: &str, seed: u64) -> PathBuf {
        self.dir
            .join(format!("{}.{}", self.cache_key(entity, prompt, seed), IMAGE_EXTENSION))
    }

    /// Returns the cached image for `entity`, generating it on a miss.
    ///
    /// Every artifact of a multi-sample response maps to the same entity-keyed path, so at
    /// most one file results and it holds the last sample.
    pub async fn fetch(&self, entity: &str, prompt: &str, seed: u64, num_images: u32) -> ImageFetch {
        let key = self.cache_key(entity, prompt, seed);
        let output_path = self.path_for(entity, prompt, seed);

        let lock = self
            .locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let fetch = {
            let _guard = lock.lock().await;
            self.fetch_locked(entity, prompt, seed, num_images, output_path)
                .await
        };

        // Forget the key once no other fetch holds or waits on its lock.
        drop(lock);
        self.locks
            .remove_if(&key, |_, lock| Arc::strong_count(lock) == 1);

        fetch
    }

    async fn fetch_locked(
        &self,
        entity: &str,
        prompt: &str,
        seed: u64,
        num_images: u32,
        output_path: PathBuf,
    ) -> ImageFetch {
        if tokio::fs::try_exists(&output_path).await.unwrap_or(false) {
            log::info!(
                "Cache hit for '{}', returning {}",
                entity,
                output_path.display()
            );
            return ImageFetch::CacheHit(output_path);
        }

        log::info!("Cache miss for '{}', generating image for: '{}'", entity, prompt);
        match self.generate(prompt, seed, num_images, &output_path).await {
            Ok(paths) => ImageFetch::Generated(paths),
            Err(e) => {
                log::error!("Image generation failed for '{}': {}", entity, e);
                ImageFetch::Failed(e.to_string())
            }
        }
    }

    async fn generate(
        &self,
        prompt: &str,
        seed: u64,
        num_images: u32,
        output_path: &Path,
    ) -> Result<Vec<PathBuf>, PipelineError> {
        let request = ImageGenerationRequest::new(prompt, seed).with_samples(num_images);
        let artifacts = self.provider.text_to_image(&request).await?;

        // All samples share one path and only the last is kept. Decode every one of them
        // before the path is touched.
        let decoded = artifacts
            .iter()
            .map(|artifact| artifact.decode())
            .collect::<Result<Vec<_>, _>>()?;
        let Some(bytes) = decoded.last() else {
            return Err(LLMError::Api("service returned no artifacts".to_string()).into());
        };

        tokio::fs::create_dir_all(&self.dir).await?;
        let staging = output_path.with_extension(format!("{}.part", IMAGE_EXTENSION));
        tokio::fs::write(&staging, bytes).await?;
        tokio::fs::rename(&staging, output_path).await?;
        log::info!(
            "Image saved to {} ({} sample(s) returned)",
            output_path.display(),
            decoded.len()
        );

        Ok(vec![output_path.to_path_buf()])
    }
}
