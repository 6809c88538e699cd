use std::path::{Path, PathBuf};
use std::sync::Arc;

use primer_core::Config;
use primer_pipeline::Pipeline;

use crate::error::AppError;

pub struct AppState {
    // `None` when startup failed; requests then answer 500 instead of the server exiting.
    pipeline: Option<Arc<Pipeline>>,
    image_dir: PathBuf,
}

impl AppState {
    pub fn new_with_config(config: &Config) -> Self {
        let image_dir = config.image_dir();
        log::info!("Initializing pipeline, images at: {:?}", image_dir);

        let pipeline = match Pipeline::from_config(config) {
            Ok(pipeline) => Some(Arc::new(pipeline)),
            Err(e) => {
                log::error!("CRITICAL ERROR during initialization: {}", e);
                None
            }
        };

        Self {
            pipeline,
            image_dir,
        }
    }

    /// State around an already-built pipeline; images are served from its cache directory.
    pub fn from_pipeline(pipeline: Pipeline) -> Self {
        let image_dir = pipeline.image_cache().dir().to_path_buf();
        Self {
            pipeline: Some(Arc::new(pipeline)),
            image_dir,
        }
    }

    /// State whose pipeline failed to start.
    pub fn uninitialized(image_dir: impl Into<PathBuf>) -> Self {
        Self {
            pipeline: None,
            image_dir: image_dir.into(),
        }
    }

    pub fn pipeline(&self) -> Result<&Pipeline, AppError> {
        self.pipeline.as_deref().ok_or(AppError::PipelineUnavailable)
    }

    pub fn is_ready(&self) -> bool {
        self.pipeline.is_some()
    }

    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }
}
