use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_COMPLETION_BASE_URL: &str = "https://api.cerebras.ai/v1";
pub const DEFAULT_COMPLETION_MODEL: &str = "qwen-3-235b-a22b-instruct-2507";
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://api.stability.ai";
pub const DEFAULT_IMAGE_ENGINE: &str = "stable-diffusion-xl-1024-v1-0";
pub const DEFAULT_OUTPUT_DIR: &str = "pipeline_outputs";
pub const DEFAULT_BASE_SEED: u64 = 42;
pub const GENERATED_IMAGES_DIR: &str = "generated_images";

const CONFIG_FILE_PATH: &str = "primer.toml";

/// How cached image files are named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheKeyMode {
    /// `{entity}.png`: the cached image is reused whatever prompt or seed is requested.
    #[default]
    Entity,
    /// `{entity}-{hash(prompt, seed)}.png`: a changed prompt or seed misses the cache.
    Fingerprint,
}

impl FromStr for CacheKeyMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "entity" => Ok(Self::Entity),
            "fingerprint" => Ok(Self::Fingerprint),
            other => Err(ConfigError::InvalidCacheKeyMode(other.to_string())),
        }
    }
}

impl fmt::Display for CacheKeyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entity => f.write_str("entity"),
            Self::Fingerprint => f.write_str("fingerprint"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub completion_api_key: Option<String>,
    pub completion_base_url: String,
    pub completion_model: String,
    pub image_api_key: Option<String>,
    pub image_base_url: String,
    pub image_engine: String,
    pub output_dir: PathBuf,
    pub base_seed: u64,
    pub cache_key_mode: CacheKeyMode,
    /// Per-request timeout for both hosted services. `None` waits indefinitely.
    pub request_timeout_secs: Option<u64>,
}

fn primer_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".primer")
}

fn primer_config_json_path() -> PathBuf {
    primer_dir().join("config.json")
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            completion_api_key: None,
            completion_base_url: DEFAULT_COMPLETION_BASE_URL.to_string(),
            completion_model: DEFAULT_COMPLETION_MODEL.to_string(),
            image_api_key: None,
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            image_engine: DEFAULT_IMAGE_ENGINE.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            base_seed: DEFAULT_BASE_SEED,
            cache_key_mode: CacheKeyMode::Entity,
            request_timeout_secs: None,
        }
    }
}

impl Config {
    /// Loads `~/.primer/config.json`, falling back to `./primer.toml`, then applies
    /// environment overrides.
    pub fn new() -> Self {
        let mut config = Self::load_from(&primer_config_json_path(), Path::new(CONFIG_FILE_PATH));
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Reads the first config file that exists and parses. The JSON file wins over TOML.
    pub fn load_from(json_path: &Path, toml_path: &Path) -> Self {
        if json_path.exists() {
            match std::fs::read_to_string(json_path) {
                Ok(content) => match serde_json::from_str::<Config>(&content) {
                    Ok(config) => {
                        log::info!("Loaded config from {:?}", json_path);
                        return config;
                    }
                    Err(e) => log::warn!("Failed to parse {:?}: {}", json_path, e),
                },
                Err(e) => log::warn!("Failed to read {:?}: {}", json_path, e),
            }
        }

        if toml_path.exists() {
            match std::fs::read_to_string(toml_path) {
                Ok(content) => match toml::from_str::<Config>(&content) {
                    Ok(config) => {
                        log::info!("Loaded config from {:?}", toml_path);
                        return config;
                    }
                    Err(e) => log::warn!("Failed to parse {:?}: {}", toml_path, e),
                },
                Err(e) => log::warn!("Failed to read {:?}: {}", toml_path, e),
            }
        }

        Self::default()
    }

    /// Applies environment overrides through `lookup`. Unparseable values are logged and
    /// skipped.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("CEREBRAS_API_KEY").and_then(non_empty) {
            self.completion_api_key = Some(key);
        }
        if let Some(url) = lookup("PRIMER_COMPLETION_BASE_URL").and_then(non_empty) {
            self.completion_base_url = url;
        }
        if let Some(model) = lookup("PRIMER_COMPLETION_MODEL").and_then(non_empty) {
            self.completion_model = model;
        }
        if let Some(key) = lookup("STABILITY_API_KEY").and_then(non_empty) {
            self.image_api_key = Some(key);
        }
        if let Some(url) = lookup("PRIMER_IMAGE_BASE_URL").and_then(non_empty) {
            self.image_base_url = url;
        }
        if let Some(engine) = lookup("PRIMER_IMAGE_ENGINE").and_then(non_empty) {
            self.image_engine = engine;
        }
        if let Some(dir) = lookup("PRIMER_OUTPUT_DIR").and_then(non_empty) {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(seed) = lookup("PRIMER_BASE_SEED").and_then(non_empty) {
            match seed.parse() {
                Ok(seed) => self.base_seed = seed,
                Err(_) => log::warn!("Ignoring invalid PRIMER_BASE_SEED: {}", seed),
            }
        }
        if let Some(mode) = lookup("PRIMER_CACHE_KEY_MODE").and_then(non_empty) {
            match mode.parse() {
                Ok(mode) => self.cache_key_mode = mode,
                Err(e) => log::warn!("Ignoring PRIMER_CACHE_KEY_MODE: {}", e),
            }
        }
        if let Some(timeout) = lookup("PRIMER_REQUEST_TIMEOUT_SECS").and_then(non_empty) {
            match timeout.parse() {
                Ok(secs) => self.request_timeout_secs = Some(secs),
                Err(_) => log::warn!("Ignoring invalid PRIMER_REQUEST_TIMEOUT_SECS: {}", timeout),
            }
        }
    }

    /// Directory holding the cached `{key}.png` files.
    pub fn image_dir(&self) -> PathBuf {
        self.output_dir.join(GENERATED_IMAGES_DIR)
    }

    /// Presence check for the credentials both hosted services need.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.completion_api_key.as_deref().map_or(true, str::is_empty) {
            return Err(ConfigError::MissingCompletionKey);
        }
        if self.image_api_key.as_deref().map_or(true, str::is_empty) {
            return Err(ConfigError::MissingImageKey);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_hosted_services() {
        let config = Config::default();
        assert_eq!(config.completion_model, DEFAULT_COMPLETION_MODEL);
        assert_eq!(config.image_engine, DEFAULT_IMAGE_ENGINE);
        assert_eq!(config.base_seed, 42);
        assert_eq!(config.cache_key_mode, CacheKeyMode::Entity);
        assert!(config.request_timeout_secs.is_none());
        assert_eq!(
            config.image_dir(),
            PathBuf::from("pipeline_outputs").join("generated_images")
        );
    }

    #[test]
    fn env_overrides_keys_and_tuning() {
        let mut config = Config::default();
        config.apply_env(env(&[
            ("CEREBRAS_API_KEY", "csk"),
            ("STABILITY_API_KEY", " sk "),
            ("PRIMER_CACHE_KEY_MODE", "Fingerprint"),
            ("PRIMER_REQUEST_TIMEOUT_SECS", "30"),
            ("PRIMER_BASE_SEED", "7"),
        ]));

        assert_eq!(config.completion_api_key.as_deref(), Some("csk"));
        assert_eq!(config.image_api_key.as_deref(), Some("sk"));
        assert_eq!(config.cache_key_mode, CacheKeyMode::Fingerprint);
        assert_eq!(config.request_timeout_secs, Some(30));
        assert_eq!(config.base_seed, 7);
    }

    #[test]
    fn invalid_env_values_are_ignored() {
        let mut config = Config::default();
        config.apply_env(env(&[
            ("PRIMER_CACHE_KEY_MODE", "sometimes"),
            ("PRIMER_REQUEST_TIMEOUT_SECS", "soon"),
            ("CEREBRAS_API_KEY", "   "),
        ]));

        assert_eq!(config.cache_key_mode, CacheKeyMode::Entity);
        assert!(config.request_timeout_secs.is_none());
        assert!(config.completion_api_key.is_none());
    }

    #[test]
    fn validate_reports_missing_keys() {
        let mut config = Config::default();
        assert_eq!(config.validate(), Err(ConfigError::MissingCompletionKey));

        config.completion_api_key = Some("csk".into());
        assert_eq!(config.validate(), Err(ConfigError::MissingImageKey));

        config.image_api_key = Some("sk".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn json_file_takes_precedence_over_toml() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("config.json");
        let toml_path = dir.path().join("primer.toml");
        std::fs::write(&json_path, r#"{"completion_model": "from-json"}"#).unwrap();
        std::fs::write(&toml_path, "completion_model = \"from-toml\"\n").unwrap();

        let config = Config::load_from(&json_path, &toml_path);
        assert_eq!(config.completion_model, "from-json");
        assert_eq!(config.image_engine, DEFAULT_IMAGE_ENGINE);
    }

    #[test]
    fn toml_file_used_when_json_missing() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join("primer.toml");
        std::fs::write(
            &toml_path,
            "output_dir = \"/tmp/primer\"\ncache_key_mode = \"fingerprint\"\n",
        )
        .unwrap();

        let config = Config::load_from(&dir.path().join("missing.json"), &toml_path);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/primer"));
        assert_eq!(config.cache_key_mode, CacheKeyMode::Fingerprint);
    }

    #[test]
    fn cache_key_mode_parses_case_insensitively() {
        assert_eq!("ENTITY".parse::<CacheKeyMode>(), Ok(CacheKeyMode::Entity));
        assert!(matches!(
            "hash".parse::<CacheKeyMode>(),
            Err(ConfigError::InvalidCacheKeyMode(_))
        ));
    }
}
