use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use primer_core::{CacheKeyMode, Config};
use primer_pipeline::Pipeline;
use primer_server::logging::init_logging;
use primer_server::run_server_with_config;

#[derive(Parser, Debug, Clone)]
#[command(name = "primer-server")]
#[command(about = "Turns a topic into illustrated, child-friendly explanations")]
#[command(version)]
struct Cli {
    /// Enable debug mode
    #[arg(long, env = "DEBUG", default_value = "false")]
    debug: bool,

    /// Server port
    #[arg(long, env = "PORT", default_value = "5000")]
    port: u16,

    /// Log level (overrides debug flag)
    #[arg(long, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Run the pipeline once for this topic, print the records as JSON and exit
    #[arg(long)]
    topic: Option<String>,

    /// Text-completion API key (default: CEREBRAS_API_KEY)
    #[arg(long)]
    completion_api_key: Option<String>,

    #[arg(long)]
    completion_base_url: Option<String>,

    #[arg(long)]
    completion_model: Option<String>,

    /// Image-generation API key (default: STABILITY_API_KEY)
    #[arg(long)]
    image_api_key: Option<String>,

    #[arg(long)]
    image_base_url: Option<String>,

    #[arg(long)]
    image_engine: Option<String>,

    /// Root of the output tree; images go to `<dir>/generated_images`
    #[arg(long)]
    output_dir: Option<PathBuf>,

    #[arg(long)]
    base_seed: Option<u64>,

    /// `entity` or `fingerprint`
    #[arg(long)]
    cache_key_mode: Option<CacheKeyMode>,

    /// Per-request timeout for both hosted services
    #[arg(long)]
    request_timeout_secs: Option<u64>,
}

impl Cli {
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(key) = &self.completion_api_key {
            config.completion_api_key = Some(key.clone());
        }
        if let Some(url) = &self.completion_base_url {
            config.completion_base_url = url.clone();
        }
        if let Some(model) = &self.completion_model {
            config.completion_model = model.clone();
        }
        if let Some(key) = &self.image_api_key {
            config.image_api_key = Some(key.clone());
        }
        if let Some(url) = &self.image_base_url {
            config.image_base_url = url.clone();
        }
        if let Some(engine) = &self.image_engine {
            config.image_engine = engine.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(seed) = self.base_seed {
            config.base_seed = seed;
        }
        if let Some(mode) = self.cache_key_mode {
            config.cache_key_mode = mode;
        }
        if let Some(secs) = self.request_timeout_secs {
            config.request_timeout_secs = Some(secs);
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_logging(cli.debug, cli.log_level.as_deref());

    let mut config = Config::new();
    cli.apply_overrides(&mut config);

    log::info!("Configuration:");
    log::info!("  Completion: {} ({})", config.completion_base_url, config.completion_model);
    log::info!("  Images: {} ({})", config.image_base_url, config.image_engine);
    log::info!("  Output: {:?}", config.image_dir());
    log::info!("  Cache keys: {}", config.cache_key_mode);

    if let Some(topic) = cli.topic.as_deref() {
        let pipeline = Pipeline::from_config(&config).context("failed to initialize pipeline")?;
        let records = pipeline.run(topic).await;
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    run_server_with_config(cli.port, config)
        .await
        .context("server terminated")?;
    Ok(())
}
