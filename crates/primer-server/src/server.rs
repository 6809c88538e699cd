use std::io;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use primer_core::config::GENERATED_IMAGES_DIR;
use primer_core::Config;

use crate::error::AppError;
use crate::handlers;
use crate::state::AppState;

/// Registers every route on `cfg`. Shared by the server and the integration tests.
///
/// Body extraction failures are rendered through [`AppError`] like every other error.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        log::warn!("Rejected request body: {}", err);
        AppError::InvalidBody(err.to_string()).into()
    });

    cfg.app_data(json_config)
        .route("/health", web::get().to(handlers::health::handler))
        .route("/generate", web::post().to(handlers::generate::handler))
        .route("/explore", web::post().to(handlers::explore::handler))
        .route(
            "/explore/focus",
            web::post().to(handlers::explore::focus_handler),
        )
        .route(
            &format!("/pipeline_outputs/{}/{{filename}}", GENERATED_IMAGES_DIR),
            web::get().to(handlers::images::handler),
        );
}

pub async fn run_server_with_config(port: u16, config: Config) -> io::Result<()> {
    log::info!(
        "Initializing server (completion: {}, images: {})",
        config.completion_base_url,
        config.image_base_url
    );
    let state = web::Data::new(AppState::new_with_config(&config));
    if state.is_ready() {
        log::info!("Backend initialized successfully");
    }

    log::info!("Starting server on http://0.0.0.0:{}", port);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Cors::permissive())
            .configure(configure_routes)
    })
    .bind(format!("0.0.0.0:{}", port))?
    .run()
    .await
}
