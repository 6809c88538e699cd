use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub topic: Option<String>,
}

/// Runs the pipeline for `topic` and returns every subject record, failed ones included.
///
/// A body that is absent or not a `{"topic": string}` object counts as a missing topic.
pub async fn handler(
    state: web::Data<AppState>,
    req: Option<web::Json<GenerateRequest>>,
) -> Result<HttpResponse> {
    log::info!("POST /generate received");
    let pipeline = state.pipeline()?;

    let topic = req
        .as_ref()
        .and_then(|req| req.topic.as_deref())
        .filter(|topic| !topic.is_empty())
        .ok_or(AppError::MissingTopic)?;

    log::info!("Processing topic: '{}'", topic);
    let records = pipeline.run(topic).await;
    log::info!("Pipeline finished, sending {} record(s)", records.len());

    Ok(HttpResponse::Ok().json(records))
}
