use actix_web::{web, HttpResponse};
use primer_core::Explanation;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::state::AppState;

const DEFAULT_MINUTES_TO_READ: u32 = 1;

#[derive(Debug, Deserialize)]
pub struct ExploreRequest {
    #[serde(default)]
    pub interest: Option<String>,
    #[serde(default)]
    pub time_to_read: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ExploreResponse {
    pub interest: String,
    pub exploration: String,
}

#[derive(Debug, Deserialize)]
pub struct FocusRequest {
    #[serde(default)]
    pub interest: Option<String>,
    #[serde(default)]
    pub focus: String,
}

#[derive(Debug, Serialize)]
pub struct FocusResponse {
    pub interest: String,
    pub focus: String,
    pub exploration: String,
    /// Entity objects, or a single `{"error": ...}` element when extraction failed.
    pub entities: Value,
}

fn required_interest(interest: &Option<String>) -> Result<&str> {
    interest
        .as_deref()
        .map(str::trim)
        .filter(|interest| !interest.is_empty())
        .ok_or(AppError::MissingInterest)
}

pub async fn handler(
    state: web::Data<AppState>,
    req: web::Json<ExploreRequest>,
) -> Result<HttpResponse> {
    let pipeline = state.pipeline()?;
    let interest = required_interest(&req.interest)?;
    let minutes = req.time_to_read.unwrap_or(DEFAULT_MINUTES_TO_READ);

    log::info!("Exploring '{}' ({} min read)", interest, minutes);
    let exploration = pipeline.explainer().explore(interest, minutes).await;

    Ok(HttpResponse::Ok().json(ExploreResponse {
        interest: interest.to_string(),
        exploration: exploration.render(),
    }))
}

pub async fn focus_handler(
    state: web::Data<AppState>,
    req: web::Json<FocusRequest>,
) -> Result<HttpResponse> {
    let pipeline = state.pipeline()?;
    let interest = required_interest(&req.interest)?;
    let explainer = pipeline.explainer();

    log::info!("Focused exploration of '{}': '{}'", interest, req.focus);
    let exploration = explainer.explain(interest, &req.focus).await;

    let entities = match &exploration {
        Explanation::Generated(text) => match explainer.potential_entities(text, interest).await {
            Ok(entities) => serde_json::to_value(entities).unwrap_or_default(),
            Err(e) => {
                log::warn!("Entity listing failed for '{}': {}", interest, e);
                serde_json::json!([{ "error": e.to_string() }])
            }
        },
        Explanation::Declined | Explanation::Failed(_) => Value::Array(Vec::new()),
    };

    Ok(HttpResponse::Ok().json(FocusResponse {
        interest: interest.to_string(),
        focus: req.focus.clone(),
        exploration: exploration.render(),
        entities,
    }))
}
