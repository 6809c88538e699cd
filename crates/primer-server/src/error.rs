use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("No topic provided")]
    MissingTopic,

    #[error("No interest provided")]
    MissingInterest,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Pipeline not initialized due to a server startup error.")]
    PipelineUnavailable,

    #[error("Image not found: {0}")]
    ImageNotFound(String),

    #[error("Invalid image name: {0}")]
    InvalidImageName(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
}

#[derive(Serialize)]
struct JsonError {
    error: String,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingTopic => StatusCode::BAD_REQUEST,
            AppError::MissingInterest => StatusCode::BAD_REQUEST,
            AppError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidImageName(_) => StatusCode::BAD_REQUEST,
            AppError::ImageNotFound(_) => StatusCode::NOT_FOUND,
            AppError::PipelineUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(JsonError {
            error: self.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_4xx() {
        assert_eq!(AppError::MissingTopic.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::ImageNotFound("x.png".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::InvalidImageName("..".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn invalid_body_is_bad_request() {
        let err = AppError::InvalidBody("expected value".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Invalid request body: expected value");
    }

    #[test]
    fn startup_failure_is_internal() {
        let err = AppError::PipelineUnavailable;
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.to_string(),
            "Pipeline not initialized due to a server startup error."
        );
    }
}
