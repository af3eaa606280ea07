use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
};

use crate::api::response;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid URL: {0}")]
    ValidationError(String),

    #[error("Failed to fetch content: {0}")]
    FetchError(String),

    #[error("{0}")]
    ContentError(String),

    #[error("Summarization failed: {0}")]
    ModelError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    /// Stable identifier used in API responses and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_error",
            AppError::FetchError(_) => "fetch_error",
            AppError::ContentError(_) => "content_error",
            AppError::ModelError(_) => "model_error",
            AppError::ConfigError(_) => "config_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::FetchError(_) => StatusCode::BAD_GATEWAY,
            AppError::ContentError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ModelError(_) => StatusCode::BAD_GATEWAY,
            AppError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        response::failure(&self).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::FetchError(format!("request timed out: {}", err))
        } else if err.is_connect() {
            AppError::FetchError(format!("connection failed: {}", err))
        } else {
            AppError::FetchError(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
