use serde::Serialize;
use axum::Json;
use axum::http::StatusCode;
use chrono::Utc;

use crate::error::AppError;

const GENERAL_ADVICE: [&str; 4] = [
    "Try a different URL: some sites block automated requests",
    "Use simple articles: news articles, blogs and Wikipedia work best",
    "Check your API key: ensure the GROQ API key is valid",
    "Wait and retry: if the quota is exceeded, wait a bit",
];

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    pub meta: ResponseMeta,
}

#[derive(Serialize)]
pub struct ResponseMeta {
    pub status: String,
    pub status_code: u16,
    pub timestamp: String,
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<&'static str>,
}

pub fn success<T: Serialize>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    let meta = ResponseMeta {
        status: "success".to_string(),
        status_code: StatusCode::OK.as_u16(),
        timestamp: Utc::now().to_rfc3339(),
        message: None,
        error_kind: None,
        hints: Vec::new(),
    };

    (
        StatusCode::OK,
        Json(ApiResponse {
            data: Some(data),
            meta,
        }),
    )
}

pub fn failure(err: &AppError) -> (StatusCode, Json<ApiResponse<()>>) {
    let status = err.status_code();
    let message = err.to_string();
    let meta = ResponseMeta {
        status: "error".to_string(),
        status_code: status.as_u16(),
        timestamp: Utc::now().to_rfc3339(),
        hints: remediation_hints(&message),
        message: Some(message),
        error_kind: Some(err.kind()),
    };

    (
        status,
        Json(ApiResponse {
            data: None,
            meta,
        }),
    )
}

/// Advisory hints for a failure message, picked by keyword.
///
/// The first matching cause wins; the general advice is always appended.
pub fn remediation_hints(message: &str) -> Vec<&'static str> {
    let lower = message.to_lowercase();
    let mut hints = Vec::new();

    if lower.contains("fetch") {
        hints.push("Website is blocking requests or requires authentication");
        hints.push("URL is not accessible or returns no content");
    } else if lower.contains("groq") || lower.contains("api") {
        hints.push("GROQ API key issue or quota exceeded");
    } else if lower.contains("timeout") || lower.contains("timed out") {
        hints.push("Request timeout - website is too slow");
    }

    hints.extend(GENERAL_ADVICE);
    hints
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_hints_take_priority() {
        let hints = remediation_hints("Failed to fetch content: request timed out");
        assert_eq!(hints[0], "Website is blocking requests or requires authentication");
        assert!(!hints.contains(&"Request timeout - website is too slow"));
        assert_eq!(hints.len(), 2 + GENERAL_ADVICE.len());
    }

    #[test]
    fn test_api_hint() {
        let hints = remediation_hints("Summarization failed: model API returned 401 Unauthorized");
        assert_eq!(hints[0], "GROQ API key issue or quota exceeded");
    }

    #[test]
    fn test_timeout_hint() {
        let hints = remediation_hints("Operation timed out");
        assert_eq!(hints[0], "Request timeout - website is too slow");
    }

    #[test]
    fn test_unclassified_gets_general_advice_only() {
        let hints = remediation_hints("Insufficient content found");
        assert_eq!(hints, GENERAL_ADVICE.to_vec());
    }

    #[test]
    fn test_failure_envelope() {
        let (status, Json(body)) = failure(&AppError::ContentError("Insufficient content found".into()));
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.data.is_none());
        assert_eq!(body.meta.status, "error");
        assert_eq!(body.meta.status_code, 422);
        assert_eq!(body.meta.message.as_deref(), Some("Insufficient content found"));
        assert_eq!(body.meta.error_kind, Some("content_error"));
    }
}
