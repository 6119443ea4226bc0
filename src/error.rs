use axum::{
    extract::rejection::JsonRejection,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};

static EXPOSE_DETAILS: AtomicBool = AtomicBool::new(false);

/// Enables the `details` field on error bodies. Only set in development.
pub fn set_development_mode(enabled: bool) {
    EXPOSE_DETAILS.store(enabled, Ordering::Relaxed);
}

fn development_mode() -> bool {
    EXPOSE_DETAILS.load(Ordering::Relaxed)
}

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Rate limit exceeded")]
    RateLimited { retry_after_secs: u64 },

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("AI scorer error: {0}")]
    AiScorer(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::RateLimited { retry_after_secs } = self {
            let body = Json(json!({
                "success": false,
                "error": "Rate limit exceeded",
                "retryAfter": retry_after_secs,
            }));
            let mut response = (StatusCode::TOO_MANY_REQUESTS, body).into_response();
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
            return response;
        }

        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::ExternalApi(_) | AppError::HttpClient(_) => {
                (StatusCode::BAD_GATEWAY, "Upstream service error".to_string())
            }
            AppError::Database(_)
            | AppError::Cache(_)
            | AppError::AiScorer(_)
            | AppError::Internal(_)
            | AppError::RateLimited { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Request failed");
        }

        let mut body = json!({
            "success": false,
            "error": message,
        });
        if status.is_server_error() && development_mode() {
            body["details"] = json!(self.to_string());
        }

        (status, Json(body)).into_response()
    }
}

/// Body parse failures keep the error envelope; serde detail is only logged
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::warn!(
            status = rejection.status().as_u16(),
            reason = %rejection.body_text(),
            "Rejected request body"
        );
        AppError::InvalidInput("Invalid JSON body".to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
