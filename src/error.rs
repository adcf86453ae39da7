use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// App-wide error type. Every fallible function returns `Result<T, AppError>`.
/// Maps onto HTTP responses at the router boundary so handlers never build
/// error bodies by hand.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("{0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Authentication provider error: {0}")]
    Auth(String),

    #[error("You have reached your maximum usage limit of {max_usage} generations. Please contact support for more access.")]
    QuotaExceeded { usage_count: i64, max_usage: i64 },

    #[error("Upstream authentication failed: {0}")]
    UpstreamAuth(String),

    #[error("Rate limit exceeded. Please try again later.")]
    UpstreamRateLimited(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Failed to parse AI response. Please try again.")]
    UpstreamParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable tag for the frontend.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database",
            AppError::Pool(_) => "pool",
            AppError::Validation(_) => "validation",
            AppError::Unauthorized => "unauthorized",
            AppError::Auth(_) => "auth",
            AppError::QuotaExceeded { .. } => "quota_exceeded",
            AppError::UpstreamAuth(_) => "upstream_auth",
            AppError::UpstreamRateLimited(_) => "upstream_rate_limited",
            AppError::Upstream(_) => "upstream",
            AppError::UpstreamParse(_) => "upstream_parse",
            AppError::Io(_) => "io",
            AppError::Serde(_) => "serde",
            AppError::Internal(_) => "internal",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::QuotaExceeded { .. } => StatusCode::FORBIDDEN,
            AppError::UpstreamRateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Translate errors into `{ error, kind }` JSON bodies. Quota errors carry
/// the current counts so the frontend can show actionable numbers. Storage
/// and upstream details are logged server-side, never leaked verbatim.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let kind = self.kind();
        let message = self.to_string();

        match &self {
            AppError::Validation(_) | AppError::Unauthorized | AppError::QuotaExceeded { .. } => {
                tracing::warn!(kind, "{message}");
            }
            _ => {
                tracing::error!(kind, "{message}");
            }
        }

        let body = match self {
            AppError::QuotaExceeded {
                usage_count,
                max_usage,
            } => serde_json::json!({
                "error": message,
                "kind": kind,
                "usageCount": usage_count,
                "maxUsage": max_usage,
            }),
            // Internal details stay in the server log; callers get the class.
            AppError::Database(_) | AppError::Pool(_) | AppError::Io(_) | AppError::Serde(_) => {
                serde_json::json!({
                    "error": "A storage error occurred. Please try again.",
                    "kind": kind,
                })
            }
            _ => serde_json::json!({
                "error": message,
                "kind": kind,
            }),
        };

        (status, Json(body)).into_response()
    }
}
