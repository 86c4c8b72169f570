//! API Error Handling
//!
//! Maps domain errors onto HTTP status codes and a uniform JSON error
//! envelope of `{"error": message, "code": CODE}`.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use memecoin_core::CoreError;
use memecoin_engine::RateDecision;
use memecoin_store::StoreError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Body of every failing response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
}

/// Error returned by request handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Domain failure, mapped to a status per variant
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Caller exceeded the request allowance
    #[error("Rate limit exceeded")]
    RateLimited(RateDecision),
}

impl ApiError {
    /// Shorthand for a 400 with the given message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Core(CoreError::validation(msg))
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        let core = match err {
            StoreError::Missing { entity, id } => CoreError::NotFound {
                entity: entity_label(entity),
                id,
            },
            StoreError::VersionConflict { entity, id, .. } => {
                CoreError::conflict(format!("Concurrent update on {} {}", entity, id))
            }
            StoreError::Duplicate { entity, id } => {
                CoreError::conflict(format!("Duplicate {}: {}", entity, id))
            }
            StoreError::Backend(msg) | StoreError::Serialization(msg) => CoreError::store(msg),
        };
        Self::Core(core)
    }
}

fn entity_label(entity: &'static str) -> &'static str {
    match entity {
        "user" => "User",
        "meme" => "Meme",
        "engagement" => "Engagement",
        "trend" => "Trend",
        "item" => "Item",
        other => other,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Core(err) => core_response(err),
            Self::RateLimited(decision) => rate_limited_response(decision),
        }
    }
}

fn core_response(err: CoreError) -> Response {
    let status = match &err {
        CoreError::Validation(_) => StatusCode::BAD_REQUEST,
        CoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        CoreError::Conflict(_) => StatusCode::CONFLICT,
        CoreError::InsufficientBalance { .. } => StatusCode::PAYMENT_REQUIRED,
        CoreError::SelfAction(_) => StatusCode::FORBIDDEN,
        CoreError::ExternalService(_) => StatusCode::BAD_GATEWAY,
        CoreError::Store(_) | CoreError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let code = err.code();

    // Server-side faults keep their detail in the log, not the response.
    let message = if status.is_server_error() {
        error!(code, "Request failed: {}", err);
        match &err {
            CoreError::ExternalService(_) => "Upstream service unavailable".to_string(),
            _ => "Internal server error".to_string(),
        }
    } else {
        err.to_string()
    };

    (status, Json(ErrorBody { error: message, code })).into_response()
}

fn rate_limited_response(decision: RateDecision) -> Response {
    let body = ErrorBody {
        error: "Rate limit exceeded".to_string(),
        code: "RATE_LIMITED",
    };
    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    let headers = response.headers_mut();
    headers.insert("x-ratelimit-limit", HeaderValue::from(decision.limit));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(decision.remaining));
    headers.insert(
        header::RETRY_AFTER,
        HeaderValue::from(decision.retry_after.as_secs().max(1)),
    );
    response
}

/// Result alias for handler functions
pub type ApiResult<T> = Result<T, ApiError>;
