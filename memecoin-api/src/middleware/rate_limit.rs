//! Request Throttling Middleware
//!
//! HTTP glue over the engine's token-bucket limiter. Reads pass through
//! untouched; mutating requests spend one token, keyed by caller IP.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use memecoin_engine::RateLimiter;

use crate::error::ApiError;

/// Token-bucket gate for mutating requests
pub async fn throttle(
    State(limiter): State<RateLimiter>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let method = request.method();
    if method == Method::GET || method == Method::HEAD || method == Method::OPTIONS {
        return Ok(next.run(request).await);
    }

    let key = client_key(&request, connect_info);
    let decision = limiter.check(&key).await;
    if !decision.allowed {
        return Err(ApiError::RateLimited(decision));
    }

    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert("x-ratelimit-limit", HeaderValue::from(decision.limit));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(decision.remaining));
    Ok(response)
}

/// Caller identity: socket address first, then the forwarding header,
/// else one shared bucket.
fn client_key(request: &Request, connect_info: Option<ConnectInfo<SocketAddr>>) -> String {
    if let Some(ConnectInfo(addr)) = connect_info {
        return addr.ip().to_string();
    }
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "global".to_string())
}
