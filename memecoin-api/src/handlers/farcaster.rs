//! Farcaster Passthrough Handlers
//!
//! Thin proxies over the social bridge. Without an API key the bridge
//! degrades, so lookups 404 and cast lists come back empty.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use memecoin_core::CoreError;

use crate::{
    dto::{CastDto, ProfileDto},
    error::{ApiError, ApiResult},
    state::AppState,
};

const PROFILE_CAST_COUNT: usize = 5;
const DEFAULT_CAST_LIMIT: usize = 25;

#[derive(Debug, Deserialize)]
pub struct FidQuery {
    pub fid: Option<String>,
    pub limit: Option<usize>,
}

/// `GET /api/farcaster/user?fid=`
pub async fn farcaster_user(
    State(state): State<AppState>,
    Query(query): Query<FidQuery>,
) -> ApiResult<Json<Value>> {
    let fid = parse_fid(query.fid.as_deref())?;

    let profile = state
        .bridges
        .social
        .user_profile(fid)
        .await
        .ok_or_else(|| CoreError::not_found("Farcaster user", fid.to_string()))?;
    let casts: Vec<CastDto> = state
        .bridges
        .social
        .user_casts(fid, PROFILE_CAST_COUNT)
        .await
        .into_iter()
        .map(CastDto::from)
        .collect();

    Ok(Json(json!({
        "farcasterUser": ProfileDto::from(profile),
        "recentCasts": casts,
    })))
}

/// `GET /api/farcaster/casts?fid=&limit=`
pub async fn farcaster_casts(
    State(state): State<AppState>,
    Query(query): Query<FidQuery>,
) -> ApiResult<Json<Value>> {
    let fid = parse_fid(query.fid.as_deref())?;
    let limit = query.limit.unwrap_or(DEFAULT_CAST_LIMIT);

    let casts: Vec<CastDto> = state
        .bridges
        .social
        .user_casts(fid, limit)
        .await
        .into_iter()
        .map(CastDto::from)
        .collect();

    Ok(Json(json!({ "casts": casts })))
}

fn parse_fid(raw: Option<&str>) -> Result<u64, ApiError> {
    let raw = raw
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation("FID parameter required"))?;
    raw.parse::<u64>()
        .map_err(|_| ApiError::validation("Invalid FID"))
}
