//! Trend Handlers

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use memecoin_core::TrendCategory;

use crate::{
    dto::{TrendDto, TrendRequest},
    error::{ApiError, ApiResult},
    state::AppState,
};

const DEFAULT_TRENDS_LIMIT: usize = 20;

#[derive(Debug, Deserialize)]
pub struct TrendsQuery {
    pub category: Option<String>,
    pub limit: Option<usize>,
}

/// `GET /api/trends`
pub async fn get_trends(
    State(state): State<AppState>,
    Query(query): Query<TrendsQuery>,
) -> ApiResult<Json<Value>> {
    let category = parse_category(query.category.as_deref())?;
    let limit = query.limit.unwrap_or(DEFAULT_TRENDS_LIMIT);

    let trends: Vec<TrendDto> = state
        .trends
        .list(category, limit)
        .await?
        .into_iter()
        .map(TrendDto::from)
        .collect();

    Ok(Json(json!({ "trends": trends })))
}

/// `POST /api/trends`
///
/// Upserts by keyword: a known keyword bumps its frequency, a new one is
/// recorded.
pub async fn record_trend(
    State(state): State<AppState>,
    Json(body): Json<TrendRequest>,
) -> ApiResult<Json<Value>> {
    let keyword = body.keyword.as_deref().unwrap_or_default();
    let category = parse_category(body.category.as_deref())?;

    let trend = state
        .trends
        .record(keyword, category, body.frequency)
        .await?;

    Ok(Json(json!({
        "success": true,
        "trend": TrendDto::from(trend),
        "message": "Trend created successfully"
    })))
}

fn parse_category(raw: Option<&str>) -> Result<Option<TrendCategory>, ApiError> {
    match raw.filter(|s| !s.is_empty()) {
        Some(value) => TrendCategory::parse(value)
            .map(Some)
            .ok_or_else(|| ApiError::validation("Invalid category")),
        None => Ok(None),
    }
}
