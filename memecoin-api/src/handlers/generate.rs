//! Caption Generation Handlers

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    dto::GenerateRequest,
    error::{ApiError, ApiResult},
    state::AppState,
};

const SUGGESTION_TREND_COUNT: usize = 5;

#[derive(Debug, Deserialize)]
pub struct GenerateQuery {
    pub action: Option<String>,
    pub text: Option<String>,
}

/// `POST /api/memes/generate`
///
/// Caption text for a topic. Degrades to canned templates when the
/// caption bridge has no API key.
pub async fn generate_caption(
    State(state): State<AppState>,
    Json(body): Json<GenerateRequest>,
) -> ApiResult<Json<Value>> {
    let topic = body
        .topic
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation("Topic required"))?;

    let caption = state
        .bridges
        .caption
        .generate_caption(
            topic,
            body.style.as_deref().unwrap_or("modern"),
            body.humor.as_deref().unwrap_or("light"),
            body.length.as_deref().unwrap_or("medium"),
        )
        .await;

    Ok(Json(json!({
        "success": true,
        "meme": {
            "text": caption.caption,
            "hashtags": caption.hashtags,
            "category": caption.category,
            "viralityScore": caption.virality_estimate,
        }
    })))
}

/// `GET /api/memes/generate?action=suggestions|analyze`
pub async fn generate_info(
    State(state): State<AppState>,
    Query(query): Query<GenerateQuery>,
) -> ApiResult<Json<Value>> {
    match query.action.as_deref() {
        Some("suggestions") => {
            let current: Vec<String> = state
                .trends
                .list(None, SUGGESTION_TREND_COUNT)
                .await?
                .into_iter()
                .map(|t| t.keyword)
                .collect();
            let suggestions = state.bridges.caption.suggest_topics(&current).await;
            Ok(Json(json!({
                "suggestions": suggestions,
                "currentTrends": current,
            })))
        }
        Some("analyze") => {
            let text = query
                .text
                .as_deref()
                .filter(|s| !s.is_empty())
                .ok_or_else(|| ApiError::validation("Text parameter required"))?;
            let score = state.bridges.caption.analyze_virality(text).await;
            Ok(Json(json!({ "viralityScore": score })))
        }
        _ => Err(ApiError::validation("Invalid action")),
    }
}
