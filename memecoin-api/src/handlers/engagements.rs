//! Engagement Handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;

use memecoin_core::{EngagementType, MemeId, UserId};

use crate::{
    dto::{CreateEngagementRequest, DataBody, EngagementDto},
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementsQuery {
    pub meme_id: Option<String>,
    pub user_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// `POST /api/engagements`
///
/// Records an engagement and settles the reward for the meme's creator.
pub async fn create_engagement(
    State(state): State<AppState>,
    Json(body): Json<CreateEngagementRequest>,
) -> ApiResult<(StatusCode, Json<DataBody<EngagementDto>>)> {
    let (user_id, meme_id, kind) = match (
        body.user_id.as_deref().filter(|s| !s.is_empty()),
        body.meme_id.as_deref().filter(|s| !s.is_empty()),
        body.kind.as_deref().filter(|s| !s.is_empty()),
    ) {
        (Some(user), Some(meme), Some(kind)) => (user, meme, kind),
        _ => {
            return Err(ApiError::validation(
                "userId, memeId, and type are required",
            ))
        }
    };

    let kind = EngagementType::parse(kind)
        .ok_or_else(|| ApiError::validation("Type must be upvote, comment, or share"))?;

    let outcome = state
        .engagements
        .record(
            UserId::new(user_id),
            MemeId::new(meme_id),
            kind,
            body.comment_text,
        )
        .await?;
    info!(
        engagement_id = %outcome.engagement.engagement_id,
        meme_id = %outcome.meme.meme_id,
        kind = kind.as_str(),
        reward = %outcome.reward.amount,
        "Engagement recorded"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataBody::new(outcome.engagement.into())),
    ))
}

/// `GET /api/engagements?memeId=`
///
/// Lists a meme's engagements, newest first, with optional `userId` and
/// `type` filters.
pub async fn get_engagements(
    State(state): State<AppState>,
    Query(query): Query<EngagementsQuery>,
) -> ApiResult<Json<DataBody<Vec<EngagementDto>>>> {
    let meme_id = query
        .meme_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation("memeId parameter required"))?;

    let mut engagements = state
        .engagements
        .list_for_meme(&MemeId::new(meme_id))
        .await?;

    if let Some(user_id) = query.user_id.as_deref().filter(|s| !s.is_empty()) {
        engagements.retain(|e| e.user_id.as_str() == user_id);
    }
    if let Some(kind) = query.kind.as_deref().and_then(EngagementType::parse) {
        engagements.retain(|e| e.kind == kind);
    }

    let data: Vec<EngagementDto> = engagements.into_iter().map(EngagementDto::from).collect();
    Ok(Json(DataBody::new(data)))
}
