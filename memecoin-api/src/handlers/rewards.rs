//! Reward Settlement Handlers

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use tracing::info;

use memecoin_core::{EngagementType, MemeId, RewardEvent, UserId};
use memecoin_engine::RewardOutcome;

use crate::{
    dto::{CalculateRequest, CalculationDto, DataBody, EarningsDto, RewardRequest},
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardsQuery {
    pub user_id: Option<String>,
}

/// `POST /api/rewards`
///
/// Settles one reward event; the wire `type` selects the kind.
pub async fn settle_reward(
    State(state): State<AppState>,
    Json(body): Json<RewardRequest>,
) -> ApiResult<Json<RewardOutcome>> {
    let event = parse_event(body)?;
    let outcome = state.rewards.settle(event).await?;
    Ok(Json(outcome))
}

/// `GET /api/rewards?userId=`
///
/// Balance plus the reported earnings split and badges.
pub async fn get_earnings(
    State(state): State<AppState>,
    Query(query): Query<RewardsQuery>,
) -> ApiResult<Json<DataBody<EarningsDto>>> {
    let user_id = query
        .user_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation("userId parameter required"))?;
    let user_id = UserId::new(user_id);

    let summary = state.rewards.earnings(&user_id).await?;
    Ok(Json(DataBody::new(EarningsDto {
        user_id: user_id.as_str().to_string(),
        total_earned: summary.total_earned,
        creation_estimate: summary.creation_estimate,
        engagement_estimate: summary.engagement_estimate,
        bonus_estimate: summary.bonus_estimate,
        badges: summary.badges,
    })))
}

/// `POST /api/rewards/calculate`
///
/// Computes the virality payout for a meme and credits its creator,
/// guarded by the per-meme settlement watermark.
pub async fn calculate_virality(
    State(state): State<AppState>,
    Json(body): Json<CalculateRequest>,
) -> ApiResult<Json<DataBody<CalculationDto>>> {
    let meme_id = body
        .meme_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation("memeId is required"))?;

    let outcome = state.virality.settle(&MemeId::new(meme_id)).await?;
    info!(
        meme_id = %outcome.meme_id,
        amount = %outcome.amount_paid,
        "Virality settlement computed"
    );
    Ok(Json(DataBody::new(outcome.into())))
}

/// Map the wire reward request onto the tagged event union.
fn parse_event(body: RewardRequest) -> Result<RewardEvent, ApiError> {
    let kind = body
        .kind
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation("type is required"))?;

    let required = |field: Option<String>, message: &str| {
        field
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::validation(message))
    };

    match kind {
        "meme_creation" => Ok(RewardEvent::MemeCreation {
            user_id: UserId::new(required(
                body.user_id,
                "userId and memeId are required for meme_creation",
            )?),
            meme_id: MemeId::new(required(
                body.meme_id,
                "userId and memeId are required for meme_creation",
            )?),
        }),
        "engagement" => {
            let message = "engagerId, creatorId, memeId, and engagementType are required";
            let engagement_type = required(body.engagement_type, message)?;
            let engagement_type = EngagementType::parse(&engagement_type)
                .ok_or_else(|| ApiError::validation("Type must be upvote, comment, or share"))?;
            Ok(RewardEvent::Engagement {
                engager_id: UserId::new(required(body.engager_id, message)?),
                creator_id: UserId::new(required(body.creator_id, message)?),
                meme_id: MemeId::new(required(body.meme_id, message)?),
                engagement_type,
            })
        }
        "trending_bonus" => Ok(RewardEvent::TrendingBonus {
            user_id: UserId::new(required(
                body.user_id,
                "userId and memeId are required for trending_bonus",
            )?),
            meme_id: MemeId::new(required(
                body.meme_id,
                "userId and memeId are required for trending_bonus",
            )?),
        }),
        "daily_login" => Ok(RewardEvent::DailyLogin {
            user_id: UserId::new(required(body.user_id, "userId is required for daily_login")?),
        }),
        "first_meme" => Ok(RewardEvent::FirstMeme {
            user_id: UserId::new(required(body.user_id, "userId is required for first_meme")?),
        }),
        other => Err(ApiError::validation(format!(
            "Unknown reward type: {}",
            other
        ))),
    }
}
