//! Meme Publish and Feed Handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info};

use memecoin_core::{meme_trending_score, CoreError, Meme, MemeId, RewardEvent, UserId};
use memecoin_store::MemeQuery;

use crate::{
    dto::{CreateMemeRequest, DataBody, MemeDto},
    error::{ApiError, ApiResult},
    state::AppState,
};

const DEFAULT_FEED_LIMIT: usize = 20;
// The raw-sum index ignores age, so decay re-ranking pulls a wider
// candidate pool than the requested page.
const TRENDING_POOL_FACTOR: usize = 2;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemesQuery {
    pub meme_id: Option<String>,
    pub creator_id: Option<String>,
    pub topic: Option<String>,
    pub sort: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// `POST /api/memes`
///
/// Publishes a meme and settles the creation reward for its creator.
pub async fn create_meme(
    State(state): State<AppState>,
    Json(body): Json<CreateMemeRequest>,
) -> ApiResult<(StatusCode, Json<DataBody<MemeDto>>)> {
    let (creator_id, image_url, text_prompt, topic) = match (
        non_empty(body.creator_id),
        non_empty(body.image_url),
        non_empty(body.text_prompt),
        non_empty(body.topic),
    ) {
        (Some(creator), Some(image), Some(prompt), Some(topic)) => {
            (creator, image, prompt, topic)
        }
        _ => {
            return Err(ApiError::validation(
                "creatorId, imageUrl, textPrompt, and topic are required",
            ))
        }
    };

    let creator_id = UserId::new(creator_id);
    state
        .store
        .get_user(&creator_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Creator", creator_id.as_str()))?;

    let meme = Meme::new(creator_id.clone(), image_url, text_prompt, topic);
    state.store.save_meme(&meme).await?;

    let outcome = state
        .rewards
        .settle(RewardEvent::MemeCreation {
            user_id: creator_id,
            meme_id: meme.meme_id.clone(),
        })
        .await?;
    info!(
        meme_id = %meme.meme_id,
        amount = %outcome.amount,
        "Meme published"
    );

    Ok((StatusCode::CREATED, Json(DataBody::new(meme.into()))))
}

/// `GET /api/memes`
///
/// `?memeId=` fetches one meme; otherwise a feed filtered by
/// `creatorId`/`topic`, ordered by `sort=latest|trending`.
pub async fn get_memes(
    State(state): State<AppState>,
    Query(query): Query<MemesQuery>,
) -> ApiResult<Response> {
    if let Some(meme_id) = query.meme_id.as_deref().filter(|s| !s.is_empty()) {
        let meme_id = MemeId::new(meme_id);
        let meme = state
            .store
            .get_meme(&meme_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Meme", meme_id.as_str()))?;
        return Ok(Json(DataBody::new(MemeDto::from(meme))).into_response());
    }

    let limit = query.limit.unwrap_or(DEFAULT_FEED_LIMIT);
    let offset = query.offset.unwrap_or(0);

    let memes = match query.sort.as_deref().unwrap_or("latest") {
        "latest" => latest_feed(&state, &query, limit + offset).await?,
        "trending" => trending_feed(&state, &query, limit + offset).await?,
        _ => return Err(ApiError::validation("Sort must be latest or trending")),
    };

    let page: Vec<MemeDto> = memes
        .into_iter()
        .skip(offset)
        .take(limit)
        .map(MemeDto::from)
        .collect();
    Ok(Json(DataBody::new(page)).into_response())
}

async fn latest_feed(state: &AppState, query: &MemesQuery, want: usize) -> ApiResult<Vec<Meme>> {
    let store_query = MemeQuery {
        creator_id: query
            .creator_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(UserId::new),
        topic: query.topic.clone().filter(|s| !s.is_empty()),
        limit: Some(want),
    };
    Ok(state.store.list_memes(&store_query).await?)
}

/// Raw-sum index candidates, re-ranked by the decayed trending score.
async fn trending_feed(state: &AppState, query: &MemesQuery, want: usize) -> ApiResult<Vec<Meme>> {
    let now = Utc::now();
    let pool = (want * TRENDING_POOL_FACTOR).max(DEFAULT_FEED_LIMIT);

    let mut memes = Vec::new();
    for (meme_id, _) in state.store.top_trending(pool).await? {
        match state.store.get_meme(&meme_id).await? {
            Some(meme) => memes.push(meme),
            None => debug!(meme_id = %meme_id, "Skipping expired meme in trending index"),
        }
    }

    if let Some(creator) = query.creator_id.as_deref().filter(|s| !s.is_empty()) {
        memes.retain(|m| m.creator_id.as_str() == creator);
    }
    if let Some(topic) = query.topic.as_deref().filter(|s| !s.is_empty()) {
        memes.retain(|m| m.topic.eq_ignore_ascii_case(topic));
    }

    memes.sort_by(|a, b| {
        meme_trending_score(b, now)
            .partial_cmp(&meme_trending_score(a, now))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    memes.truncate(want);
    Ok(memes)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
