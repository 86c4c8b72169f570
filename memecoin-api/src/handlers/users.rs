//! User Account Handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::info;

use memecoin_core::{CoreError, User, UserId};

use crate::{
    dto::{CreateUserRequest, DataBody, UserDto},
    error::{ApiError, ApiResult},
    state::AppState,
};

const DEFAULT_LEADERBOARD_LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersQuery {
    pub user_id: Option<String>,
    pub action: Option<String>,
    pub limit: Option<usize>,
}

/// `POST /api/users`
pub async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<DataBody<UserDto>>)> {
    let user_id = body
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation("userId is required"))?;
    let user_id = UserId::new(user_id);

    if state.store.get_user(&user_id).await?.is_some() {
        return Err(CoreError::conflict("User already exists").into());
    }

    let mut user = User::new(user_id);
    if let Some(username) = body.username.filter(|s| !s.trim().is_empty()) {
        user = user.with_username(username);
    }
    if let Some(wallet) = body.wallet_address.filter(|s| !s.trim().is_empty()) {
        user = user.with_wallet(wallet);
    }
    if let Some(fid) = body.farcaster_fid {
        user = user.with_farcaster_fid(fid);
    }

    state.store.save_user(&user).await?;
    info!(user_id = %user.user_id, "User created");

    Ok((StatusCode::CREATED, Json(DataBody::new(user.into()))))
}

/// `GET /api/users`
///
/// `?userId=` fetches one user; otherwise the balance leaderboard is
/// served with ranks assigned at read time.
pub async fn get_users(
    State(state): State<AppState>,
    Query(query): Query<UsersQuery>,
) -> ApiResult<Response> {
    if let Some(user_id) = query.user_id.as_deref().filter(|s| !s.is_empty()) {
        let user_id = UserId::new(user_id);
        let user = state
            .store
            .get_user(&user_id)
            .await?
            .ok_or_else(|| CoreError::not_found("User", user_id.as_str()))?;
        return Ok(Json(DataBody::new(UserDto::from(user))).into_response());
    }

    if let Some(action) = query.action.as_deref() {
        if action != "leaderboard" {
            return Err(ApiError::validation("Invalid action"));
        }
    }

    let limit = query.limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT);
    let users = state.store.list_users_by_balance(limit).await?;
    let leaderboard: Vec<UserDto> = users
        .into_iter()
        .enumerate()
        .map(|(index, mut user)| {
            user.leaderboard_rank = Some(index as u32 + 1);
            UserDto::from(user)
        })
        .collect();

    Ok(Json(DataBody::new(leaderboard)).into_response())
}
