//! Farcaster Frame Handlers
//!
//! The frame metadata and button dispatch are served as JSON maps of the
//! `fc:frame` key set; the image endpoint renders a live-stats SVG.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::{
    dto::FrameActionRequest,
    error::{ApiError, ApiResult},
    state::AppState,
};

/// `GET /api/frame`
pub async fn frame_metadata(State(state): State<AppState>) -> Json<Value> {
    let app = &state.app_url;
    Json(json!({
        "fc:frame": "vNext",
        "fc:frame:image": format!("{}/api/frame/image", app),
        "fc:frame:button:1": "Create Meme",
        "fc:frame:button:1:action": "post",
        "fc:frame:button:2": "View Feed",
        "fc:frame:button:2:action": "post",
        "fc:frame:button:3": "Marketplace",
        "fc:frame:button:3:action": "post",
        "fc:frame:button:4": "Analytics",
        "fc:frame:button:4:action": "post",
        "fc:frame:post_url": format!("{}/api/frame", app),
    }))
}

/// `POST /api/frame`
///
/// Button dispatch: the pressed index maps to an app URL served back as
/// a link button.
pub async fn frame_action(
    State(state): State<AppState>,
    Json(body): Json<FrameActionRequest>,
) -> ApiResult<Json<Value>> {
    let data = body
        .untrusted_data
        .ok_or_else(|| ApiError::validation("Invalid frame data"))?;

    let path = match data.button_index {
        Some(1) => "/create",
        Some(3) => "/marketplace",
        Some(4) => "/analytics",
        _ => "/",
    };
    let app = &state.app_url;

    Ok(Json(json!({
        "fc:frame": "vNext",
        "fc:frame:image": format!("{}/api/frame/image", app),
        "fc:frame:button:1": "Open App",
        "fc:frame:button:1:action": "link",
        "fc:frame:button:1:target": format!("{}{}", app, path),
        "fc:frame:button:2": "Back to Menu",
        "fc:frame:button:2:action": "post",
    })))
}

/// `GET /api/frame/image`
///
/// 1200x630 SVG with the app title and live platform stats.
pub async fn frame_image(State(state): State<AppState>) -> ApiResult<Response> {
    let stats = state.store.get_stats().await?;
    let top_balance = state
        .store
        .list_users_by_balance(1)
        .await?
        .into_iter()
        .next()
        .map(|user| user.meme_coin_balance.to_string())
        .unwrap_or_else(|| "0".to_string());

    let svg = format!(
        r##"<svg width="1200" height="630" xmlns="http://www.w3.org/2000/svg">
  <defs>
    <linearGradient id="bg" x1="0%" y1="0%" x2="100%" y2="100%">
      <stop offset="0%" style="stop-color:#8B5CF6;stop-opacity:1" />
      <stop offset="100%" style="stop-color:#06B6D4;stop-opacity:1" />
    </linearGradient>
  </defs>
  <rect width="1200" height="630" fill="url(#bg)"/>
  <text x="600" y="220" text-anchor="middle" fill="white" font-size="64" font-weight="bold">MemeCoin Mania</text>
  <text x="600" y="290" text-anchor="middle" fill="white" font-size="28">Create. Share. Earn.</text>
  <rect x="350" y="360" width="500" height="150" rx="20" fill="rgba(255,255,255,0.2)"/>
  <text x="600" y="420" text-anchor="middle" fill="white" font-size="30">{} memes published</text>
  <text x="600" y="470" text-anchor="middle" fill="#FEF3C7" font-size="26">Top balance: {} MEMECOIN</text>
</svg>"##,
        stats.total_memes, top_balance
    );

    Ok((
        [
            (header::CONTENT_TYPE, "image/svg+xml"),
            (header::CACHE_CONTROL, "public, max-age=300"),
        ],
        svg,
    )
        .into_response())
}
