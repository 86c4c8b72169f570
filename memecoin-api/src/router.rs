//! API Router

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{handlers, middleware, state::AppState};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let throttle = from_fn_with_state(state.limiter.clone(), middleware::throttle);

    Router::new()
        // Health
        .route("/health", get(handlers::health_check))
        // Users
        .route(
            "/api/users",
            get(handlers::get_users).post(handlers::create_user),
        )
        // Memes and captions
        .route(
            "/api/memes",
            get(handlers::get_memes).post(handlers::create_meme),
        )
        .route(
            "/api/memes/generate",
            get(handlers::generate_info).post(handlers::generate_caption),
        )
        // Engagements
        .route(
            "/api/engagements",
            get(handlers::get_engagements).post(handlers::create_engagement),
        )
        // Rewards
        .route(
            "/api/rewards",
            get(handlers::get_earnings).post(handlers::settle_reward),
        )
        .route("/api/rewards/calculate", post(handlers::calculate_virality))
        // Marketplace
        .route(
            "/api/marketplace/list",
            get(handlers::browse_marketplace)
                .post(handlers::list_item)
                .delete(handlers::cancel_listing),
        )
        .route("/api/marketplace/buy", post(handlers::buy_item))
        // Trends
        .route(
            "/api/trends",
            get(handlers::get_trends).post(handlers::record_trend),
        )
        // Templates
        .route("/api/templates", get(handlers::get_templates))
        // Frame surface
        .route(
            "/api/frame",
            get(handlers::frame_metadata).post(handlers::frame_action),
        )
        .route("/api/frame/image", get(handlers::frame_image))
        // Farcaster passthrough
        .route("/api/farcaster/user", get(handlers::farcaster_user))
        .route("/api/farcaster/casts", get(handlers::farcaster_casts))
        .layer(throttle)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
