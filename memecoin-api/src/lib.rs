//! MemeCoin Platform REST API
//!
//! HTTP surface for the MemeCoin social rewards platform.
//!
//! # Endpoints
//!
//! ## Health
//! - `GET /health` - Health check
//!
//! ## Users
//! - `POST /api/users` - Create a user account
//! - `GET /api/users?userId=` - Fetch one user
//! - `GET /api/users?action=leaderboard&limit=` - Balance leaderboard
//!
//! ## Memes
//! - `POST /api/memes` - Publish a meme, settling the creation reward
//! - `GET /api/memes?memeId=` - Fetch one meme
//! - `GET /api/memes?creatorId=&topic=&sort=&limit=&offset=` - Feed
//! - `POST /api/memes/generate` - Generate a caption for a topic
//! - `GET /api/memes/generate?action=suggestions|analyze` - Topic suggestions or a virality estimate
//!
//! ## Engagements
//! - `POST /api/engagements` - Record an engagement, settling the creator's reward
//! - `GET /api/engagements?memeId=` - List a meme's engagements
//!
//! ## Rewards
//! - `POST /api/rewards` - Settle a reward event
//! - `GET /api/rewards?userId=` - Earnings summary
//! - `POST /api/rewards/calculate` - Virality settlement for a meme
//!
//! ## Marketplace
//! - `POST /api/marketplace/list` - List a meme for sale
//! - `GET /api/marketplace/list` - Browse listings
//! - `DELETE /api/marketplace/list?itemId=&sellerId=` - Cancel a listing
//! - `POST /api/marketplace/buy` - Purchase a listing
//!
//! ## Trends
//! - `GET /api/trends?category=&limit=` - Current trends
//! - `POST /api/trends` - Record a trend keyword
//!
//! ## Content
//! - `GET /api/templates` - Meme template table
//!
//! ## Frame
//! - `GET /api/frame` - Frame metadata
//! - `POST /api/frame` - Frame button dispatch
//! - `GET /api/frame/image` - Live-stats SVG card
//!
//! ## Farcaster
//! - `GET /api/farcaster/user?fid=` - Profile with recent casts
//! - `GET /api/farcaster/casts?fid=&limit=` - Recent casts
//!
//! Mutating routes are rate limited per client IP. Allowed requests carry
//! `X-RateLimit-Limit`/`X-RateLimit-Remaining` headers and a denied one
//! gets 429 with `Retry-After`.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use router::create_router;
pub use state::AppState;

use std::time::Duration;

use memecoin_engine::RateLimitConfig;

/// API version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default port
pub const DEFAULT_PORT: u16 = 3000;

/// Configuration for the API server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Port
    pub port: u16,
    /// Whether to serve permissive CORS headers
    pub cors_enabled: bool,
    /// Public base URL the frame surface links back to
    pub app_url: String,
    /// Sustained mutating-request allowance per window
    pub rate_limit_max_requests: u32,
    /// Rate limit window in seconds
    pub rate_limit_window_secs: u64,
    /// Rate limit burst capacity
    pub rate_limit_burst: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let rate = RateLimitConfig::default();
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            cors_enabled: true,
            app_url: state::DEFAULT_APP_URL.to_string(),
            rate_limit_max_requests: rate.max_requests,
            rate_limit_window_secs: rate.window.as_secs(),
            rate_limit_burst: rate.burst_capacity,
        }
    }
}

impl ServerConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("MEMECOIN_HOST").unwrap_or(defaults.host),
            port: std::env::var("MEMECOIN_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            cors_enabled: std::env::var("MEMECOIN_CORS_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cors_enabled),
            app_url: std::env::var("MEMECOIN_APP_URL").unwrap_or(defaults.app_url),
            rate_limit_max_requests: std::env::var("MEMECOIN_RATE_LIMIT_MAX")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.rate_limit_max_requests),
            rate_limit_window_secs: std::env::var("MEMECOIN_RATE_LIMIT_WINDOW_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.rate_limit_window_secs),
            rate_limit_burst: std::env::var("MEMECOIN_RATE_LIMIT_BURST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.rate_limit_burst),
        }
    }

    /// Get the full bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Rate limiter settings derived from this config
    pub fn rate_limit_config(&self) -> RateLimitConfig {
        RateLimitConfig {
            max_requests: self.rate_limit_max_requests,
            window: Duration::from_secs(self.rate_limit_window_secs),
            burst_capacity: self.rate_limit_burst,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert!(config.cors_enabled);

        let rate = config.rate_limit_config();
        assert_eq!(rate.max_requests, 30);
        assert_eq!(rate.window, Duration::from_secs(60));
    }
}
