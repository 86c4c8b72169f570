//! MemeCoin Core - Domain Types, Reward Policy and Scoring
//!
//! Pure domain layer for the MemeCoin social rewards platform:
//! - **Types**: User, Meme, Engagement, Trend and MarketplaceItem records
//! - **Policy**: the fixed reward rule table and event evaluation
//! - **Scoring**: time-decayed trending scores and the virality reward formula
//! - **Errors**: the taxonomy every settlement failure maps onto
//!
//! # Reward Rule Table
//!
//! | Action | Amount |
//! |--------|--------|
//! | Meme creation | 10 |
//! | Upvote received | 2 |
//! | Comment received | 3 |
//! | Share received | 5 |
//! | Trending bonus | 50 |
//! | Daily login | 5 |
//! | First meme | 25 |
//!
//! # Invariants
//!
//! - Balances never go below zero after any settlement
//! - A badge is granted at most once per user
//! - Self-engagement settles successfully with a zero amount
//! - Engagement counters only ever increase, by exactly one per event
//!
//! Everything in this crate is synchronous and I/O free; persistence and
//! orchestration live in `memecoin-store` and `memecoin-engine`.

pub mod error;
pub mod policy;
pub mod scoring;
pub mod templates;
pub mod types;

// Re-export error types
pub use error::{CoreError, CoreResult};

// Re-export all domain types
pub use types::*;

// Re-export policy
pub use policy::{evaluate, rules, RewardDecision, RewardEvent};

// Re-export scoring
pub use scoring::{
    meme_trending_score, meme_virality_reward, trending_score, virality_reward,
    ViralityBreakdown,
};

// Re-export static content tables
pub use templates::{meme_templates, trend_seeds, MemeTemplate, TextArea, TrendSeed};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
