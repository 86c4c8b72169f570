//! Reward Rule Table
//!
//! Flat per-action MemeCoin amounts, fixed for the platform.

use rust_decimal::Decimal;

use crate::types::EngagementType;

/// Reward for publishing a meme
pub const CREATE_MEME: u64 = 10;
/// Reward to the creator when a meme receives an upvote
pub const UPVOTE_RECEIVED: u64 = 2;
/// Reward to the creator when a meme receives a comment
pub const COMMENT_RECEIVED: u64 = 3;
/// Reward to the creator when a meme receives a share
pub const SHARE_RECEIVED: u64 = 5;
/// Bonus when a meme enters the trending set
pub const TRENDING_BONUS: u64 = 50;
/// Daily login reward
pub const DAILY_LOGIN: u64 = 5;
/// One-off bonus for a user's first meme
pub const FIRST_MEME: u64 = 25;

/// Meme creation reward amount
pub fn creation_reward() -> Decimal {
    Decimal::from(CREATE_MEME)
}

/// Flat reward for receiving an engagement of the given kind
pub fn engagement_reward(kind: EngagementType) -> Decimal {
    let amount = match kind {
        EngagementType::Upvote => UPVOTE_RECEIVED,
        EngagementType::Comment => COMMENT_RECEIVED,
        EngagementType::Share => SHARE_RECEIVED,
    };
    Decimal::from(amount)
}

/// Trending bonus amount
pub fn trending_bonus() -> Decimal {
    Decimal::from(TRENDING_BONUS)
}

/// Daily login reward amount
pub fn daily_login_reward() -> Decimal {
    Decimal::from(DAILY_LOGIN)
}

/// First meme bonus amount
pub fn first_meme_bonus() -> Decimal {
    Decimal::from(FIRST_MEME)
}
