//! Reward Events
//!
//! One tagged variant per reward kind, each carrying only the fields that
//! kind needs. The API layer maps wire kind strings onto these variants and
//! rejects unknown kinds before they reach settlement.

use serde::{Deserialize, Serialize};

use crate::types::{EngagementType, MemeId, UserId};

/// A settlement-triggering reward event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RewardEvent {
    /// A meme was published
    MemeCreation { user_id: UserId, meme_id: MemeId },
    /// A meme received an engagement; credits the meme's creator
    Engagement {
        engager_id: UserId,
        creator_id: UserId,
        meme_id: MemeId,
        engagement_type: EngagementType,
    },
    /// A meme entered the trending set
    TrendingBonus { user_id: UserId, meme_id: MemeId },
    /// A user logged in today
    DailyLogin { user_id: UserId },
    /// A user published their first meme
    FirstMeme { user_id: UserId },
}

impl RewardEvent {
    /// The user whose balance a successful settlement credits
    pub fn recipient(&self) -> &UserId {
        match self {
            Self::MemeCreation { user_id, .. } => user_id,
            Self::Engagement { creator_id, .. } => creator_id,
            Self::TrendingBonus { user_id, .. } => user_id,
            Self::DailyLogin { user_id } => user_id,
            Self::FirstMeme { user_id } => user_id,
        }
    }

    /// Stable kind name, used in logs and settlement reports
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MemeCreation { .. } => "meme_creation",
            Self::Engagement { .. } => "engagement",
            Self::TrendingBonus { .. } => "trending_bonus",
            Self::DailyLogin { .. } => "daily_login",
            Self::FirstMeme { .. } => "first_meme",
        }
    }
}
