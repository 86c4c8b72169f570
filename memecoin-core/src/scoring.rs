//! Virality and Trending Scoring
//!
//! Two scores with different jobs:
//! - the **trending score** orders feeds: weighted engagement decayed by age,
//! - the **virality reward** turns a meme's engagement into a one-off
//!   MemeCoin amount.
//!
//! The persisted trending index is keyed by the raw engagement sum; the
//! decayed score is applied in memory when ranking candidates. Cheap index
//! for storage-layer top-K, precise score for final ordering.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::types::Meme;

/// Floor on the time decay factor; a meme's score never fully decays away
pub const DECAY_FLOOR: f64 = 0.1;
/// Hours over which the decay factor falls linearly to the floor
pub const DECAY_WINDOW_HOURS: f64 = 24.0;
/// Flat virality bonus for memes carrying a topic
pub const TOPIC_BONUS: f64 = 0.5;
/// Cap on the upvote multiplier in the virality formula
pub const UPVOTE_MULTIPLIER_CAP: f64 = 2.0;

/// Linear decay from 1.0 down to the floor over the decay window
fn decay_factor(age_hours: f64) -> f64 {
    (1.0 - age_hours / DECAY_WINDOW_HOURS).max(DECAY_FLOOR)
}

/// Feed-ordering trending score
///
/// `(upvotes*3 + shares*5 + comments*2) * max(0.1, 1 - age_hours/24)`.
/// Monotonic in every counter, monotonically decreasing in age.
pub fn trending_score(upvotes: u64, shares: u64, comments: u64, age_hours: f64) -> f64 {
    let raw = (upvotes * 3 + shares * 5 + comments * 2) as f64;
    raw * decay_factor(age_hours)
}

/// Trending score for a meme at `now`
pub fn meme_trending_score(meme: &Meme, now: DateTime<Utc>) -> f64 {
    trending_score(meme.upvotes, meme.shares, meme.comments, meme.age_hours(now))
}

/// Breakdown of a virality reward calculation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViralityBreakdown {
    /// Base reward before multipliers
    pub base_reward: Decimal,
    /// Upvote multiplier, capped
    pub upvote_multiplier: f64,
    /// Share multiplier
    pub share_multiplier: f64,
    /// Comment multiplier
    pub comment_multiplier: f64,
    /// Time decay factor
    pub time_multiplier: f64,
    /// Topic bonus
    pub trend_bonus: f64,
    /// Final amount, rounded to two decimal places
    pub total: Decimal,
}

impl ViralityBreakdown {
    /// Combined engagement multiplier, time decay excluded
    pub fn virality_multiplier(&self) -> f64 {
        self.upvote_multiplier + self.share_multiplier + self.comment_multiplier
    }
}

/// Per-meme monetary virality reward
///
/// `total = 1.0 * (1 + upvote + share + comment multipliers) * time decay
/// + topic bonus`, where the upvote multiplier is `min(upvotes * 0.1, 2.0)`,
/// shares weigh 0.5 and comments 0.2 each. Rounded to two decimal places,
/// half away from zero.
pub fn virality_reward(
    upvotes: u64,
    shares: u64,
    comments: u64,
    age_hours: f64,
    has_topic: bool,
) -> ViralityBreakdown {
    let upvote_multiplier = (upvotes as f64 * 0.1).min(UPVOTE_MULTIPLIER_CAP);
    let share_multiplier = shares as f64 * 0.5;
    let comment_multiplier = comments as f64 * 0.2;
    let time_multiplier = decay_factor(age_hours);
    let trend_bonus = if has_topic { TOPIC_BONUS } else { 0.0 };

    let total = (1.0 + upvote_multiplier + share_multiplier + comment_multiplier)
        * time_multiplier
        + trend_bonus;
    let total = Decimal::from_f64(total)
        .unwrap_or(Decimal::ZERO)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    ViralityBreakdown {
        base_reward: Decimal::ONE,
        upvote_multiplier,
        share_multiplier,
        comment_multiplier,
        time_multiplier,
        trend_bonus,
        total,
    }
}

/// Virality reward for a meme at `now`
pub fn meme_virality_reward(meme: &Meme, now: DateTime<Utc>) -> ViralityBreakdown {
    virality_reward(
        meme.upvotes,
        meme.shares,
        meme.comments,
        meme.age_hours(now),
        !meme.topic.is_empty(),
    )
}
