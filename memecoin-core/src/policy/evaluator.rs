//! Policy Evaluation
//!
//! Pure mapping from a reward event and the recipient's current state to a
//! decision. Zero-amount decisions are valid outcomes (self-engagement,
//! already-claimed badge), never errors.

use rust_decimal::Decimal;
use serde::Serialize;

use super::{events::RewardEvent, rules};
use crate::types::{User, FIRST_MEME_BADGE};

/// Outcome of a policy evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RewardDecision {
    /// Amount to credit; zero for recognized no-pay outcomes
    pub amount: Decimal,
    /// Human-readable reason
    pub reason: String,
    /// Badge to grant alongside the credit, if any
    pub badge: Option<&'static str>,
}

impl RewardDecision {
    fn pay(amount: Decimal, reason: impl Into<String>) -> Self {
        Self {
            amount,
            reason: reason.into(),
            badge: None,
        }
    }

    fn skip(reason: impl Into<String>) -> Self {
        Self {
            amount: Decimal::ZERO,
            reason: reason.into(),
            badge: None,
        }
    }

    /// Whether the decision carries a payout
    pub fn pays(&self) -> bool {
        self.amount > Decimal::ZERO
    }
}

/// Evaluate the reward policy for an event against the recipient's state
pub fn evaluate(event: &RewardEvent, recipient: &User) -> RewardDecision {
    match event {
        RewardEvent::MemeCreation { .. } => {
            RewardDecision::pay(rules::creation_reward(), "Meme creation reward")
        }
        RewardEvent::Engagement {
            engager_id,
            creator_id,
            engagement_type,
            ..
        } => {
            // Self-engagement settles successfully but never pays
            if engager_id == creator_id {
                return RewardDecision::skip("Self-engagement not rewarded");
            }
            RewardDecision::pay(
                rules::engagement_reward(*engagement_type),
                format!("{} reward", engagement_type),
            )
        }
        RewardEvent::TrendingBonus { .. } => {
            RewardDecision::pay(rules::trending_bonus(), "Trending meme bonus")
        }
        RewardEvent::DailyLogin { .. } => {
            RewardDecision::pay(rules::daily_login_reward(), "Daily login reward")
        }
        RewardEvent::FirstMeme { .. } => {
            if recipient.has_badge(FIRST_MEME_BADGE) {
                return RewardDecision::skip("First meme bonus already claimed");
            }
            RewardDecision {
                amount: rules::first_meme_bonus(),
                reason: "First meme bonus".to_string(),
                badge: Some(FIRST_MEME_BADGE),
            }
        }
    }
}
