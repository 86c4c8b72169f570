//! Reward Settlement
//!
//! Settles one reward event at a time: read the recipient, evaluate the
//! policy against their current state, write the credited record back with
//! a versioned save. A lost version race re-reads and re-evaluates, so a
//! badge can never be paid twice and no credit is ever lost. Post-commit
//! hooks run only after the write lands.

use std::sync::Arc;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use tracing::{debug, info};

use memecoin_core::{evaluate, CoreError, CoreResult, RewardEvent, UserId};
use memecoin_store::{LedgerStore, StoreError};

use crate::hooks::{HookSet, SettlementNotice};
use crate::ledger::store_error;
use crate::CAS_RETRY_ATTEMPTS;

/// Result of a reward settlement.
///
/// Recognized no-pay outcomes (self-engagement, already-claimed bonus)
/// settle successfully with a zero amount; failures are errors instead.
#[derive(Debug, Clone, Serialize)]
pub struct RewardOutcome {
    pub success: bool,
    pub amount: Decimal,
    pub reason: String,
}

/// Balance-derived earnings estimate.
///
/// Reward history is not persisted, so the split mirrors the platform's
/// reported estimate: 60% creation, 30% engagement, 10% bonuses.
#[derive(Debug, Clone, Serialize)]
pub struct EarningsSummary {
    pub total_earned: Decimal,
    pub creation_estimate: Decimal,
    pub engagement_estimate: Decimal,
    pub bonus_estimate: Decimal,
    pub badges: Vec<String>,
}

/// Reward settlement engine.
pub struct RewardService {
    store: Arc<dyn LedgerStore>,
    hooks: Arc<HookSet>,
}

impl RewardService {
    pub fn new(store: Arc<dyn LedgerStore>, hooks: Arc<HookSet>) -> Self {
        Self { store, hooks }
    }

    /// Settle a reward event against the recipient's ledger record.
    pub async fn settle(&self, event: RewardEvent) -> CoreResult<RewardOutcome> {
        let recipient = event.recipient().clone();

        for attempt in 0..CAS_RETRY_ATTEMPTS {
            let user = self
                .store
                .get_user(&recipient)
                .await
                .map_err(store_error)?
                .ok_or_else(|| CoreError::not_found("User", recipient.as_str()))?;

            let decision = evaluate(&event, &user);
            if !decision.pays() && decision.badge.is_none() {
                debug!(
                    user_id = %recipient,
                    kind = event.kind(),
                    reason = %decision.reason,
                    "settlement pays nothing"
                );
                return Ok(RewardOutcome {
                    success: true,
                    amount: Decimal::ZERO,
                    reason: decision.reason,
                });
            }

            let mut updated = user.clone();
            updated.credit(decision.amount);
            if let Some(badge) = decision.badge {
                updated.grant_badge(badge);
            }

            match self.store.save_user_versioned(&updated, user.version).await {
                Ok(saved) => {
                    info!(
                        user_id = %recipient,
                        kind = event.kind(),
                        amount = %decision.amount,
                        balance = %saved.meme_coin_balance,
                        "reward settled"
                    );

                    let notice = SettlementNotice {
                        user_id: recipient,
                        wallet_address: saved.wallet_address.clone(),
                        meme_id: event_meme_id(&event),
                        kind: event.kind(),
                        amount: decision.amount,
                    };
                    self.hooks.dispatch(&notice).await;

                    return Ok(RewardOutcome {
                        success: true,
                        amount: decision.amount,
                        reason: decision.reason,
                    });
                }
                Err(StoreError::VersionConflict { .. }) => {
                    debug!(user_id = %recipient, attempt, "settlement lost the version race, retrying");
                    continue;
                }
                Err(err) => return Err(store_error(err)),
            }
        }

        Err(CoreError::conflict(format!(
            "Settlement for {} kept losing version races",
            recipient
        )))
    }

    /// Balance plus the estimated earnings split for a user.
    pub async fn earnings(&self, user_id: &UserId) -> CoreResult<EarningsSummary> {
        let user = self
            .store
            .get_user(user_id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| CoreError::not_found("User", user_id.as_str()))?;

        let total = user.meme_coin_balance;
        // Normalized so a 60% share of 50 serializes as "30", not "30.0".
        let estimate = |share: Decimal| {
            (total * share)
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
                .normalize()
        };

        Ok(EarningsSummary {
            total_earned: total,
            creation_estimate: estimate(Decimal::new(6, 1)),
            engagement_estimate: estimate(Decimal::new(3, 1)),
            bonus_estimate: estimate(Decimal::new(1, 1)),
            badges: user.badges,
        })
    }
}

fn event_meme_id(event: &RewardEvent) -> Option<memecoin_core::MemeId> {
    match event {
        RewardEvent::MemeCreation { meme_id, .. }
        | RewardEvent::Engagement { meme_id, .. }
        | RewardEvent::TrendingBonus { meme_id, .. } => Some(meme_id.clone()),
        RewardEvent::DailyLogin { .. } | RewardEvent::FirstMeme { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memecoin_core::{EngagementType, MemeId, User, FIRST_MEME_BADGE};
    use memecoin_store::{MemoryStore, StoreConfig};

    fn service() -> (RewardService, Arc<dyn LedgerStore>) {
        let store: Arc<dyn LedgerStore> = Arc::new(MemoryStore::new(StoreConfig::test()));
        let service = RewardService::new(store.clone(), Arc::new(HookSet::new()));
        (service, store)
    }

    async fn seed_user(store: &Arc<dyn LedgerStore>, id: &str) -> UserId {
        let user = User::new(UserId::new(id));
        store.save_user(&user).await.unwrap();
        user.user_id
    }

    #[tokio::test]
    async fn test_creation_reward_credits_ten() {
        let (service, store) = service();
        let user_id = seed_user(&store, "creator_1").await;

        let outcome = service
            .settle(RewardEvent::MemeCreation {
                user_id: user_id.clone(),
                meme_id: MemeId::new("meme_1"),
            })
            .await
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.amount, Decimal::from(10u32));
        assert_eq!(outcome.reason, "Meme creation reward");

        let user = store.get_user(&user_id).await.unwrap().unwrap();
        assert_eq!(user.meme_coin_balance, Decimal::from(10u32));
        assert_eq!(user.version, 1);
    }

    #[tokio::test]
    async fn test_self_engagement_settles_without_writing() {
        let (service, store) = service();
        let user_id = seed_user(&store, "creator_1").await;

        let outcome = service
            .settle(RewardEvent::Engagement {
                engager_id: user_id.clone(),
                creator_id: user_id.clone(),
                meme_id: MemeId::new("meme_1"),
                engagement_type: EngagementType::Upvote,
            })
            .await
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.amount, Decimal::ZERO);
        assert_eq!(outcome.reason, "Self-engagement not rewarded");

        let user = store.get_user(&user_id).await.unwrap().unwrap();
        assert_eq!(user.meme_coin_balance, Decimal::ZERO);
        assert_eq!(user.version, 0);
    }

    #[tokio::test]
    async fn test_first_meme_pays_once() {
        let (service, store) = service();
        let user_id = seed_user(&store, "creator_1").await;
        let event = RewardEvent::FirstMeme {
            user_id: user_id.clone(),
        };

        let first = service.settle(event.clone()).await.unwrap();
        assert_eq!(first.amount, Decimal::from(25u32));

        let second = service.settle(event).await.unwrap();
        assert!(second.success);
        assert_eq!(second.amount, Decimal::ZERO);
        assert_eq!(second.reason, "First meme bonus already claimed");

        let user = store.get_user(&user_id).await.unwrap().unwrap();
        assert_eq!(user.meme_coin_balance, Decimal::from(25u32));
        assert_eq!(
            user.badges.iter().filter(|b| *b == FIRST_MEME_BADGE).count(),
            1
        );
    }

    #[tokio::test]
    async fn test_unknown_recipient_fails() {
        let (service, _) = service();
        let err = service
            .settle(RewardEvent::DailyLogin {
                user_id: UserId::new("ghost"),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { entity: "User", .. }));
    }

    #[tokio::test]
    async fn test_engagement_credits_creator_not_engager() {
        let (service, store) = service();
        let creator = seed_user(&store, "creator_1").await;
        let fan = seed_user(&store, "fan_1").await;

        let outcome = service
            .settle(RewardEvent::Engagement {
                engager_id: fan.clone(),
                creator_id: creator.clone(),
                meme_id: MemeId::new("meme_1"),
                engagement_type: EngagementType::Share,
            })
            .await
            .unwrap();
        assert_eq!(outcome.amount, Decimal::from(5u32));

        let creator_record = store.get_user(&creator).await.unwrap().unwrap();
        let fan_record = store.get_user(&fan).await.unwrap().unwrap();
        assert_eq!(creator_record.meme_coin_balance, Decimal::from(5u32));
        assert_eq!(fan_record.meme_coin_balance, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_earnings_split() {
        let (service, store) = service();
        let user_id = seed_user(&store, "creator_1").await;
        service
            .settle(RewardEvent::TrendingBonus {
                user_id: user_id.clone(),
                meme_id: MemeId::new("meme_1"),
            })
            .await
            .unwrap();

        let summary = service.earnings(&user_id).await.unwrap();
        assert_eq!(summary.total_earned, Decimal::from(50u32));
        assert_eq!(summary.creation_estimate, Decimal::from(30u32));
        assert_eq!(summary.engagement_estimate, Decimal::from(15u32));
        assert_eq!(summary.bonus_estimate, Decimal::from(5u32));
    }
}
