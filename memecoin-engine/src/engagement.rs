//! Engagement Recording
//!
//! Records upvotes, comments and shares against a meme, moves the matching
//! counter by exactly one, refreshes the trending index, then settles the
//! creator's reward. Uniqueness for upvotes and shares is enforced by the
//! store's insert-if-absent, so a duplicate surfaces as `Conflict` before
//! any counter moves.

use std::sync::Arc;

use tracing::{debug, info};

use memecoin_core::{
    CoreError, CoreResult, Engagement, EngagementType, Meme, MemeId, RewardEvent, UserId,
};
use memecoin_store::{LedgerStore, StoreError};

use crate::ledger::store_error;
use crate::reward::{RewardOutcome, RewardService};

/// A recorded engagement with the state it produced.
#[derive(Debug, Clone)]
pub struct EngagementOutcome {
    pub engagement: Engagement,
    pub meme: Meme,
    pub reward: RewardOutcome,
}

/// Engagement recording engine.
pub struct EngagementService {
    store: Arc<dyn LedgerStore>,
    rewards: Arc<RewardService>,
}

impl EngagementService {
    pub fn new(store: Arc<dyn LedgerStore>, rewards: Arc<RewardService>) -> Self {
        Self { store, rewards }
    }

    /// Record one engagement and settle the creator's reward.
    pub async fn record(
        &self,
        user_id: UserId,
        meme_id: MemeId,
        kind: EngagementType,
        content: Option<String>,
    ) -> CoreResult<EngagementOutcome> {
        // 1. Both sides must exist
        self.store
            .get_user(&user_id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| CoreError::not_found("User", user_id.as_str()))?;
        let meme = self
            .store
            .get_meme(&meme_id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| CoreError::not_found("Meme", meme_id.as_str()))?;

        // 2. Comments carry a body; other kinds never do
        let content = match kind {
            EngagementType::Comment => {
                let body = content
                    .as_deref()
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .ok_or_else(|| {
                        CoreError::validation("commentText is required for comment type")
                    })?;
                Some(body.to_string())
            }
            _ => None,
        };

        // 3. Unique kinds already recorded for this pair reject early
        if kind.unique_per_user() {
            let existing = self
                .store
                .find_engagement(&user_id, &meme_id, kind)
                .await
                .map_err(store_error)?;
            if existing.is_some() {
                return Err(CoreError::conflict("Engagement already exists"));
            }
        }

        // 4. Insert the record; the store closes the check-then-insert race
        let engagement = Engagement::new(user_id.clone(), meme_id.clone(), kind, content);
        match self.store.save_engagement(&engagement).await {
            Ok(()) => {}
            Err(StoreError::Duplicate { .. }) => {
                return Err(CoreError::conflict("Engagement already exists"));
            }
            Err(err) => return Err(store_error(err)),
        }

        // 5. Move the counter and refresh the trending index
        let updated = self
            .store
            .apply_engagement(&meme_id, kind)
            .await
            .map_err(store_error)?;
        self.store
            .update_trending_index(&meme_id, updated.engagement_sum())
            .await
            .map_err(store_error)?;
        debug!(
            meme_id = %meme_id,
            kind = %kind,
            engagement_sum = updated.engagement_sum(),
            "engagement counter moved"
        );

        // 6. Settle the creator's reward (zero for self-engagement)
        let reward = self
            .rewards
            .settle(RewardEvent::Engagement {
                engager_id: user_id.clone(),
                creator_id: meme.creator_id.clone(),
                meme_id: meme_id.clone(),
                engagement_type: kind,
            })
            .await?;

        info!(
            user_id = %user_id,
            meme_id = %meme_id,
            kind = %kind,
            reward_amount = %reward.amount,
            "engagement recorded"
        );

        Ok(EngagementOutcome {
            engagement,
            meme: updated,
            reward,
        })
    }

    /// List a meme's engagements, newest first.
    pub async fn list_for_meme(&self, meme_id: &MemeId) -> CoreResult<Vec<Engagement>> {
        self.store
            .list_engagements_for_meme(meme_id)
            .await
            .map_err(store_error)
    }
}
