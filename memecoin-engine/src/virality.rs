//! Virality Settlement
//!
//! Turns a meme's engagement into a one-off MemeCoin payout for its
//! creator. The meme carries a watermark of the engagement sum at the last
//! settlement; claiming the watermark is atomic at the store, so repeated
//! calls at the same engagement level pay once and report zero afterwards.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{error, info};

use memecoin_core::{meme_virality_reward, CoreError, CoreResult, MemeId, ViralityBreakdown};
use memecoin_store::LedgerStore;

use crate::ledger::{credit_user, store_error};

/// Result of a virality settlement.
#[derive(Debug, Clone, Serialize)]
pub struct ViralityOutcome {
    pub meme_id: MemeId,
    pub breakdown: ViralityBreakdown,
    pub amount_paid: Decimal,
    pub reason: String,
}

/// Virality payout engine.
pub struct ViralityService {
    store: Arc<dyn LedgerStore>,
}

impl ViralityService {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Settle the virality reward for a meme's current engagement.
    pub async fn settle(&self, meme_id: &MemeId) -> CoreResult<ViralityOutcome> {
        let meme = self
            .store
            .get_meme(meme_id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| CoreError::not_found("Meme", meme_id.as_str()))?;

        let now = Utc::now();
        let claimed = self
            .store
            .claim_virality(meme_id, now)
            .await
            .map_err(store_error)?;

        let Some(claimed) = claimed else {
            return Ok(ViralityOutcome {
                meme_id: meme_id.clone(),
                breakdown: meme_virality_reward(&meme, now),
                amount_paid: Decimal::ZERO,
                reason: "Virality reward already settled".to_string(),
            });
        };

        let breakdown = meme_virality_reward(&claimed, now);
        if let Err(err) = credit_user(&self.store, &claimed.creator_id, breakdown.total).await {
            // The watermark stays stamped; the creator keeps the shortfall
            // until new engagement reopens settlement.
            error!(
                meme_id = %meme_id,
                creator_id = %claimed.creator_id,
                amount = %breakdown.total,
                error = %err,
                "virality credit failed after watermark claim"
            );
            return Err(err);
        }

        info!(
            meme_id = %meme_id,
            creator_id = %claimed.creator_id,
            amount = %breakdown.total,
            "virality reward settled"
        );
        Ok(ViralityOutcome {
            meme_id: meme_id.clone(),
            amount_paid: breakdown.total,
            breakdown,
            reason: "Virality reward settled".to_string(),
        })
    }
}
