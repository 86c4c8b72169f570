//! Post-Commit Hooks
//!
//! Settlement returns after the authoritative store write; everything
//! best-effort (on-chain mirror, trend bookkeeping) runs afterwards as a
//! hook. A failing hook is logged and never unwinds the settlement.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use memecoin_bridge::ChainBridge;
use memecoin_core::{MemeId, Trend, TrendCategory, TrendId, UserId};
use memecoin_store::LedgerStore;

/// What a finished settlement looked like, from a hook's point of view.
#[derive(Debug, Clone)]
pub struct SettlementNotice {
    /// The credited user
    pub user_id: UserId,
    /// The credited user's linked wallet, if any
    pub wallet_address: Option<String>,
    /// The meme involved, when the event kind has one
    pub meme_id: Option<MemeId>,
    /// Event kind name
    pub kind: &'static str,
    /// Amount credited to the ledger
    pub amount: Decimal,
}

/// A best-effort follower of successful settlements.
#[async_trait]
pub trait PostCommitHook: Send + Sync {
    /// Hook name for logs.
    fn name(&self) -> &'static str;

    /// React to a settled reward. Errors are logged by the dispatcher.
    async fn on_settled(&self, notice: &SettlementNotice) -> Result<(), String>;
}

/// Ordered hook list dispatched after every paying settlement.
#[derive(Clone, Default)]
pub struct HookSet {
    hooks: Vec<Arc<dyn PostCommitHook>>,
}

impl HookSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, hook: Arc<dyn PostCommitHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Run every hook, isolating failures to a warning each.
    pub async fn dispatch(&self, notice: &SettlementNotice) {
        for hook in &self.hooks {
            if let Err(err) = hook.on_settled(notice).await {
                warn!(
                    hook = hook.name(),
                    user_id = %notice.user_id,
                    kind = notice.kind,
                    error = %err,
                    "post-commit hook failed"
                );
            }
        }
    }
}

/// Mirrors ledger credits to the reward contract for wallet-linked users.
pub struct ChainMirrorHook {
    chain: Arc<ChainBridge>,
}

impl ChainMirrorHook {
    pub fn new(chain: Arc<ChainBridge>) -> Self {
        Self { chain }
    }
}

#[async_trait]
impl PostCommitHook for ChainMirrorHook {
    fn name(&self) -> &'static str {
        "chain_mirror"
    }

    async fn on_settled(&self, notice: &SettlementNotice) -> Result<(), String> {
        if notice.amount <= Decimal::ZERO {
            return Ok(());
        }
        let Some(wallet) = notice.wallet_address.as_deref() else {
            debug!(user_id = %notice.user_id, "no wallet linked, skipping chain mirror");
            return Ok(());
        };

        let result = self.chain.reward_user(wallet, notice.amount).await;
        if result.success {
            Ok(())
        } else {
            Err(result
                .error
                .unwrap_or_else(|| "chain reward rejected".to_string()))
        }
    }
}

/// Counts one topic observation per settled meme reward.
pub struct TrendBumpHook {
    store: Arc<dyn LedgerStore>,
}

impl TrendBumpHook {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PostCommitHook for TrendBumpHook {
    fn name(&self) -> &'static str {
        "trend_bump"
    }

    async fn on_settled(&self, notice: &SettlementNotice) -> Result<(), String> {
        let Some(meme_id) = &notice.meme_id else {
            return Ok(());
        };
        let meme = match self.store.get_meme(meme_id).await {
            Ok(Some(meme)) => meme,
            Ok(None) => return Ok(()),
            Err(err) => return Err(err.to_string()),
        };
        if meme.topic.is_empty() {
            return Ok(());
        }

        let trend_id = TrendId::from_keyword(&meme.topic);
        let trend = match self.store.get_trend(&trend_id).await {
            Ok(Some(mut existing)) => {
                existing.bump();
                existing
            }
            Ok(None) => Trend::new(&meme.topic, TrendCategory::General),
            Err(err) => return Err(err.to_string()),
        };
        self.store
            .save_trend(&trend)
            .await
            .map_err(|e| e.to_string())
    }
}
