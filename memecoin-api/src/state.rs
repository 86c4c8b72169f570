//! Shared Application State

use std::sync::Arc;

use memecoin_bridge::Bridges;
use memecoin_engine::{
    ChainMirrorHook, EngagementService, HookSet, MarketplaceService, RateLimitConfig, RateLimiter,
    RewardService, TrendBumpHook, TrendService, ViralityService,
};
use memecoin_store::LedgerStore;

/// Public base URL the frame surface links back to
pub const DEFAULT_APP_URL: &str = "https://memecoin-mania.com";

/// Everything the handlers need, cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LedgerStore>,
    pub bridges: Bridges,
    pub rewards: Arc<RewardService>,
    pub engagements: Arc<EngagementService>,
    pub virality: Arc<ViralityService>,
    pub marketplace: Arc<MarketplaceService>,
    pub trends: Arc<TrendService>,
    pub limiter: RateLimiter,
    pub app_url: String,
}

impl AppState {
    /// Wire the service graph over one store and one bridge set.
    ///
    /// Reward settlements dispatch two post-commit hooks: the on-chain
    /// mirror and the trend frequency bump.
    pub fn new(
        store: Arc<dyn LedgerStore>,
        bridges: Bridges,
        rate_config: RateLimitConfig,
    ) -> Self {
        let hooks = Arc::new(
            HookSet::new()
                .add(Arc::new(ChainMirrorHook::new(bridges.chain.clone())))
                .add(Arc::new(TrendBumpHook::new(store.clone()))),
        );
        let rewards = Arc::new(RewardService::new(store.clone(), hooks));
        let engagements = Arc::new(EngagementService::new(store.clone(), rewards.clone()));
        let virality = Arc::new(ViralityService::new(store.clone()));
        let marketplace = Arc::new(MarketplaceService::new(store.clone(), bridges.chain.clone()));
        let trends = Arc::new(TrendService::new(store.clone(), bridges.social.clone()));

        Self {
            store,
            bridges,
            rewards,
            engagements,
            virality,
            marketplace,
            trends,
            limiter: RateLimiter::new(rate_config),
            app_url: DEFAULT_APP_URL.to_string(),
        }
    }

    /// Override the base URL the frame surface links back to.
    pub fn with_app_url(mut self, url: impl Into<String>) -> Self {
        self.app_url = url.into();
        self
    }
}
