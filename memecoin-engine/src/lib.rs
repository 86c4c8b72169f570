//! MemeCoin Engine - Settlement Services
//!
//! Orchestration between the domain rules in `memecoin-core`, the
//! [`LedgerStore`](memecoin_store::LedgerStore) backends and the outbound
//! bridges:
//! - **RewardService**: evaluates reward events and credits balances
//! - **EngagementService**: records engagements and pays the meme creator
//! - **ViralityService**: watermark-gated virality settlement
//! - **MarketplaceService**: listing, purchase and cancellation
//! - **TrendService**: trend seeding, listing and upserts
//! - **RateLimiter**: token-bucket request throttling
//!
//! Every service settles against the store first; chain and trend mirrors run
//! as post-commit hooks whose failures are logged, never propagated. Balance
//! and item writes go through versioned saves and retry a bounded number of
//! times when they lose a version race.

pub mod engagement;
pub mod hooks;
pub mod marketplace;
pub mod rate_limit;
pub mod reward;
pub mod trends;
pub mod virality;

mod ledger;

pub use engagement::{EngagementOutcome, EngagementService};
pub use hooks::{ChainMirrorHook, HookSet, PostCommitHook, SettlementNotice, TrendBumpHook};
pub use marketplace::{ListingFilter, MarketplaceService};
pub use rate_limit::{start_cleanup_task, RateDecision, RateLimitConfig, RateLimiter};
pub use reward::{EarningsSummary, RewardOutcome, RewardService};
pub use trends::TrendService;
pub use virality::{ViralityOutcome, ViralityService};

/// How many version races a balance or listing write absorbs before the
/// settlement reports a conflict
pub(crate) const CAS_RETRY_ATTEMPTS: usize = 3;
