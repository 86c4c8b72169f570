//! Domain Types
//!
//! Record types persisted in the Ledger Store and the identifiers and enums
//! shared across the platform.

pub mod common;
pub mod market;
pub mod meme;
pub mod trend;
pub mod user;

pub use common::{
    Currency, EngagementId, EngagementType, ItemId, MemeId, Rarity, TrendCategory, TrendId, UserId,
};
pub use market::{MarketplaceItem, TradeReceipt};
pub use meme::{Engagement, Meme};
pub use trend::Trend;
pub use user::{User, FIRST_MEME_BADGE};
