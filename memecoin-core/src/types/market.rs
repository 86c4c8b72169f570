//! Marketplace Records

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::common::{Currency, ItemId, MemeId, Rarity, UserId};

/// A marketplace listing
///
/// Created by the seller, destroyed atomically on purchase or cancellation.
/// `version` stamps every write so purchase settlement can compare-and-swap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketplaceItem {
    /// Unique listing identifier
    pub item_id: ItemId,
    /// The meme being sold
    pub meme_id: MemeId,
    /// Listing owner
    pub seller_id: UserId,
    /// Asking price, strictly positive
    pub price: Decimal,
    /// Settlement currency
    pub currency: Currency,
    /// Rarity tier derived from upvotes at listing time
    pub rarity: Rarity,
    /// Whether the listing is currently purchasable
    pub listed: bool,
    /// Listing timestamp
    pub listed_at: DateTime<Utc>,
    /// Version stamp for compare-and-swap writes
    #[serde(default)]
    pub version: u64,
}

impl MarketplaceItem {
    /// Create a new active listing
    pub fn new(
        meme_id: MemeId,
        seller_id: UserId,
        price: Decimal,
        currency: Currency,
        rarity: Rarity,
    ) -> Self {
        Self {
            item_id: ItemId::generate(),
            meme_id,
            seller_id,
            price,
            currency,
            rarity,
            listed: true,
            listed_at: Utc::now(),
            version: 0,
        }
    }
}

/// Receipt returned on a successful purchase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeReceipt {
    /// The purchased listing
    pub item_id: ItemId,
    /// Debited account
    pub buyer_id: UserId,
    /// Credited account
    pub seller_id: UserId,
    /// Settled price
    pub price: Decimal,
    /// Settlement currency
    pub currency: Currency,
    /// Settlement timestamp
    pub timestamp: DateTime<Utc>,
}
