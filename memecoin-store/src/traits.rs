//! Ledger store interface
//!
//! Everything the settlement and content services need from persistence,
//! expressed as a single async trait so backends stay swappable.
//!
//! # Design notes
//!
//! - Settled balances and badges live on the user record; versioned saves
//!   are the only way to mutate them.
//! - Engagement uniqueness is enforced at the store for kinds that are
//!   unique per user, closing the race between lookup and insert.
//! - The trending index is a sorted view keyed by raw engagement sum and
//!   is maintained explicitly by callers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use memecoin_core::{
    Engagement, EngagementId, EngagementType, ItemId, MarketplaceItem, Meme, MemeId, Trend,
    TrendId, User, UserId,
};

use crate::error::StoreResult;

/// Filter for meme listings. Empty query returns the newest memes.
#[derive(Debug, Clone, Default)]
pub struct MemeQuery {
    pub creator_id: Option<UserId>,
    pub topic: Option<String>,
    pub limit: Option<usize>,
}

impl MemeQuery {
    pub fn by_creator(creator_id: UserId) -> Self {
        Self {
            creator_id: Some(creator_id),
            ..Self::default()
        }
    }

    pub fn by_topic(topic: impl Into<String>) -> Self {
        Self {
            topic: Some(topic.into()),
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, meme: &Meme) -> bool {
        if let Some(creator_id) = &self.creator_id {
            if &meme.creator_id != creator_id {
                return false;
            }
        }
        if let Some(topic) = &self.topic {
            if !meme.topic.eq_ignore_ascii_case(topic) {
                return false;
            }
        }
        true
    }
}

/// Ledger store interface
///
/// Defines all persistence operations for the platform. Reads treat
/// expired records as absent; `cleanup_expired` reclaims them.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    // ==================== User operations ====================

    /// Save a user record unconditionally, refreshing its retention window.
    async fn save_user(&self, user: &User) -> StoreResult<()>;

    /// Save a user record only if the stored version matches.
    ///
    /// Stamps `version = expected_version + 1` and returns the stored
    /// record. Fails with `VersionConflict` when a concurrent writer got
    /// there first and `Missing` when the record does not exist.
    async fn save_user_versioned(&self, user: &User, expected_version: u64) -> StoreResult<User>;

    /// Get a user record.
    async fn get_user(&self, user_id: &UserId) -> StoreResult<Option<User>>;

    /// List users ordered by balance, highest first.
    async fn list_users_by_balance(&self, limit: usize) -> StoreResult<Vec<User>>;

    // ==================== Meme operations ====================

    /// Save a meme record.
    async fn save_meme(&self, meme: &Meme) -> StoreResult<()>;

    /// Get a meme record.
    async fn get_meme(&self, meme_id: &MemeId) -> StoreResult<Option<Meme>>;

    /// List memes matching a query, newest first.
    async fn list_memes(&self, query: &MemeQuery) -> StoreResult<Vec<Meme>>;

    /// Atomically increment one engagement counter and return the updated meme.
    async fn apply_engagement(&self, meme_id: &MemeId, kind: EngagementType) -> StoreResult<Meme>;

    /// Atomically claim a meme's virality payout.
    ///
    /// Stamps the settlement watermark at the current engagement sum and
    /// returns the stamped meme, or `None` when the watermark already
    /// covers the current sum and there is nothing to pay. Two concurrent
    /// claims can never both receive `Some`.
    async fn claim_virality(
        &self,
        meme_id: &MemeId,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Meme>>;

    // ==================== Trending index operations ====================

    /// Set a meme's score in the trending index.
    async fn update_trending_index(&self, meme_id: &MemeId, engagement_sum: u64)
        -> StoreResult<()>;

    /// Top entries of the trending index, highest engagement sum first.
    async fn top_trending(&self, limit: usize) -> StoreResult<Vec<(MemeId, u64)>>;

    // ==================== Engagement operations ====================

    /// Save an engagement record.
    ///
    /// For kinds that are unique per user and meme this acts as an
    /// insert-if-absent and fails with `Duplicate` when the pair has
    /// already engaged this way.
    async fn save_engagement(&self, engagement: &Engagement) -> StoreResult<()>;

    /// Get an engagement record.
    async fn get_engagement(&self, engagement_id: &EngagementId)
        -> StoreResult<Option<Engagement>>;

    /// Find an engagement by its (user, meme, kind) triple.
    async fn find_engagement(
        &self,
        user_id: &UserId,
        meme_id: &MemeId,
        kind: EngagementType,
    ) -> StoreResult<Option<Engagement>>;

    /// List engagements for a meme, newest first.
    async fn list_engagements_for_meme(&self, meme_id: &MemeId) -> StoreResult<Vec<Engagement>>;

    // ==================== Trend operations ====================

    /// Save a trend record.
    async fn save_trend(&self, trend: &Trend) -> StoreResult<()>;

    /// Get a trend record.
    async fn get_trend(&self, trend_id: &TrendId) -> StoreResult<Option<Trend>>;

    /// List trends ordered by frequency, highest first.
    async fn list_trends(&self, limit: usize) -> StoreResult<Vec<Trend>>;

    // ==================== Marketplace operations ====================

    /// Save a marketplace item unconditionally.
    async fn save_item(&self, item: &MarketplaceItem) -> StoreResult<()>;

    /// Save a marketplace item only if the stored version matches.
    ///
    /// Same contract as [`LedgerStore::save_user_versioned`].
    async fn save_item_versioned(
        &self,
        item: &MarketplaceItem,
        expected_version: u64,
    ) -> StoreResult<MarketplaceItem>;

    /// Get a marketplace item.
    async fn get_item(&self, item_id: &ItemId) -> StoreResult<Option<MarketplaceItem>>;

    /// Remove a marketplace item.
    async fn delete_item(&self, item_id: &ItemId) -> StoreResult<()>;

    /// List items currently up for sale, most recently listed first.
    async fn list_listed_items(&self) -> StoreResult<Vec<MarketplaceItem>>;

    // ==================== Maintenance operations ====================

    /// Get store statistics.
    async fn get_stats(&self) -> StoreResult<StoreStats>;

    /// Remove records whose retention window ended before `now`.
    ///
    /// Returns the number of records removed. User records carry settled
    /// balances and badges, so their window is refreshed on every write
    /// rather than swept aggressively.
    async fn cleanup_expired(&self, now: DateTime<Utc>) -> StoreResult<u64>;
}

/// Store statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct StoreStats {
    pub total_users: u64,
    pub total_memes: u64,
    pub total_engagements: u64,
    pub total_trends: u64,
    pub total_items: u64,
    pub listed_items: u64,
}
