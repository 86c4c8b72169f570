//! In-memory store implementation
//!
//! Thread-safe map-backed implementation, the default for development and
//! tests. Retention is honored by filtering on read and reclaiming in
//! `cleanup_expired`, so behavior matches the persistent backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use memecoin_core::{
    Engagement, EngagementId, EngagementType, ItemId, MarketplaceItem, Meme, MemeId, Trend,
    TrendId, User, UserId,
};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::stored::Stored;
use crate::traits::{LedgerStore, MemeQuery, StoreStats};

type EngagementKey = (UserId, MemeId, EngagementType);

/// In-memory store
///
/// Shared state behind `RwLock`s. Record maps are always locked before
/// index maps so multi-lock paths cannot deadlock.
#[derive(Debug)]
pub struct MemoryStore {
    config: StoreConfig,
    users: Arc<RwLock<HashMap<UserId, Stored<User>>>>,
    memes: Arc<RwLock<HashMap<MemeId, Stored<Meme>>>>,
    engagements: Arc<RwLock<HashMap<EngagementId, Stored<Engagement>>>>,
    trends: Arc<RwLock<HashMap<TrendId, Stored<Trend>>>>,
    items: Arc<RwLock<HashMap<ItemId, Stored<MarketplaceItem>>>>,
    // Indexes
    engagement_index: Arc<RwLock<HashMap<EngagementKey, EngagementId>>>,
    trending_index: Arc<RwLock<HashMap<MemeId, u64>>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl MemoryStore {
    /// Create a new in-memory store with the given retention windows.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            users: Arc::new(RwLock::new(HashMap::new())),
            memes: Arc::new(RwLock::new(HashMap::new())),
            engagements: Arc::new(RwLock::new(HashMap::new())),
            trends: Arc::new(RwLock::new(HashMap::new())),
            items: Arc::new(RwLock::new(HashMap::new())),
            engagement_index: Arc::new(RwLock::new(HashMap::new())),
            trending_index: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Drop all records and indexes.
    pub async fn clear(&self) {
        self.users.write().await.clear();
        self.memes.write().await.clear();
        self.engagements.write().await.clear();
        self.trends.write().await.clear();
        self.items.write().await.clear();
        self.engagement_index.write().await.clear();
        self.trending_index.write().await.clear();
    }

    fn engagement_key(engagement: &Engagement) -> EngagementKey {
        (
            engagement.user_id.clone(),
            engagement.meme_id.clone(),
            engagement.kind,
        )
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    // ==================== User operations ====================

    async fn save_user(&self, user: &User) -> StoreResult<()> {
        let mut users = self.users.write().await;
        users.insert(
            user.user_id.clone(),
            Stored::new(user.clone(), self.config.user_ttl()),
        );
        Ok(())
    }

    async fn save_user_versioned(&self, user: &User, expected_version: u64) -> StoreResult<User> {
        let now = Utc::now();
        let mut users = self.users.write().await;

        let found = match users.get(&user.user_id) {
            Some(stored) if stored.live(now) => stored.record.version,
            _ => return Err(StoreError::missing("user", user.user_id.as_str())),
        };
        if found != expected_version {
            return Err(StoreError::VersionConflict {
                entity: "user",
                id: user.user_id.to_string(),
                expected: expected_version,
                found,
            });
        }

        let mut stamped = user.clone();
        stamped.version = expected_version + 1;
        users.insert(
            stamped.user_id.clone(),
            Stored::new(stamped.clone(), self.config.user_ttl()),
        );
        Ok(stamped)
    }

    async fn get_user(&self, user_id: &UserId) -> StoreResult<Option<User>> {
        let now = Utc::now();
        let users = self.users.read().await;
        Ok(users
            .get(user_id)
            .filter(|s| s.live(now))
            .map(|s| s.record.clone()))
    }

    async fn list_users_by_balance(&self, limit: usize) -> StoreResult<Vec<User>> {
        let now = Utc::now();
        let users = self.users.read().await;
        let mut all: Vec<User> = users
            .values()
            .filter(|s| s.live(now))
            .map(|s| s.record.clone())
            .collect();
        all.sort_by(|a, b| {
            b.meme_coin_balance
                .cmp(&a.meme_coin_balance)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        all.truncate(limit);
        Ok(all)
    }

    // ==================== Meme operations ====================

    async fn save_meme(&self, meme: &Meme) -> StoreResult<()> {
        let mut memes = self.memes.write().await;
        memes.insert(
            meme.meme_id.clone(),
            Stored::new(meme.clone(), self.config.content_ttl()),
        );
        Ok(())
    }

    async fn get_meme(&self, meme_id: &MemeId) -> StoreResult<Option<Meme>> {
        let now = Utc::now();
        let memes = self.memes.read().await;
        Ok(memes
            .get(meme_id)
            .filter(|s| s.live(now))
            .map(|s| s.record.clone()))
    }

    async fn list_memes(&self, query: &MemeQuery) -> StoreResult<Vec<Meme>> {
        let now = Utc::now();
        let memes = self.memes.read().await;
        let mut matched: Vec<Meme> = memes
            .values()
            .filter(|s| s.live(now) && query.matches(&s.record))
            .map(|s| s.record.clone())
            .collect();
        matched.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.meme_id.cmp(&b.meme_id))
        });
        if let Some(limit) = query.limit {
            matched.truncate(limit);
        }
        Ok(matched)
    }

    async fn apply_engagement(&self, meme_id: &MemeId, kind: EngagementType) -> StoreResult<Meme> {
        let now = Utc::now();
        let mut memes = self.memes.write().await;
        let stored = memes
            .get_mut(meme_id)
            .filter(|s| s.live(now))
            .ok_or_else(|| StoreError::missing("meme", meme_id.as_str()))?;

        let mut meme = stored.record.clone();
        meme.apply_engagement(kind);
        *stored = Stored::new(meme.clone(), self.config.content_ttl());
        Ok(meme)
    }

    async fn claim_virality(
        &self,
        meme_id: &MemeId,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Meme>> {
        let now = Utc::now();
        let mut memes = self.memes.write().await;
        let stored = memes
            .get_mut(meme_id)
            .filter(|s| s.live(now))
            .ok_or_else(|| StoreError::missing("meme", meme_id.as_str()))?;

        if stored.record.virality_settled() {
            return Ok(None);
        }

        let mut meme = stored.record.clone();
        meme.mark_virality_settled(at);
        *stored = Stored::new(meme.clone(), self.config.content_ttl());
        Ok(Some(meme))
    }

    // ==================== Trending index operations ====================

    async fn update_trending_index(
        &self,
        meme_id: &MemeId,
        engagement_sum: u64,
    ) -> StoreResult<()> {
        let mut trending = self.trending_index.write().await;
        trending.insert(meme_id.clone(), engagement_sum);
        Ok(())
    }

    async fn top_trending(&self, limit: usize) -> StoreResult<Vec<(MemeId, u64)>> {
        let trending = self.trending_index.read().await;
        let mut entries: Vec<(MemeId, u64)> =
            trending.iter().map(|(id, sum)| (id.clone(), *sum)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries.truncate(limit);
        Ok(entries)
    }

    // ==================== Engagement operations ====================

    async fn save_engagement(&self, engagement: &Engagement) -> StoreResult<()> {
        let now = Utc::now();
        let mut engagements = self.engagements.write().await;
        let mut index = self.engagement_index.write().await;

        let key = Self::engagement_key(engagement);
        if engagement.kind.unique_per_user() {
            if let Some(existing_id) = index.get(&key) {
                let still_live = engagements
                    .get(existing_id)
                    .map(|s| s.live(now))
                    .unwrap_or(false);
                if still_live {
                    return Err(StoreError::duplicate(
                        "engagement",
                        format!(
                            "{}|{}|{}",
                            engagement.user_id, engagement.meme_id, engagement.kind
                        ),
                    ));
                }
            }
        }

        index.insert(key, engagement.engagement_id.clone());
        engagements.insert(
            engagement.engagement_id.clone(),
            Stored::new(engagement.clone(), self.config.content_ttl()),
        );
        Ok(())
    }

    async fn get_engagement(
        &self,
        engagement_id: &EngagementId,
    ) -> StoreResult<Option<Engagement>> {
        let now = Utc::now();
        let engagements = self.engagements.read().await;
        Ok(engagements
            .get(engagement_id)
            .filter(|s| s.live(now))
            .map(|s| s.record.clone()))
    }

    async fn find_engagement(
        &self,
        user_id: &UserId,
        meme_id: &MemeId,
        kind: EngagementType,
    ) -> StoreResult<Option<Engagement>> {
        let now = Utc::now();
        let engagements = self.engagements.read().await;
        let index = self.engagement_index.read().await;

        let key = (user_id.clone(), meme_id.clone(), kind);
        Ok(index.get(&key).and_then(|id| {
            engagements
                .get(id)
                .filter(|s| s.live(now))
                .map(|s| s.record.clone())
        }))
    }

    async fn list_engagements_for_meme(&self, meme_id: &MemeId) -> StoreResult<Vec<Engagement>> {
        let now = Utc::now();
        let engagements = self.engagements.read().await;
        let mut matched: Vec<Engagement> = engagements
            .values()
            .filter(|s| s.live(now) && &s.record.meme_id == meme_id)
            .map(|s| s.record.clone())
            .collect();
        matched.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| a.engagement_id.as_str().cmp(b.engagement_id.as_str()))
        });
        Ok(matched)
    }

    // ==================== Trend operations ====================

    async fn save_trend(&self, trend: &Trend) -> StoreResult<()> {
        let mut trends = self.trends.write().await;
        trends.insert(
            trend.trend_id.clone(),
            Stored::new(trend.clone(), self.config.trend_ttl()),
        );
        Ok(())
    }

    async fn get_trend(&self, trend_id: &TrendId) -> StoreResult<Option<Trend>> {
        let now = Utc::now();
        let trends = self.trends.read().await;
        Ok(trends
            .get(trend_id)
            .filter(|s| s.live(now))
            .map(|s| s.record.clone()))
    }

    async fn list_trends(&self, limit: usize) -> StoreResult<Vec<Trend>> {
        let now = Utc::now();
        let trends = self.trends.read().await;
        let mut all: Vec<Trend> = trends
            .values()
            .filter(|s| s.live(now))
            .map(|s| s.record.clone())
            .collect();
        all.sort_by(|a, b| {
            b.frequency
                .cmp(&a.frequency)
                .then_with(|| a.keyword.cmp(&b.keyword))
        });
        all.truncate(limit);
        Ok(all)
    }

    // ==================== Marketplace operations ====================

    async fn save_item(&self, item: &MarketplaceItem) -> StoreResult<()> {
        let mut items = self.items.write().await;
        items.insert(
            item.item_id.clone(),
            Stored::new(item.clone(), self.config.content_ttl()),
        );
        Ok(())
    }

    async fn save_item_versioned(
        &self,
        item: &MarketplaceItem,
        expected_version: u64,
    ) -> StoreResult<MarketplaceItem> {
        let now = Utc::now();
        let mut items = self.items.write().await;

        let found = match items.get(&item.item_id) {
            Some(stored) if stored.live(now) => stored.record.version,
            _ => return Err(StoreError::missing("item", item.item_id.as_str())),
        };
        if found != expected_version {
            return Err(StoreError::VersionConflict {
                entity: "item",
                id: item.item_id.to_string(),
                expected: expected_version,
                found,
            });
        }

        let mut stamped = item.clone();
        stamped.version = expected_version + 1;
        items.insert(
            stamped.item_id.clone(),
            Stored::new(stamped.clone(), self.config.content_ttl()),
        );
        Ok(stamped)
    }

    async fn get_item(&self, item_id: &ItemId) -> StoreResult<Option<MarketplaceItem>> {
        let now = Utc::now();
        let items = self.items.read().await;
        Ok(items
            .get(item_id)
            .filter(|s| s.live(now))
            .map(|s| s.record.clone()))
    }

    async fn delete_item(&self, item_id: &ItemId) -> StoreResult<()> {
        let mut items = self.items.write().await;
        items.remove(item_id);
        Ok(())
    }

    async fn list_listed_items(&self) -> StoreResult<Vec<MarketplaceItem>> {
        let now = Utc::now();
        let items = self.items.read().await;
        let mut listed: Vec<MarketplaceItem> = items
            .values()
            .filter(|s| s.live(now) && s.record.listed)
            .map(|s| s.record.clone())
            .collect();
        listed.sort_by(|a, b| {
            b.listed_at
                .cmp(&a.listed_at)
                .then_with(|| a.item_id.as_str().cmp(b.item_id.as_str()))
        });
        Ok(listed)
    }

    // ==================== Maintenance operations ====================

    async fn get_stats(&self) -> StoreResult<StoreStats> {
        let now = Utc::now();
        let users = self.users.read().await;
        let memes = self.memes.read().await;
        let engagements = self.engagements.read().await;
        let trends = self.trends.read().await;
        let items = self.items.read().await;

        let listed_items = items
            .values()
            .filter(|s| s.live(now) && s.record.listed)
            .count() as u64;

        Ok(StoreStats {
            total_users: users.values().filter(|s| s.live(now)).count() as u64,
            total_memes: memes.values().filter(|s| s.live(now)).count() as u64,
            total_engagements: engagements.values().filter(|s| s.live(now)).count() as u64,
            total_trends: trends.values().filter(|s| s.live(now)).count() as u64,
            total_items: items.values().filter(|s| s.live(now)).count() as u64,
            listed_items,
        })
    }

    async fn cleanup_expired(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let mut count = 0u64;

        {
            let mut users = self.users.write().await;
            let before = users.len();
            users.retain(|_, s| s.live(now));
            count += (before - users.len()) as u64;
        }
        {
            let mut memes = self.memes.write().await;
            let before = memes.len();
            memes.retain(|_, s| s.live(now));
            count += (before - memes.len()) as u64;
        }
        {
            let mut engagements = self.engagements.write().await;
            let before = engagements.len();
            engagements.retain(|_, s| s.live(now));
            count += (before - engagements.len()) as u64;
        }
        {
            let mut trends = self.trends.write().await;
            let before = trends.len();
            trends.retain(|_, s| s.live(now));
            count += (before - trends.len()) as u64;
        }
        {
            let mut items = self.items.write().await;
            let before = items.len();
            items.retain(|_, s| s.live(now));
            count += (before - items.len()) as u64;
        }

        // Drop index entries whose records were reclaimed
        {
            let engagements = self.engagements.read().await;
            let mut index = self.engagement_index.write().await;
            index.retain(|_, id| engagements.contains_key(id));
        }
        {
            let memes = self.memes.read().await;
            let mut trending = self.trending_index.write().await;
            trending.retain(|id, _| memes.contains_key(id));
        }

        Ok(count)
    }
}
