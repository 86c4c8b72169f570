//! Sled store implementation
//!
//! Persistent implementation on the sled embedded database. One tree per
//! record family plus two index trees. Records are stored as JSON-encoded
//! retention envelopes; versioned saves and counter updates go through
//! sled's compare-and-swap so concurrent writers cannot lose updates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;

use memecoin_core::{
    Engagement, EngagementId, EngagementType, ItemId, MarketplaceItem, Meme, MemeId, Trend,
    TrendId, User, UserId,
};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::stored::Stored;
use crate::traits::{LedgerStore, MemeQuery, StoreStats};

/// Tree name constants
const USERS_TREE: &str = "users";
const MEMES_TREE: &str = "memes";
const ENGAGEMENTS_TREE: &str = "engagements";
const TRENDS_TREE: &str = "trends";
const ITEMS_TREE: &str = "items";
const ENGAGEMENT_INDEX_TREE: &str = "engagement_index";
const TRENDING_INDEX_TREE: &str = "trending_index";

/// Bounded retries for contended counter updates.
const COUNTER_CAS_ATTEMPTS: usize = 5;

/// Sled persistent store
#[derive(Debug, Clone)]
pub struct SledStore {
    config: StoreConfig,
    db: sled::Db,
    users: sled::Tree,
    memes: sled::Tree,
    engagements: sled::Tree,
    trends: sled::Tree,
    items: sled::Tree,
    engagement_index: sled::Tree,
    trending_index: sled::Tree,
}

impl SledStore {
    /// Open the database at the configured path.
    pub fn new(config: &StoreConfig) -> StoreResult<Self> {
        let path = config.sled_path.clone();
        Self::open(path, config.clone())
    }

    /// Open or create a sled database at `path`.
    pub fn open<P: AsRef<Path>>(path: P, config: StoreConfig) -> StoreResult<Self> {
        let db = sled::open(path)
            .map_err(|e| StoreError::Backend(format!("Failed to open sled db: {}", e)))?;

        let users = db
            .open_tree(USERS_TREE)
            .map_err(|e| StoreError::Backend(format!("Failed to open users tree: {}", e)))?;
        let memes = db
            .open_tree(MEMES_TREE)
            .map_err(|e| StoreError::Backend(format!("Failed to open memes tree: {}", e)))?;
        let engagements = db
            .open_tree(ENGAGEMENTS_TREE)
            .map_err(|e| StoreError::Backend(format!("Failed to open engagements tree: {}", e)))?;
        let trends = db
            .open_tree(TRENDS_TREE)
            .map_err(|e| StoreError::Backend(format!("Failed to open trends tree: {}", e)))?;
        let items = db
            .open_tree(ITEMS_TREE)
            .map_err(|e| StoreError::Backend(format!("Failed to open items tree: {}", e)))?;
        let engagement_index = db.open_tree(ENGAGEMENT_INDEX_TREE).map_err(|e| {
            StoreError::Backend(format!("Failed to open engagement_index tree: {}", e))
        })?;
        let trending_index = db.open_tree(TRENDING_INDEX_TREE).map_err(|e| {
            StoreError::Backend(format!("Failed to open trending_index tree: {}", e))
        })?;

        Ok(Self {
            config,
            db,
            users,
            memes,
            engagements,
            trends,
            items,
            engagement_index,
            trending_index,
        })
    }

    /// Drop all records and indexes.
    pub fn clear(&self) -> StoreResult<()> {
        self.users
            .clear()
            .map_err(|e| StoreError::Backend(format!("Failed to clear users: {}", e)))?;
        self.memes
            .clear()
            .map_err(|e| StoreError::Backend(format!("Failed to clear memes: {}", e)))?;
        self.engagements
            .clear()
            .map_err(|e| StoreError::Backend(format!("Failed to clear engagements: {}", e)))?;
        self.trends
            .clear()
            .map_err(|e| StoreError::Backend(format!("Failed to clear trends: {}", e)))?;
        self.items
            .clear()
            .map_err(|e| StoreError::Backend(format!("Failed to clear items: {}", e)))?;
        self.engagement_index
            .clear()
            .map_err(|e| StoreError::Backend(format!("Failed to clear engagement_index: {}", e)))?;
        self.trending_index
            .clear()
            .map_err(|e| StoreError::Backend(format!("Failed to clear trending_index: {}", e)))?;
        Ok(())
    }

    /// Flush to disk.
    pub fn flush(&self) -> StoreResult<()> {
        self.db
            .flush()
            .map_err(|e| StoreError::Backend(format!("Failed to flush db: {}", e)))?;
        Ok(())
    }

    // ==================== Helpers ====================

    fn serialize<T: Serialize>(value: &T) -> StoreResult<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> StoreResult<T> {
        serde_json::from_slice(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn engagement_index_key(user_id: &UserId, meme_id: &MemeId, kind: EngagementType) -> String {
        format!("{}|{}|{}", user_id, meme_id, kind)
    }
}

#[async_trait]
impl LedgerStore for SledStore {
    // ==================== User operations ====================

    async fn save_user(&self, user: &User) -> StoreResult<()> {
        let key = user.user_id.as_str().as_bytes();
        let value = Self::serialize(&Stored::new(user.clone(), self.config.user_ttl()))?;

        self.users
            .insert(key, value)
            .map_err(|e| StoreError::Backend(format!("Failed to save user: {}", e)))?;
        Ok(())
    }

    async fn save_user_versioned(&self, user: &User, expected_version: u64) -> StoreResult<User> {
        let key = user.user_id.as_str().as_bytes();
        let now = Utc::now();

        let current_bytes = self
            .users
            .get(key)
            .map_err(|e| StoreError::Backend(format!("Failed to get user: {}", e)))?
            .ok_or_else(|| StoreError::missing("user", user.user_id.as_str()))?;
        let current: Stored<User> = Self::deserialize(&current_bytes)?;
        if !current.live(now) {
            return Err(StoreError::missing("user", user.user_id.as_str()));
        }
        if current.record.version != expected_version {
            return Err(StoreError::VersionConflict {
                entity: "user",
                id: user.user_id.to_string(),
                expected: expected_version,
                found: current.record.version,
            });
        }

        let mut stamped = user.clone();
        stamped.version = expected_version + 1;
        let new_bytes = Self::serialize(&Stored::new(stamped.clone(), self.config.user_ttl()))?;

        match self
            .users
            .compare_and_swap(key, Some(&current_bytes), Some(new_bytes))
            .map_err(|e| StoreError::Backend(format!("Failed to save user: {}", e)))?
        {
            Ok(()) => Ok(stamped),
            Err(cas) => {
                let found = cas
                    .current
                    .as_ref()
                    .and_then(|bytes| Self::deserialize::<Stored<User>>(bytes).ok())
                    .map_or(0, |s| s.record.version);
                Err(StoreError::VersionConflict {
                    entity: "user",
                    id: user.user_id.to_string(),
                    expected: expected_version,
                    found,
                })
            }
        }
    }

    async fn get_user(&self, user_id: &UserId) -> StoreResult<Option<User>> {
        let now = Utc::now();
        match self
            .users
            .get(user_id.as_str().as_bytes())
            .map_err(|e| StoreError::Backend(format!("Failed to get user: {}", e)))?
        {
            Some(bytes) => {
                let stored: Stored<User> = Self::deserialize(&bytes)?;
                Ok(stored.live(now).then_some(stored.record))
            }
            None => Ok(None),
        }
    }

    async fn list_users_by_balance(&self, limit: usize) -> StoreResult<Vec<User>> {
        let now = Utc::now();
        let mut all = Vec::new();

        for item in self.users.iter() {
            let (_, value) =
                item.map_err(|e| StoreError::Backend(format!("Failed to iterate users: {}", e)))?;
            let stored: Stored<User> = Self::deserialize(&value)?;
            if stored.live(now) {
                all.push(stored.record);
            }
        }

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
        let key = meme.meme_id.as_str().as_bytes();
        let value = Self::serialize(&Stored::new(meme.clone(), self.config.content_ttl()))?;

        self.memes
            .insert(key, value)
            .map_err(|e| StoreError::Backend(format!("Failed to save meme: {}", e)))?;
        Ok(())
    }

    async fn get_meme(&self, meme_id: &MemeId) -> StoreResult<Option<Meme>> {
        let now = Utc::now();
        match self
            .memes
            .get(meme_id.as_str().as_bytes())
            .map_err(|e| StoreError::Backend(format!("Failed to get meme: {}", e)))?
        {
            Some(bytes) => {
                let stored: Stored<Meme> = Self::deserialize(&bytes)?;
                Ok(stored.live(now).then_some(stored.record))
            }
            None => Ok(None),
        }
    }

    async fn list_memes(&self, query: &MemeQuery) -> StoreResult<Vec<Meme>> {
        let now = Utc::now();
        let mut matched = Vec::new();

        for item in self.memes.iter() {
            let (_, value) =
                item.map_err(|e| StoreError::Backend(format!("Failed to iterate memes: {}", e)))?;
            let stored: Stored<Meme> = Self::deserialize(&value)?;
            if stored.live(now) && query.matches(&stored.record) {
                matched.push(stored.record);
            }
        }

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
        let key = meme_id.as_str().as_bytes();

        for _ in 0..COUNTER_CAS_ATTEMPTS {
            let now = Utc::now();
            let current_bytes = self
                .memes
                .get(key)
                .map_err(|e| StoreError::Backend(format!("Failed to get meme: {}", e)))?
                .ok_or_else(|| StoreError::missing("meme", meme_id.as_str()))?;
            let current: Stored<Meme> = Self::deserialize(&current_bytes)?;
            if !current.live(now) {
                return Err(StoreError::missing("meme", meme_id.as_str()));
            }

            let mut meme = current.record.clone();
            meme.apply_engagement(kind);
            let new_bytes = Self::serialize(&Stored::new(meme.clone(), self.config.content_ttl()))?;

            match self
                .memes
                .compare_and_swap(key, Some(&current_bytes), Some(new_bytes))
                .map_err(|e| StoreError::Backend(format!("Failed to update meme: {}", e)))?
            {
                Ok(()) => return Ok(meme),
                Err(_) => continue,
            }
        }

        Err(StoreError::Backend(format!(
            "Contended counter update on meme {}",
            meme_id
        )))
    }

    async fn claim_virality(
        &self,
        meme_id: &MemeId,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Meme>> {
        let key = meme_id.as_str().as_bytes();

        for _ in 0..COUNTER_CAS_ATTEMPTS {
            let now = Utc::now();
            let current_bytes = self
                .memes
                .get(key)
                .map_err(|e| StoreError::Backend(format!("Failed to get meme: {}", e)))?
                .ok_or_else(|| StoreError::missing("meme", meme_id.as_str()))?;
            let current: Stored<Meme> = Self::deserialize(&current_bytes)?;
            if !current.live(now) {
                return Err(StoreError::missing("meme", meme_id.as_str()));
            }

            if current.record.virality_settled() {
                return Ok(None);
            }

            let mut meme = current.record.clone();
            meme.mark_virality_settled(at);
            let new_bytes = Self::serialize(&Stored::new(meme.clone(), self.config.content_ttl()))?;

            match self
                .memes
                .compare_and_swap(key, Some(&current_bytes), Some(new_bytes))
                .map_err(|e| StoreError::Backend(format!("Failed to update meme: {}", e)))?
            {
                Ok(()) => return Ok(Some(meme)),
                Err(_) => continue,
            }
        }

        Err(StoreError::Backend(format!(
            "Contended settlement claim on meme {}",
            meme_id
        )))
    }

    // ==================== Trending index operations ====================

    async fn update_trending_index(
        &self,
        meme_id: &MemeId,
        engagement_sum: u64,
    ) -> StoreResult<()> {
        self.trending_index
            .insert(
                meme_id.as_str().as_bytes(),
                engagement_sum.to_be_bytes().to_vec(),
            )
            .map_err(|e| StoreError::Backend(format!("Failed to update trending_index: {}", e)))?;
        Ok(())
    }

    async fn top_trending(&self, limit: usize) -> StoreResult<Vec<(MemeId, u64)>> {
        let mut entries = Vec::new();

        for item in self.trending_index.iter() {
            let (key, value) = item.map_err(|e| {
                StoreError::Backend(format!("Failed to iterate trending_index: {}", e))
            })?;
            let meme_id = MemeId::new(String::from_utf8_lossy(&key).to_string());
            let sum = value
                .as_ref()
                .try_into()
                .map(u64::from_be_bytes)
                .map_err(|_| {
                    StoreError::Serialization("Invalid trending index entry".to_string())
                })?;
            entries.push((meme_id, sum));
        }

        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries.truncate(limit);
        Ok(entries)
    }

    // ==================== Engagement operations ====================

    async fn save_engagement(&self, engagement: &Engagement) -> StoreResult<()> {
        let now = Utc::now();
        let index_key = Self::engagement_index_key(
            &engagement.user_id,
            &engagement.meme_id,
            engagement.kind,
        );

        if engagement.kind.unique_per_user() {
            if let Some(existing) = self
                .engagement_index
                .get(index_key.as_bytes())
                .map_err(|e| {
                    StoreError::Backend(format!("Failed to get engagement_index: {}", e))
                })?
            {
                let still_live = match self.engagements.get(&existing).map_err(|e| {
                    StoreError::Backend(format!("Failed to get engagement: {}", e))
                })? {
                    Some(bytes) => Self::deserialize::<Stored<Engagement>>(&bytes)?.live(now),
                    None => false,
                };
                if still_live {
                    return Err(StoreError::duplicate("engagement", index_key));
                }
            }
        }

        self.engagement_index
            .insert(
                index_key.as_bytes(),
                engagement.engagement_id.as_str().as_bytes(),
            )
            .map_err(|e| {
                StoreError::Backend(format!("Failed to update engagement_index: {}", e))
            })?;

        let value = Self::serialize(&Stored::new(
            engagement.clone(),
            self.config.content_ttl(),
        ))?;
        self.engagements
            .insert(engagement.engagement_id.as_str().as_bytes(), value)
            .map_err(|e| StoreError::Backend(format!("Failed to save engagement: {}", e)))?;
        Ok(())
    }

    async fn get_engagement(
        &self,
        engagement_id: &EngagementId,
    ) -> StoreResult<Option<Engagement>> {
        let now = Utc::now();
        match self
            .engagements
            .get(engagement_id.as_str().as_bytes())
            .map_err(|e| StoreError::Backend(format!("Failed to get engagement: {}", e)))?
        {
            Some(bytes) => {
                let stored: Stored<Engagement> = Self::deserialize(&bytes)?;
                Ok(stored.live(now).then_some(stored.record))
            }
            None => Ok(None),
        }
    }

    async fn find_engagement(
        &self,
        user_id: &UserId,
        meme_id: &MemeId,
        kind: EngagementType,
    ) -> StoreResult<Option<Engagement>> {
        let index_key = Self::engagement_index_key(user_id, meme_id, kind);

        match self
            .engagement_index
            .get(index_key.as_bytes())
            .map_err(|e| StoreError::Backend(format!("Failed to get engagement_index: {}", e)))?
        {
            Some(id_bytes) => {
                let id = EngagementId::new(String::from_utf8_lossy(&id_bytes).to_string());
                self.get_engagement(&id).await
            }
            None => Ok(None),
        }
    }

    async fn list_engagements_for_meme(&self, meme_id: &MemeId) -> StoreResult<Vec<Engagement>> {
        let now = Utc::now();
        let mut matched = Vec::new();

        for item in self.engagements.iter() {
            let (_, value) = item.map_err(|e| {
                StoreError::Backend(format!("Failed to iterate engagements: {}", e))
            })?;
            let stored: Stored<Engagement> = Self::deserialize(&value)?;
            if stored.live(now) && &stored.record.meme_id == meme_id {
                matched.push(stored.record);
            }
        }

        matched.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| a.engagement_id.as_str().cmp(b.engagement_id.as_str()))
        });
        Ok(matched)
    }

    // ==================== Trend operations ====================

    async fn save_trend(&self, trend: &Trend) -> StoreResult<()> {
        let key = trend.trend_id.as_str().as_bytes();
        let value = Self::serialize(&Stored::new(trend.clone(), self.config.trend_ttl()))?;

        self.trends
            .insert(key, value)
            .map_err(|e| StoreError::Backend(format!("Failed to save trend: {}", e)))?;
        Ok(())
    }

    async fn get_trend(&self, trend_id: &TrendId) -> StoreResult<Option<Trend>> {
        let now = Utc::now();
        match self
            .trends
            .get(trend_id.as_str().as_bytes())
            .map_err(|e| StoreError::Backend(format!("Failed to get trend: {}", e)))?
        {
            Some(bytes) => {
                let stored: Stored<Trend> = Self::deserialize(&bytes)?;
                Ok(stored.live(now).then_some(stored.record))
            }
            None => Ok(None),
        }
    }

    async fn list_trends(&self, limit: usize) -> StoreResult<Vec<Trend>> {
        let now = Utc::now();
        let mut all = Vec::new();

        for item in self.trends.iter() {
            let (_, value) =
                item.map_err(|e| StoreError::Backend(format!("Failed to iterate trends: {}", e)))?;
            let stored: Stored<Trend> = Self::deserialize(&value)?;
            if stored.live(now) {
                all.push(stored.record);
            }
        }

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
        let key = item.item_id.as_str().as_bytes();
        let value = Self::serialize(&Stored::new(item.clone(), self.config.content_ttl()))?;

        self.items
            .insert(key, value)
            .map_err(|e| StoreError::Backend(format!("Failed to save item: {}", e)))?;
        Ok(())
    }

    async fn save_item_versioned(
        &self,
        item: &MarketplaceItem,
        expected_version: u64,
    ) -> StoreResult<MarketplaceItem> {
        let key = item.item_id.as_str().as_bytes();
        let now = Utc::now();

        let current_bytes = self
            .items
            .get(key)
            .map_err(|e| StoreError::Backend(format!("Failed to get item: {}", e)))?
            .ok_or_else(|| StoreError::missing("item", item.item_id.as_str()))?;
        let current: Stored<MarketplaceItem> = Self::deserialize(&current_bytes)?;
        if !current.live(now) {
            return Err(StoreError::missing("item", item.item_id.as_str()));
        }
        if current.record.version != expected_version {
            return Err(StoreError::VersionConflict {
                entity: "item",
                id: item.item_id.to_string(),
                expected: expected_version,
                found: current.record.version,
            });
        }

        let mut stamped = item.clone();
        stamped.version = expected_version + 1;
        let new_bytes = Self::serialize(&Stored::new(stamped.clone(), self.config.content_ttl()))?;

        match self
            .items
            .compare_and_swap(key, Some(&current_bytes), Some(new_bytes))
            .map_err(|e| StoreError::Backend(format!("Failed to save item: {}", e)))?
        {
            Ok(()) => Ok(stamped),
            Err(cas) => {
                let found = cas
                    .current
                    .as_ref()
                    .and_then(|bytes| Self::deserialize::<Stored<MarketplaceItem>>(bytes).ok())
                    .map_or(0, |s| s.record.version);
                Err(StoreError::VersionConflict {
                    entity: "item",
                    id: item.item_id.to_string(),
                    expected: expected_version,
                    found,
                })
            }
        }
    }

    async fn get_item(&self, item_id: &ItemId) -> StoreResult<Option<MarketplaceItem>> {
        let now = Utc::now();
        match self
            .items
            .get(item_id.as_str().as_bytes())
            .map_err(|e| StoreError::Backend(format!("Failed to get item: {}", e)))?
        {
            Some(bytes) => {
                let stored: Stored<MarketplaceItem> = Self::deserialize(&bytes)?;
                Ok(stored.live(now).then_some(stored.record))
            }
            None => Ok(None),
        }
    }

    async fn delete_item(&self, item_id: &ItemId) -> StoreResult<()> {
        self.items
            .remove(item_id.as_str().as_bytes())
            .map_err(|e| StoreError::Backend(format!("Failed to delete item: {}", e)))?;
        Ok(())
    }

    async fn list_listed_items(&self) -> StoreResult<Vec<MarketplaceItem>> {
        let now = Utc::now();
        let mut listed = Vec::new();

        for item in self.items.iter() {
            let (_, value) =
                item.map_err(|e| StoreError::Backend(format!("Failed to iterate items: {}", e)))?;
            let stored: Stored<MarketplaceItem> = Self::deserialize(&value)?;
            if stored.live(now) && stored.record.listed {
                listed.push(stored.record);
            }
        }

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
        let mut stats = StoreStats::default();

        for item in self.users.iter() {
            let (_, value) =
                item.map_err(|e| StoreError::Backend(format!("Failed to iterate users: {}", e)))?;
            let stored: Stored<User> = Self::deserialize(&value)?;
            if stored.live(now) {
                stats.total_users += 1;
            }
        }
        for item in self.memes.iter() {
            let (_, value) =
                item.map_err(|e| StoreError::Backend(format!("Failed to iterate memes: {}", e)))?;
            let stored: Stored<Meme> = Self::deserialize(&value)?;
            if stored.live(now) {
                stats.total_memes += 1;
            }
        }
        for item in self.engagements.iter() {
            let (_, value) = item.map_err(|e| {
                StoreError::Backend(format!("Failed to iterate engagements: {}", e))
            })?;
            let stored: Stored<Engagement> = Self::deserialize(&value)?;
            if stored.live(now) {
                stats.total_engagements += 1;
            }
        }
        for item in self.trends.iter() {
            let (_, value) =
                item.map_err(|e| StoreError::Backend(format!("Failed to iterate trends: {}", e)))?;
            let stored: Stored<Trend> = Self::deserialize(&value)?;
            if stored.live(now) {
                stats.total_trends += 1;
            }
        }
        for item in self.items.iter() {
            let (_, value) =
                item.map_err(|e| StoreError::Backend(format!("Failed to iterate items: {}", e)))?;
            let stored: Stored<MarketplaceItem> = Self::deserialize(&value)?;
            if stored.live(now) {
                stats.total_items += 1;
                if stored.record.listed {
                    stats.listed_items += 1;
                }
            }
        }

        Ok(stats)
    }

    async fn cleanup_expired(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let mut count = 0u64;

        let mut expired_users = Vec::new();
        for item in self.users.iter() {
            let (key, value) =
                item.map_err(|e| StoreError::Backend(format!("Failed to iterate users: {}", e)))?;
            let stored: Stored<User> = Self::deserialize(&value)?;
            if !stored.live(now) {
                expired_users.push(key.to_vec());
            }
        }
        for key in expired_users {
            self.users
                .remove(&key)
                .map_err(|e| StoreError::Backend(format!("Failed to remove expired user: {}", e)))?;
            count += 1;
        }

        let mut expired_memes = Vec::new();
        for item in self.memes.iter() {
            let (key, value) =
                item.map_err(|e| StoreError::Backend(format!("Failed to iterate memes: {}", e)))?;
            let stored: Stored<Meme> = Self::deserialize(&value)?;
            if !stored.live(now) {
                expired_memes.push(key.to_vec());
            }
        }
        for key in expired_memes {
            self.memes
                .remove(&key)
                .map_err(|e| StoreError::Backend(format!("Failed to remove expired meme: {}", e)))?;
            count += 1;
        }

        let mut expired_engagements = Vec::new();
        for item in self.engagements.iter() {
            let (key, value) = item.map_err(|e| {
                StoreError::Backend(format!("Failed to iterate engagements: {}", e))
            })?;
            let stored: Stored<Engagement> = Self::deserialize(&value)?;
            if !stored.live(now) {
                expired_engagements.push(key.to_vec());
            }
        }
        for key in expired_engagements {
            self.engagements.remove(&key).map_err(|e| {
                StoreError::Backend(format!("Failed to remove expired engagement: {}", e))
            })?;
            count += 1;
        }

        let mut expired_trends = Vec::new();
        for item in self.trends.iter() {
            let (key, value) =
                item.map_err(|e| StoreError::Backend(format!("Failed to iterate trends: {}", e)))?;
            let stored: Stored<Trend> = Self::deserialize(&value)?;
            if !stored.live(now) {
                expired_trends.push(key.to_vec());
            }
        }
        for key in expired_trends {
            self.trends.remove(&key).map_err(|e| {
                StoreError::Backend(format!("Failed to remove expired trend: {}", e))
            })?;
            count += 1;
        }

        let mut expired_items = Vec::new();
        for item in self.items.iter() {
            let (key, value) =
                item.map_err(|e| StoreError::Backend(format!("Failed to iterate items: {}", e)))?;
            let stored: Stored<MarketplaceItem> = Self::deserialize(&value)?;
            if !stored.live(now) {
                expired_items.push(key.to_vec());
            }
        }
        for key in expired_items {
            self.items.remove(&key).map_err(|e| {
                StoreError::Backend(format!("Failed to remove expired item: {}", e))
            })?;
            count += 1;
        }

        // Drop index entries whose records were reclaimed
        let mut stale_triples = Vec::new();
        for item in self.engagement_index.iter() {
            let (key, id_bytes) = item.map_err(|e| {
                StoreError::Backend(format!("Failed to iterate engagement_index: {}", e))
            })?;
            let present = self.engagements.contains_key(&id_bytes).map_err(|e| {
                StoreError::Backend(format!("Failed to check engagement: {}", e))
            })?;
            if !present {
                stale_triples.push(key.to_vec());
            }
        }
        for key in stale_triples {
            self.engagement_index.remove(&key).map_err(|e| {
                StoreError::Backend(format!("Failed to remove engagement_index entry: {}", e))
            })?;
        }

        let mut stale_trending = Vec::new();
        for item in self.trending_index.iter() {
            let (key, _) = item.map_err(|e| {
                StoreError::Backend(format!("Failed to iterate trending_index: {}", e))
            })?;
            let present = self
                .memes
                .contains_key(&key)
                .map_err(|e| StoreError::Backend(format!("Failed to check meme: {}", e)))?;
            if !present {
                stale_trending.push(key.to_vec());
            }
        }
        for key in stale_trending {
            self.trending_index.remove(&key).map_err(|e| {
                StoreError::Backend(format!("Failed to remove trending_index entry: {}", e))
            })?;
        }

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use tempfile::tempdir;

    fn create_test_user(id: &str) -> User {
        User::new(UserId::new(id)).with_username(id)
    }

    fn create_test_meme(creator: &str) -> Meme {
        Meme::new(
            UserId::new(creator),
            "https://img.example/m.png",
            "gm",
            "crypto",
        )
    }

    #[tokio::test]
    async fn test_sled_user_crud() {
        let dir = tempdir().unwrap();
        let store = SledStore::open(dir.path(), StoreConfig::test()).unwrap();

        let user = create_test_user("user_1");
        store.save_user(&user).await.unwrap();

        let retrieved = store.get_user(&user.user_id).await.unwrap();
        assert!(retrieved.is_some());
        assert_eq!(retrieved.unwrap().user_id, user.user_id);

        let absent = store.get_user(&UserId::new("nobody")).await.unwrap();
        assert!(absent.is_none());
    }

    #[tokio::test]
    async fn test_sled_versioned_save() {
        let dir = tempdir().unwrap();
        let store = SledStore::open(dir.path(), StoreConfig::test()).unwrap();

        let mut user = create_test_user("user_1");
        store.save_user(&user).await.unwrap();

        user.credit(Decimal::from(10u32));
        let stamped = store.save_user_versioned(&user, 0).await.unwrap();
        assert_eq!(stamped.version, 1);

        let err = store.save_user_versioned(&user, 0).await.unwrap_err();
        assert!(matches!(err, StoreError::VersionConflict { found: 1, .. }));
    }

    #[tokio::test]
    async fn test_sled_duplicate_upvote() {
        let dir = tempdir().unwrap();
        let store = SledStore::open(dir.path(), StoreConfig::test()).unwrap();

        let meme = create_test_meme("creator_1");
        let first = Engagement::new(
            UserId::new("user_1"),
            meme.meme_id.clone(),
            EngagementType::Upvote,
            None,
        );
        store.save_engagement(&first).await.unwrap();

        let second = Engagement::new(
            UserId::new("user_1"),
            meme.meme_id.clone(),
            EngagementType::Upvote,
            None,
        );
        let err = store.save_engagement(&second).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));

        let found = store
            .find_engagement(&first.user_id, &meme.meme_id, EngagementType::Upvote)
            .await
            .unwrap();
        assert_eq!(found.unwrap().engagement_id, first.engagement_id);
    }

    #[tokio::test]
    async fn test_sled_apply_engagement() {
        let dir = tempdir().unwrap();
        let store = SledStore::open(dir.path(), StoreConfig::test()).unwrap();

        let meme = create_test_meme("creator_1");
        store.save_meme(&meme).await.unwrap();

        store
            .apply_engagement(&meme.meme_id, EngagementType::Upvote)
            .await
            .unwrap();
        let updated = store
            .apply_engagement(&meme.meme_id, EngagementType::Share)
            .await
            .unwrap();
        assert_eq!(updated.upvotes, 1);
        assert_eq!(updated.shares, 1);
        assert_eq!(updated.engagement_sum(), 2);
    }

    #[tokio::test]
    async fn test_sled_trending_index_order() {
        let dir = tempdir().unwrap();
        let store = SledStore::open(dir.path(), StoreConfig::test()).unwrap();

        store
            .update_trending_index(&MemeId::new("meme_a"), 5)
            .await
            .unwrap();
        store
            .update_trending_index(&MemeId::new("meme_b"), 50)
            .await
            .unwrap();

        let top = store.top_trending(10).await.unwrap();
        assert_eq!(top[0], (MemeId::new("meme_b"), 50));
        assert_eq!(top[1], (MemeId::new("meme_a"), 5));
    }

    #[tokio::test]
    async fn test_sled_persistence() {
        let dir = tempdir().unwrap();

        {
            let store = SledStore::open(dir.path(), StoreConfig::test()).unwrap();
            let mut user = create_test_user("user_1");
            user.credit(Decimal::from(42u32));
            store.save_user(&user).await.unwrap();
            store.flush().unwrap();
        }

        {
            let store = SledStore::open(dir.path(), StoreConfig::test()).unwrap();
            let user = store
                .get_user(&UserId::new("user_1"))
                .await
                .unwrap()
                .unwrap();
            assert_eq!(user.meme_coin_balance, Decimal::from(42u32));
        }
    }

    #[tokio::test]
    async fn test_sled_cleanup_expired() {
        let dir = tempdir().unwrap();
        let config = StoreConfig {
            content_ttl_secs: 0,
            ..StoreConfig::test()
        };
        let store = SledStore::open(dir.path(), config).unwrap();

        let user = create_test_user("user_1");
        store.save_user(&user).await.unwrap();

        let meme = create_test_meme("user_1");
        store.save_meme(&meme).await.unwrap();
        store.update_trending_index(&meme.meme_id, 3).await.unwrap();

        assert!(store.get_meme(&meme.meme_id).await.unwrap().is_none());

        let removed = store.cleanup_expired(Utc::now()).await.unwrap();
        assert_eq!(removed, 1);
        assert!(store.top_trending(10).await.unwrap().is_empty());
        assert!(store.get_user(&user.user_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_sled_clear() {
        let dir = tempdir().unwrap();
        let store = SledStore::open(dir.path(), StoreConfig::test()).unwrap();

        store.save_user(&create_test_user("user_1")).await.unwrap();
        let stats = store.get_stats().await.unwrap();
        assert_eq!(stats.total_users, 1);

        store.clear().unwrap();
        let stats = store.get_stats().await.unwrap();
        assert_eq!(stats.total_users, 0);
    }
}
