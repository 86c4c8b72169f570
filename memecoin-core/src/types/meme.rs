//! Meme and Engagement Records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{EngagementId, EngagementType, MemeId, UserId};

/// A published meme with its engagement counters
///
/// Counters are monotonically non-decreasing and move by exactly one per
/// recorded engagement. The record expires from the store after its retention
/// window; settled rewards live on the user record and survive that expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meme {
    /// Unique meme identifier
    pub meme_id: MemeId,
    /// Owning creator
    pub creator_id: UserId,
    /// Image location, immutable after publish
    pub image_url: String,
    /// Text prompt the meme was composed from, immutable after publish
    pub text_prompt: String,
    /// Topic tag; empty string when untagged
    #[serde(default)]
    pub topic: String,
    /// Upvote counter
    pub upvotes: u64,
    /// Share counter
    pub shares: u64,
    /// Comment counter
    pub comments: u64,
    /// Whether the meme has been minted as an NFT
    #[serde(default)]
    pub minted_as_nft: bool,
    /// Derived trending flag
    #[serde(default)]
    pub trending: bool,
    /// Publish timestamp
    pub created_at: DateTime<Utc>,
    /// Engagement sum at the last virality settlement, if any
    #[serde(default)]
    pub virality_settled_engagement: Option<u64>,
    /// Timestamp of the last virality settlement, if any
    #[serde(default)]
    pub virality_settled_at: Option<DateTime<Utc>>,
}

impl Meme {
    /// Create a new meme with zeroed counters
    pub fn new(
        creator_id: UserId,
        image_url: impl Into<String>,
        text_prompt: impl Into<String>,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            meme_id: MemeId::generate(),
            creator_id,
            image_url: image_url.into(),
            text_prompt: text_prompt.into(),
            topic: topic.into(),
            upvotes: 0,
            shares: 0,
            comments: 0,
            minted_as_nft: false,
            trending: false,
            created_at: Utc::now(),
            virality_settled_engagement: None,
            virality_settled_at: None,
        }
    }

    /// Total raw engagement, the key used by the persisted trending index
    pub fn engagement_sum(&self) -> u64 {
        self.upvotes + self.shares + self.comments
    }

    /// Meme age in fractional hours at `now`
    pub fn age_hours(&self, now: DateTime<Utc>) -> f64 {
        let secs = (now - self.created_at).num_seconds().max(0) as f64;
        secs / 3600.0
    }

    /// Increment the counter matching an engagement kind by exactly one
    pub fn apply_engagement(&mut self, kind: EngagementType) {
        match kind {
            EngagementType::Upvote => self.upvotes += 1,
            EngagementType::Share => self.shares += 1,
            EngagementType::Comment => self.comments += 1,
        }
    }

    /// Whether the virality reward for the current counters is already settled
    pub fn virality_settled(&self) -> bool {
        self.virality_settled_engagement == Some(self.engagement_sum())
    }

    /// Record a virality settlement watermark at the current counters
    pub fn mark_virality_settled(&mut self, at: DateTime<Utc>) {
        self.virality_settled_engagement = Some(self.engagement_sum());
        self.virality_settled_at = Some(at);
    }
}

/// A single engagement event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Engagement {
    /// Unique engagement identifier
    pub engagement_id: EngagementId,
    /// The engaging user
    pub user_id: UserId,
    /// The target meme
    pub meme_id: MemeId,
    /// Engagement kind
    pub kind: EngagementType,
    /// Comment body, present only for comments
    #[serde(default)]
    pub content: Option<String>,
    /// Event timestamp
    pub timestamp: DateTime<Utc>,
}

impl Engagement {
    /// Create a new engagement event
    pub fn new(
        user_id: UserId,
        meme_id: MemeId,
        kind: EngagementType,
        content: Option<String>,
    ) -> Self {
        Self {
            engagement_id: EngagementId::generate(),
            user_id,
            meme_id,
            kind,
            content,
            timestamp: Utc::now(),
        }
    }
}
