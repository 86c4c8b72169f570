//! Wire Types
//!
//! Request bodies and response payloads. The public JSON surface is
//! camelCase (`userId`, `memeCoinBalance`, ...) while the domain types
//! stay snake_case, so every domain struct crossing the boundary gets a
//! DTO with a `From` conversion here.

use chrono::{DateTime, Utc};
use memecoin_core::{
    Engagement, EngagementType, MarketplaceItem, Meme, MemeTemplate, TradeReceipt, Trend, User,
};
use memecoin_bridge::{CastSample, SocialProfile};
use memecoin_engine::ViralityOutcome;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

/// `{"success": true, "data": ...}` wrapper used by the entity endpoints
#[derive(Debug, Serialize)]
pub struct DataBody<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> DataBody<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub wallet_address: Option<String>,
    pub farcaster_fid: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemeRequest {
    pub creator_id: Option<String>,
    pub image_url: Option<String>,
    pub text_prompt: Option<String>,
    pub topic: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEngagementRequest {
    pub user_id: Option<String>,
    pub meme_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub comment_text: Option<String>,
}

/// Body of `POST /api/rewards`; `type` selects the reward kind and the
/// remaining fields are read per kind.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardRequest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub user_id: Option<String>,
    pub meme_id: Option<String>,
    pub creator_id: Option<String>,
    pub engager_id: Option<String>,
    pub engagement_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRequest {
    pub meme_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItemRequest {
    pub meme_id: Option<String>,
    pub seller_id: Option<String>,
    pub price: Option<Decimal>,
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyRequest {
    pub item_id: Option<String>,
    pub buyer_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendRequest {
    pub keyword: Option<String>,
    pub category: Option<String>,
    pub frequency: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub topic: Option<String>,
    pub style: Option<String>,
    pub humor: Option<String>,
    pub length: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameActionRequest {
    pub untrusted_data: Option<FrameUntrustedData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameUntrustedData {
    pub button_index: Option<u8>,
    pub fid: Option<u64>,
}

// ---------------------------------------------------------------------------
// Response payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub user_id: String,
    pub username: Option<String>,
    pub farcaster_fid: Option<u64>,
    pub wallet_address: Option<String>,
    pub meme_coin_balance: Decimal,
    pub badges: Vec<String>,
    pub leaderboard_rank: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id.as_str().to_string(),
            username: user.username,
            farcaster_fid: user.farcaster_fid,
            wallet_address: user.wallet_address,
            meme_coin_balance: user.meme_coin_balance,
            badges: user.badges,
            leaderboard_rank: user.leaderboard_rank,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemeDto {
    pub meme_id: String,
    pub creator_id: String,
    pub image_url: String,
    pub text_prompt: String,
    pub topic: String,
    pub upvotes: u64,
    pub shares: u64,
    pub comments: u64,
    pub minted_as_nft: bool,
    pub trending: bool,
    pub creation_timestamp: DateTime<Utc>,
}

impl From<Meme> for MemeDto {
    fn from(meme: Meme) -> Self {
        Self {
            meme_id: meme.meme_id.as_str().to_string(),
            creator_id: meme.creator_id.as_str().to_string(),
            image_url: meme.image_url,
            text_prompt: meme.text_prompt,
            topic: meme.topic,
            upvotes: meme.upvotes,
            shares: meme.shares,
            comments: meme.comments,
            minted_as_nft: meme.minted_as_nft,
            trending: meme.trending,
            creation_timestamp: meme.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementDto {
    pub engagement_id: String,
    pub user_id: String,
    pub meme_id: String,
    #[serde(rename = "type")]
    pub kind: EngagementType,
    pub comment_text: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl From<Engagement> for EngagementDto {
    fn from(engagement: Engagement) -> Self {
        Self {
            engagement_id: engagement.engagement_id.as_str().to_string(),
            user_id: engagement.user_id.as_str().to_string(),
            meme_id: engagement.meme_id.as_str().to_string(),
            kind: engagement.kind,
            comment_text: engagement.content,
            timestamp: engagement.timestamp,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDto {
    pub item_id: String,
    pub meme_id: String,
    pub seller_id: String,
    pub price: Decimal,
    pub currency: String,
    pub rarity: String,
    pub listed: bool,
    pub listed_at: DateTime<Utc>,
}

impl From<MarketplaceItem> for ItemDto {
    fn from(item: MarketplaceItem) -> Self {
        Self {
            item_id: item.item_id.as_str().to_string(),
            meme_id: item.meme_id.as_str().to_string(),
            seller_id: item.seller_id.as_str().to_string(),
            price: item.price,
            currency: item.currency.as_str().to_string(),
            rarity: item.rarity.as_str().to_string(),
            listed: item.listed,
            listed_at: item.listed_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptDto {
    pub item_id: String,
    pub buyer_id: String,
    pub seller_id: String,
    pub price: Decimal,
    pub currency: String,
    pub timestamp: DateTime<Utc>,
}

impl From<TradeReceipt> for ReceiptDto {
    fn from(receipt: TradeReceipt) -> Self {
        Self {
            item_id: receipt.item_id.as_str().to_string(),
            buyer_id: receipt.buyer_id.as_str().to_string(),
            seller_id: receipt.seller_id.as_str().to_string(),
            price: receipt.price,
            currency: receipt.currency.as_str().to_string(),
            timestamp: receipt.timestamp,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendDto {
    pub trend_id: String,
    pub keyword: String,
    pub frequency: u64,
    pub category: String,
    pub last_updated: DateTime<Utc>,
}

impl From<Trend> for TrendDto {
    fn from(trend: Trend) -> Self {
        Self {
            trend_id: trend.trend_id.as_str().to_string(),
            keyword: trend.keyword,
            frequency: trend.frequency,
            category: trend.category.as_str().to_string(),
            last_updated: trend.last_updated,
        }
    }
}

/// Earnings breakdown served by `GET /api/rewards?userId=`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsDto {
    pub user_id: String,
    pub total_earned: Decimal,
    pub creation_estimate: Decimal,
    pub engagement_estimate: Decimal,
    pub bonus_estimate: Decimal,
    pub badges: Vec<String>,
}

/// Virality settlement report served by `POST /api/rewards/calculate`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationDto {
    pub meme_id: String,
    pub base_reward: Decimal,
    pub virality_multiplier: f64,
    pub trend_bonus: f64,
    pub total_reward: Decimal,
    pub amount_paid: Decimal,
    pub reason: String,
}

impl From<ViralityOutcome> for CalculationDto {
    fn from(outcome: ViralityOutcome) -> Self {
        Self {
            meme_id: outcome.meme_id.as_str().to_string(),
            base_reward: outcome.breakdown.base_reward,
            virality_multiplier: outcome.breakdown.virality_multiplier(),
            trend_bonus: outcome.breakdown.trend_bonus,
            total_reward: outcome.breakdown.total,
            amount_paid: outcome.amount_paid,
            reason: outcome.reason,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDto {
    pub id: &'static str,
    pub name: &'static str,
    pub image_url: &'static str,
    pub text_areas: Vec<TextAreaDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextAreaDto {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    pub placeholder: &'static str,
}

impl From<&MemeTemplate> for TemplateDto {
    fn from(template: &MemeTemplate) -> Self {
        Self {
            id: template.id,
            name: template.name,
            image_url: template.image_url,
            text_areas: template
                .text_areas
                .iter()
                .map(|area| TextAreaDto {
                    x: area.x,
                    y: area.y,
                    width: area.width,
                    height: area.height,
                    placeholder: area.placeholder,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDto {
    pub fid: u64,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub follower_count: u64,
    pub following_count: u64,
}

impl From<SocialProfile> for ProfileDto {
    fn from(profile: SocialProfile) -> Self {
        Self {
            fid: profile.fid,
            username: profile.username,
            display_name: profile.display_name,
            avatar_url: profile.avatar_url,
            bio: profile.bio,
            follower_count: profile.follower_count,
            following_count: profile.following_count,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CastDto {
    pub hash: String,
    pub text: String,
    pub timestamp: Option<String>,
    pub likes: u64,
    pub recasts: u64,
    pub replies: u64,
}

impl From<CastSample> for CastDto {
    fn from(cast: CastSample) -> Self {
        Self {
            hash: cast.hash,
            text: cast.text,
            timestamp: cast.timestamp,
            likes: cast.likes,
            recasts: cast.recasts,
            replies: cast.replies,
        }
    }
}
