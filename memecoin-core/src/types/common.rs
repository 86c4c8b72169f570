//! Common Types
//!
//! Newtype identifiers and shared enums.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifier Types
// ============================================================================

/// User identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    /// Create a new user ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Meme identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemeId(pub String);

impl MemeId {
    /// Create a new meme ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh meme ID
    pub fn generate() -> Self {
        Self(format!("meme_{}", Uuid::new_v4().simple()))
    }

    /// Get as string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Engagement identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EngagementId(pub String);

impl EngagementId {
    /// Create a new engagement ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh engagement ID
    pub fn generate() -> Self {
        Self(format!("eng_{}", Uuid::new_v4().simple()))
    }

    /// Get as string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EngagementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Marketplace item identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub String);

impl ItemId {
    /// Create a new item ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh item ID
    pub fn generate() -> Self {
        Self(format!("item_{}", Uuid::new_v4().simple()))
    }

    /// Get as string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trend identifier, derived from the keyword so upserts are stable
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrendId(pub String);

impl TrendId {
    /// Create a new trend ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive the canonical trend ID for a keyword
    pub fn from_keyword(keyword: &str) -> Self {
        let slug: String = keyword
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect();
        Self(format!("trend_{}", slug))
    }

    /// Get as string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Shared Enums
// ============================================================================

/// Engagement kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementType {
    Upvote,
    Comment,
    Share,
}

impl EngagementType {
    /// Whether at most one engagement of this kind may exist per (user, meme)
    pub fn unique_per_user(&self) -> bool {
        matches!(self, Self::Upvote | Self::Share)
    }

    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upvote => "upvote",
            Self::Comment => "comment",
            Self::Share => "share",
        }
    }

    /// Parse from a wire string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "upvote" => Some(Self::Upvote),
            "comment" => Some(Self::Comment),
            "share" => Some(Self::Share),
            _ => None,
        }
    }
}

impl fmt::Display for EngagementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Marketplace settlement currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Memecoin,
    Eth,
}

impl Currency {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memecoin => "MEMECOIN",
            Self::Eth => "ETH",
        }
    }

    /// Parse from a wire string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "MEMECOIN" => Some(Self::Memecoin),
            "ETH" => Some(Self::Eth),
            _ => None,
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::Memecoin
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Listing rarity tier, derived from upvotes at listing time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Legendary,
}

impl Rarity {
    /// Derive the tier from a meme's upvote count
    ///
    /// Under 100 is common, 100 to 999 is rare, 1000 and above is legendary.
    pub fn from_upvotes(upvotes: u64) -> Self {
        if upvotes >= 1000 {
            Self::Legendary
        } else if upvotes >= 100 {
            Self::Rare
        } else {
            Self::Common
        }
    }

    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Rare => "rare",
            Self::Legendary => "legendary",
        }
    }

    /// Parse from a wire string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "common" => Some(Self::Common),
            "rare" => Some(Self::Rare),
            "legendary" => Some(Self::Legendary),
            _ => None,
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Trend category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendCategory {
    Crypto,
    Tech,
    Culture,
    Finance,
    General,
}

impl TrendCategory {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Crypto => "crypto",
            Self::Tech => "tech",
            Self::Culture => "culture",
            Self::Finance => "finance",
            Self::General => "general",
        }
    }

    /// Parse from a wire string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "crypto" => Some(Self::Crypto),
            "tech" => Some(Self::Tech),
            "culture" => Some(Self::Culture),
            "finance" => Some(Self::Finance),
            "general" => Some(Self::General),
            _ => None,
        }
    }
}

impl Default for TrendCategory {
    fn default() -> Self {
        Self::General
    }
}

impl fmt::Display for TrendCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
