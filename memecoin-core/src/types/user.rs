//! User Account Record

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::common::UserId;

/// Badge granted exactly once, for a user's first published meme
pub const FIRST_MEME_BADGE: &str = "First Meme";

/// User account holding the MemeCoin balance and earned badges
///
/// The balance is authoritative here; the on-chain mirror is best-effort.
/// `version` stamps every write so settlements can compare-and-swap instead
/// of losing updates under concurrent requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub user_id: UserId,
    /// Display name
    #[serde(default)]
    pub username: Option<String>,
    /// Linked Farcaster fid
    #[serde(default)]
    pub farcaster_fid: Option<u64>,
    /// Linked wallet address (0x-prefixed hex)
    #[serde(default)]
    pub wallet_address: Option<String>,
    /// Current MemeCoin balance, never negative after a settlement
    pub meme_coin_balance: Decimal,
    /// Earned badges, each held at most once
    pub badges: Vec<String>,
    /// Derived balance-leaderboard rank, recomputed at read time
    #[serde(default)]
    pub leaderboard_rank: Option<u32>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp
    pub updated_at: DateTime<Utc>,
    /// Version stamp for compare-and-swap writes
    #[serde(default)]
    pub version: u64,
}

impl User {
    /// Create a new user with a zero balance and no badges
    pub fn new(user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            username: None,
            farcaster_fid: None,
            wallet_address: None,
            meme_coin_balance: Decimal::ZERO,
            badges: Vec::new(),
            leaderboard_rank: None,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// Set the display name
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Link a wallet address
    pub fn with_wallet(mut self, address: impl Into<String>) -> Self {
        self.wallet_address = Some(address.into());
        self
    }

    /// Link a Farcaster fid
    pub fn with_farcaster_fid(mut self, fid: u64) -> Self {
        self.farcaster_fid = Some(fid);
        self
    }

    /// Whether the user holds the given badge
    pub fn has_badge(&self, badge: &str) -> bool {
        self.badges.iter().any(|b| b == badge)
    }

    /// Grant a badge; returns false if it was already held
    pub fn grant_badge(&mut self, badge: impl Into<String>) -> bool {
        let badge = badge.into();
        if self.has_badge(&badge) {
            return false;
        }
        self.badges.push(badge);
        self.updated_at = Utc::now();
        true
    }

    /// Credit the balance
    pub fn credit(&mut self, amount: Decimal) {
        self.meme_coin_balance += amount;
        self.updated_at = Utc::now();
    }

    /// Debit the balance; returns false and leaves it unchanged if insufficient
    pub fn debit(&mut self, amount: Decimal) -> bool {
        if self.meme_coin_balance < amount {
            return false;
        }
        self.meme_coin_balance -= amount;
        self.updated_at = Utc::now();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User::new(UserId::new("user_1"))
    }

    #[test]
    fn test_new_user_starts_empty() {
        let user = test_user();
        assert_eq!(user.meme_coin_balance, Decimal::ZERO);
        assert!(user.badges.is_empty());
        assert_eq!(user.version, 0);
    }

    #[test]
    fn test_badge_granted_at_most_once() {
        let mut user = test_user();
        assert!(user.grant_badge(FIRST_MEME_BADGE));
        assert!(!user.grant_badge(FIRST_MEME_BADGE));
        assert_eq!(
            user.badges.iter().filter(|b| *b == FIRST_MEME_BADGE).count(),
            1
        );
    }

    #[test]
    fn test_credit_and_debit() {
        let mut user = test_user();
        user.credit(Decimal::from(10u32));
        assert_eq!(user.meme_coin_balance, Decimal::from(10u32));

        assert!(user.debit(Decimal::from(4u32)));
        assert_eq!(user.meme_coin_balance, Decimal::from(6u32));
    }

    #[test]
    fn test_debit_insufficient_leaves_balance_unchanged() {
        let mut user = test_user();
        user.credit(Decimal::from(3u32));
        assert!(!user.debit(Decimal::from(5u32)));
        assert_eq!(user.meme_coin_balance, Decimal::from(3u32));
    }

    #[test]
    fn test_builder_fields() {
        let user = test_user()
            .with_username("alice")
            .with_wallet("0x1234567890123456789012345678901234567890")
            .with_farcaster_fid(99);
        assert_eq!(user.username.as_deref(), Some("alice"));
        assert_eq!(user.farcaster_fid, Some(99));
        assert!(user.wallet_address.is_some());
    }
}
