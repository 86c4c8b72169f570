//! Farcaster Social Client
//!
//! Neynar-backed client for trending keywords, user profiles, and recent
//! casts. Trending keywords always produce a usable answer: without an API
//! key, or when a fetch fails, the seeded trend table stands in. Profile
//! and cast lookups degrade to absent instead.

use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

use memecoin_core::types::TrendCategory;
use memecoin_core::trend_seeds;

use crate::config::SocialConfig;
use crate::error::{BridgeError, BridgeResult};

/// Words too common to count as trend keywords
const STOPWORDS: [&str; 14] = [
    "this", "that", "with", "have", "from", "just", "your", "what", "when", "they", "will",
    "about", "there", "been",
];

/// A trending keyword observed on the social feed
#[derive(Debug, Clone)]
pub struct TrendSample {
    pub keyword: String,
    pub frequency: u64,
    pub category: TrendCategory,
}

/// A social profile looked up by fid
#[derive(Debug, Clone)]
pub struct SocialProfile {
    pub fid: u64,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub follower_count: u64,
    pub following_count: u64,
}

/// A cast from a user's recent feed
#[derive(Debug, Clone)]
pub struct CastSample {
    pub hash: String,
    pub text: String,
    pub timestamp: Option<String>,
    pub likes: u64,
    pub recasts: u64,
    pub replies: u64,
}

#[derive(Debug, Deserialize)]
struct BulkUsersResponse {
    #[serde(default)]
    users: Vec<NeynarUser>,
}

#[derive(Debug, Deserialize)]
struct NeynarUser {
    fid: u64,
    username: String,
    display_name: Option<String>,
    pfp_url: Option<String>,
    profile: Option<NeynarProfile>,
    #[serde(default)]
    follower_count: u64,
    #[serde(default)]
    following_count: u64,
}

#[derive(Debug, Deserialize)]
struct NeynarProfile {
    bio: Option<NeynarBio>,
}

#[derive(Debug, Deserialize)]
struct NeynarBio {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FeedResponse {
    #[serde(default)]
    casts: Vec<NeynarCast>,
}

#[derive(Debug, Deserialize)]
struct NeynarCast {
    hash: String,
    #[serde(default)]
    text: String,
    timestamp: Option<String>,
    reactions: Option<NeynarReactions>,
    replies: Option<NeynarReplies>,
}

#[derive(Debug, Deserialize)]
struct NeynarReactions {
    #[serde(default)]
    likes_count: u64,
    #[serde(default)]
    recasts_count: u64,
}

#[derive(Debug, Deserialize)]
struct NeynarReplies {
    #[serde(default)]
    count: u64,
}

impl NeynarUser {
    fn into_profile(self) -> SocialProfile {
        SocialProfile {
            fid: self.fid,
            username: self.username,
            display_name: self.display_name,
            avatar_url: self.pfp_url,
            bio: self.profile.and_then(|p| p.bio).and_then(|b| b.text),
            follower_count: self.follower_count,
            following_count: self.following_count,
        }
    }
}

impl NeynarCast {
    fn into_sample(self) -> CastSample {
        let (likes, recasts) = match &self.reactions {
            Some(r) => (r.likes_count, r.recasts_count),
            None => (0, 0),
        };
        CastSample {
            hash: self.hash,
            text: self.text,
            timestamp: self.timestamp,
            likes,
            recasts,
            replies: self.replies.map(|r| r.count).unwrap_or(0),
        }
    }
}

/// Social bridge over the Neynar HTTP API
pub struct SocialBridge {
    /// HTTP client
    client: Client,
    /// API configuration
    config: SocialConfig,
}

impl SocialBridge {
    /// Create a new social bridge
    pub fn new(config: SocialConfig) -> BridgeResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BridgeError::Connection(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Whether a live API key is present.
    pub fn configured(&self) -> bool {
        self.config.configured()
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, path_and_query: &str) -> BridgeResult<T> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| BridgeError::Connection("No API key configured".to_string()))?;
        let url = format!("{}{}", self.config.api_url, path_and_query);

        debug!("Social API request: {}", path_and_query);

        let response = self
            .client
            .get(&url)
            .header("x-api-key", api_key)
            .send()
            .await
            .map_err(|e| BridgeError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BridgeError::Request(format!("HTTP {} - {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| BridgeError::Request(e.to_string()))
    }

    /// Trending keywords from the global feed, seeded table when degraded.
    pub async fn trending_keywords(&self, limit: usize) -> Vec<TrendSample> {
        if self.configured() {
            match self.fetch_trending(limit).await {
                Ok(samples) if !samples.is_empty() => return samples,
                Ok(_) => warn!("Trending feed returned no keywords, serving seeded trends"),
                Err(e) => warn!("Trending fetch failed, serving seeded trends: {}", e),
            }
        }
        seeded_trends(limit)
    }

    async fn fetch_trending(&self, limit: usize) -> BridgeResult<Vec<TrendSample>> {
        let feed: FeedResponse = self
            .get_json("/farcaster/feed/trending?limit=50")
            .await?;
        let texts: Vec<String> = feed.casts.into_iter().map(|c| c.text).collect();

        let mut samples: Vec<TrendSample> = extract_keywords(&texts)
            .into_iter()
            .map(|(keyword, frequency)| {
                let category = categorize(&keyword);
                TrendSample {
                    keyword,
                    frequency,
                    category,
                }
            })
            .collect();
        samples.truncate(limit);
        Ok(samples)
    }

    /// Profile lookup by fid. Absent when unconfigured or the lookup fails.
    pub async fn user_profile(&self, fid: u64) -> Option<SocialProfile> {
        if !self.configured() {
            return None;
        }
        let path = format!("/farcaster/user/bulk?fids={}", fid);
        match self.get_json::<BulkUsersResponse>(&path).await {
            Ok(response) => response.users.into_iter().next().map(NeynarUser::into_profile),
            Err(e) => {
                warn!("Profile lookup failed for fid {}: {}", fid, e);
                None
            }
        }
    }

    /// Recent casts for a fid. Empty when unconfigured or the fetch fails.
    pub async fn user_casts(&self, fid: u64, limit: usize) -> Vec<CastSample> {
        if !self.configured() {
            return Vec::new();
        }
        let path = format!("/farcaster/feed/user/casts?fid={}&limit={}", fid, limit);
        match self.get_json::<FeedResponse>(&path).await {
            Ok(feed) => feed
                .casts
                .into_iter()
                .take(limit)
                .map(NeynarCast::into_sample)
                .collect(),
            Err(e) => {
                warn!("Cast fetch failed for fid {}: {}", fid, e);
                Vec::new()
            }
        }
    }
}

/// Seed table as trend samples, highest frequency first
fn seeded_trends(limit: usize) -> Vec<TrendSample> {
    let mut samples: Vec<TrendSample> = trend_seeds()
        .iter()
        .map(|seed| TrendSample {
            keyword: seed.keyword.to_string(),
            frequency: seed.frequency,
            category: seed.category,
        })
        .collect();
    samples.sort_by(|a, b| b.frequency.cmp(&a.frequency).then(a.keyword.cmp(&b.keyword)));
    samples.truncate(limit);
    samples
}

/// Count keyword occurrences across cast texts, most frequent first
fn extract_keywords(texts: &[String]) -> Vec<(String, u64)> {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for text in texts {
        for raw in text.split_whitespace() {
            let word: String = raw
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase();
            if word.len() < 4 || word.starts_with("http") || STOPWORDS.contains(&word.as_str()) {
                continue;
            }
            *counts.entry(word).or_insert(0) += 1;
        }
    }

    let mut keywords: Vec<(String, u64)> = counts.into_iter().collect();
    keywords.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    keywords
}

/// Bucket a keyword into a trend category
fn categorize(keyword: &str) -> TrendCategory {
    match keyword {
        "defi" | "nft" | "nfts" | "bitcoin" | "ethereum" | "blockchain" | "base" | "memecoin"
        | "memecoins" | "token" | "tokens" | "crypto" | "onchain" | "wallet" | "airdrop"
        | "altcoin" | "altcoins" => TrendCategory::Crypto,
        "web3" | "tech" | "code" | "coding" | "software" | "developer" | "developers"
        | "startup" | "startups" | "agents" | "model" | "models" => TrendCategory::Tech,
        "stocks" | "trading" | "market" | "markets" | "inflation" | "rates" | "economy"
        | "finance" | "investing" => TrendCategory::Finance,
        "hodl" | "meme" | "memes" | "viral" | "music" | "gaming" | "culture" | "vibes"
        | "movie" | "movies" => TrendCategory::Culture,
        _ => TrendCategory::General,
    }
}
