//! AI Caption Client
//!
//! Chat-completion client for meme caption generation, virality analysis,
//! and topic suggestions. Without an API key every call answers from
//! deterministic canned templates, so generation endpoints work offline.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::CaptionConfig;
use crate::error::{BridgeError, BridgeResult};

/// Topic suggestions served when the model is unavailable
const DEFAULT_TOPICS: [&str; 5] = ["crypto", "memes", "web3", "ai", "blockchain"];

const CRYPTO_LINES: [&str; 3] = [
    "When {topic} pumps 2% and you're already planning the yacht",
    "Me explaining {topic} to my bank account",
    "{topic}: the only chart I check more than my heart rate",
];

const TECH_LINES: [&str; 3] = [
    "{topic} works on my machine",
    "Nobody: ... {topic} devs: one more refactor",
    "When the {topic} demo works on the first try",
];

const GENERAL_LINES: [&str; 3] = [
    "{topic}? In this economy?",
    "That moment when {topic} becomes your whole personality",
    "The {topic} struggle is real",
];

/// A generated caption with its metadata
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedCaption {
    pub caption: String,
    pub hashtags: Vec<String>,
    pub virality_estimate: u8,
    pub category: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CaptionPayload {
    text: String,
    #[serde(default)]
    hashtags: Vec<String>,
    #[serde(default = "default_virality")]
    virality_score: u8,
    category: Option<String>,
}

fn default_virality() -> u8 {
    5
}

/// Caption bridge over a chat-completion API
pub struct CaptionBridge {
    /// HTTP client
    client: Client,
    /// API configuration
    config: CaptionConfig,
}

impl CaptionBridge {
    /// Create a new caption bridge
    pub fn new(config: CaptionConfig) -> BridgeResult<Self> {
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

    async fn chat(&self, messages: Vec<ChatMessage<'_>>, max_tokens: u32) -> BridgeResult<String> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| BridgeError::Connection("No API key configured".to_string()))?;
        let url = format!("{}/chat/completions", self.config.api_url);

        debug!("Caption API request: model={}", self.config.model);

        let request = ChatRequest {
            model: &self.config.model,
            messages,
            temperature: 0.8,
            max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| BridgeError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BridgeError::Request(format!("HTTP {} - {}", status, body)));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| BridgeError::Request(e.to_string()))?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| BridgeError::Request("Empty completion".to_string()))
    }

    /// Generate a caption for a topic. Canned templates when degraded.
    pub async fn generate_caption(
        &self,
        topic: &str,
        style: &str,
        humor: &str,
        length: &str,
    ) -> GeneratedCaption {
        if self.configured() {
            match self.fetch_caption(topic, style, humor, length).await {
                Ok(caption) => return caption,
                Err(e) => warn!("Caption generation failed, using canned templates: {}", e),
            }
        }
        fallback_caption(topic, humor)
    }

    async fn fetch_caption(
        &self,
        topic: &str,
        style: &str,
        humor: &str,
        length: &str,
    ) -> BridgeResult<GeneratedCaption> {
        let system = "You are a creative meme caption writer. Answer with a JSON object: \
                      text (the caption), hashtags (array), virality_score (1-10), \
                      category (crypto/tech/culture/finance/general).";
        let user = format!(
            "Topic: {}\nStyle: {}\nHumor: {}\nLength: {}\n\nWrite a caption likely to go viral.",
            topic, style, humor, length
        );

        let content = self
            .chat(
                vec![
                    ChatMessage {
                        role: "system",
                        content: system,
                    },
                    ChatMessage {
                        role: "user",
                        content: &user,
                    },
                ],
                200,
            )
            .await?;

        let payload: CaptionPayload = serde_json::from_str(&content)
            .map_err(|e| BridgeError::Request(format!("Invalid caption payload: {}", e)))?;

        let hashtags = if payload.hashtags.is_empty() {
            topic_hashtags(topic)
        } else {
            payload.hashtags
        };

        Ok(GeneratedCaption {
            caption: payload.text,
            hashtags,
            virality_estimate: payload.virality_score.clamp(1, 10),
            category: payload.category.unwrap_or_else(|| "general".to_string()),
        })
    }

    /// Estimate a 1-10 virality score for caption text.
    pub async fn analyze_virality(&self, text: &str) -> u8 {
        if self.configured() {
            match self.fetch_virality(text).await {
                Ok(score) => return score.clamp(1, 10),
                Err(e) => warn!("Virality analysis failed, using heuristic: {}", e),
            }
        }
        heuristic_virality(text)
    }

    async fn fetch_virality(&self, text: &str) -> BridgeResult<u8> {
        let system = "Rate this meme caption's virality potential from 1 to 10. \
                      Answer with only the number.";
        let content = self
            .chat(
                vec![
                    ChatMessage {
                        role: "system",
                        content: system,
                    },
                    ChatMessage {
                        role: "user",
                        content: text,
                    },
                ],
                10,
            )
            .await?;

        content
            .trim()
            .parse::<u8>()
            .map_err(|e| BridgeError::Request(format!("Invalid score {}: {}", content.trim(), e)))
    }

    /// Topic suggestions seeded from current trends. Static list when degraded.
    pub async fn suggest_topics(&self, current_trends: &[String]) -> Vec<String> {
        if self.configured() {
            match self.fetch_suggestions(current_trends).await {
                Ok(topics) if !topics.is_empty() => return topics,
                Ok(_) => warn!("Suggestion call returned no topics, serving defaults"),
                Err(e) => warn!("Topic suggestion failed, serving defaults: {}", e),
            }
        }
        DEFAULT_TOPICS.iter().map(|t| t.to_string()).collect()
    }

    async fn fetch_suggestions(&self, current_trends: &[String]) -> BridgeResult<Vec<String>> {
        let user = format!(
            "Current trending topics: {}\n\nSuggest 5 new meme-worthy topics. \
             Answer with a JSON array of strings.",
            current_trends.join(", ")
        );
        let content = self
            .chat(
                vec![ChatMessage {
                    role: "user",
                    content: &user,
                }],
                100,
            )
            .await?;

        serde_json::from_str(&content)
            .map_err(|e| BridgeError::Request(format!("Invalid suggestion payload: {}", e)))
    }
}

/// Canned caption for a topic, deterministic across calls
fn fallback_caption(topic: &str, humor: &str) -> GeneratedCaption {
    let (lines, category) = caption_lines(topic);
    let index = (topic.len() + humor.len()) % lines.len();
    let caption = lines[index].replace("{topic}", topic);

    GeneratedCaption {
        caption,
        hashtags: topic_hashtags(topic),
        virality_estimate: heuristic_virality(topic),
        category: category.to_string(),
    }
}

fn caption_lines(topic: &str) -> (&'static [&'static str], &'static str) {
    let lowered = topic.to_lowercase();
    let crypto = ["crypto", "defi", "nft", "coin", "token", "chain", "hodl", "btc", "eth"];
    let tech = ["tech", "code", "dev", "software", "web3", "ai"];

    if crypto.iter().any(|k| lowered.contains(k)) {
        (&CRYPTO_LINES, "crypto")
    } else if tech.iter().any(|k| lowered.contains(k)) {
        (&TECH_LINES, "tech")
    } else {
        (&GENERAL_LINES, "general")
    }
}

fn topic_hashtags(topic: &str) -> Vec<String> {
    let compact: String = topic
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("");
    vec![
        "#meme".to_string(),
        format!("#{}", compact),
        "#viral".to_string(),
        "#memecoin".to_string(),
    ]
}

/// Deterministic score in 5..=9 from the text bytes
fn heuristic_virality(text: &str) -> u8 {
    let sum: u64 = text.bytes().map(u64::from).sum();
    5 + (sum % 5) as u8
}
