//! Bridge configuration
//!
//! Connection settings for the chain mirror, the social graph and the
//! caption generator. Every bridge is optional: unset credentials mean the
//! bridge degrades to its stub behavior instead of failing requests.
//! Supports loading from environment variables with MEMECOIN_ prefix.

use serde::{Deserialize, Serialize};
use std::env;

/// MemeCoin contract RPC configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// JSON-RPC endpoint URL; unset leaves the mirror disabled
    pub rpc_url: Option<String>,
    /// MemeCoin contract address (0x-prefixed hex)
    pub contract_address: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_chain_timeout")]
    pub timeout_secs: u64,
}

fn default_chain_timeout() -> u64 {
    10
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: None,
            contract_address: None,
            timeout_secs: 10,
        }
    }
}

impl ChainConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - MEMECOIN_CHAIN_RPC_URL: JSON-RPC endpoint URL
    /// - MEMECOIN_CHAIN_CONTRACT: MemeCoin contract address
    /// - MEMECOIN_CHAIN_TIMEOUT_SECS: Request timeout in seconds
    pub fn from_env() -> Self {
        Self {
            rpc_url: env::var("MEMECOIN_CHAIN_RPC_URL").ok(),
            contract_address: env::var("MEMECOIN_CHAIN_CONTRACT").ok(),
            timeout_secs: env::var("MEMECOIN_CHAIN_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        }
    }

    /// Whether the mirror has everything it needs to submit transactions.
    pub fn configured(&self) -> bool {
        self.rpc_url.is_some() && self.contract_address.is_some()
    }
}

/// Social graph API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialConfig {
    /// Social graph API base URL
    pub api_url: String,
    /// API key; unset switches the bridge to seeded stub data
    pub api_key: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_social_timeout")]
    pub timeout_secs: u64,
}

fn default_social_timeout() -> u64 {
    10
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.neynar.com/v2".to_string(),
            api_key: None,
            timeout_secs: 10,
        }
    }
}

impl SocialConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - MEMECOIN_SOCIAL_API_URL: Social graph API base URL
    /// - MEMECOIN_SOCIAL_API_KEY: API key
    /// - MEMECOIN_SOCIAL_TIMEOUT_SECS: Request timeout in seconds
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_url: env::var("MEMECOIN_SOCIAL_API_URL").unwrap_or(defaults.api_url),
            api_key: env::var("MEMECOIN_SOCIAL_API_KEY").ok(),
            timeout_secs: env::var("MEMECOIN_SOCIAL_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        }
    }

    /// Whether live social graph data is available.
    pub fn configured(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Caption generator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionConfig {
    /// Completion API base URL
    pub api_url: String,
    /// API key; unset switches the bridge to deterministic templates
    pub api_key: Option<String>,
    /// Model name
    pub model: String,
    /// Request timeout in seconds
    #[serde(default = "default_caption_timeout")]
    pub timeout_secs: u64,
}

fn default_caption_timeout() -> u64 {
    30
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 30,
        }
    }
}

impl CaptionConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - MEMECOIN_CAPTION_API_URL: Completion API base URL
    /// - MEMECOIN_CAPTION_API_KEY: API key
    /// - MEMECOIN_CAPTION_MODEL: Model name
    /// - MEMECOIN_CAPTION_TIMEOUT_SECS: Request timeout in seconds
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_url: env::var("MEMECOIN_CAPTION_API_URL").unwrap_or(defaults.api_url),
            api_key: env::var("MEMECOIN_CAPTION_API_KEY").ok(),
            model: env::var("MEMECOIN_CAPTION_MODEL").unwrap_or(defaults.model),
            timeout_secs: env::var("MEMECOIN_CAPTION_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        }
    }

    /// Whether live caption generation is available.
    pub fn configured(&self) -> bool {
        self.api_key.is_some()
    }
}

/// All bridge configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeConfig {
    pub chain: ChainConfig,
    pub social: SocialConfig,
    pub caption: CaptionConfig,
}

impl BridgeConfig {
    /// Load all bridge configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            chain: ChainConfig::from_env(),
            social: SocialConfig::from_env(),
            caption: CaptionConfig::from_env(),
        }
    }
}
