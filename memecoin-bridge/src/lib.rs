//! MemeCoin Bridge - External Service Clients
//!
//! Best-effort clients for the services around the ledger:
//! - **ChainBridge**: JSON-RPC mirror onto the MemeCoin token contract
//! - **SocialBridge**: Farcaster trending keywords, profiles, and casts
//! - **CaptionBridge**: chat-completion captions and virality estimates
//!
//! None of these are load-bearing. Every client degrades when its
//! endpoint is unconfigured or unreachable: chain calls answer with a
//! rejected [`TxResult`], social and caption calls fall back to seeded
//! tables and canned templates. The store ledger stays authoritative.

pub mod caption;
pub mod chain;
pub mod config;
pub mod error;
pub mod social;

pub use caption::{CaptionBridge, GeneratedCaption};
pub use chain::{create_chain_bridge, is_valid_address, ChainBridge, TxResult};
pub use config::{BridgeConfig, CaptionConfig, ChainConfig, SocialConfig};
pub use error::{BridgeError, BridgeResult};
pub use social::{CastSample, SocialBridge, SocialProfile, TrendSample};

use std::sync::Arc;

/// All three bridges, constructed from one configuration.
#[derive(Clone)]
pub struct Bridges {
    pub chain: Arc<ChainBridge>,
    pub social: Arc<SocialBridge>,
    pub caption: Arc<CaptionBridge>,
}

impl Bridges {
    /// Build every bridge from the shared configuration.
    pub fn new(config: &BridgeConfig) -> BridgeResult<Self> {
        Ok(Self {
            chain: create_chain_bridge(config.chain.clone())?,
            social: Arc::new(SocialBridge::new(config.social.clone())?),
            caption: Arc::new(CaptionBridge::new(config.caption.clone())?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bridges_build_unconfigured() {
        let bridges = Bridges::new(&BridgeConfig::default()).unwrap();
        assert!(!bridges.chain.configured());
        assert!(!bridges.social.configured());
        assert!(!bridges.caption.configured());
    }
}
