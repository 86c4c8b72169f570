//! MemeCoin Contract RPC Client
//!
//! JSON-RPC bridge to the MemeCoin token contract. The store ledger stays
//! authoritative; every call here is a best-effort mirror. An unconfigured
//! bridge degrades to explicit rejected results so settlements never block
//! on the chain.

use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::ChainConfig;
use crate::error::{BridgeError, BridgeResult};

/// Chain bridge for mirroring settlements on the MemeCoin contract
pub struct ChainBridge {
    /// HTTP client
    client: Client,
    /// RPC configuration
    config: ChainConfig,
    /// Request ID counter
    request_id: std::sync::atomic::AtomicU64,
}

/// JSON-RPC request
#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: serde_json::Value,
}

/// JSON-RPC response
#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
    #[allow(dead_code)]
    id: u64,
}

/// JSON-RPC error
#[derive(Debug, Deserialize)]
struct RpcError {
    code: i32,
    message: String,
}

/// Outcome of a chain mirror attempt
///
/// Mirror calls never fail the caller; failures are carried in the result
/// so the ledger settlement that triggered them stays committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxResult {
    pub success: bool,
    pub hash: Option<String>,
    pub error: Option<String>,
}

impl TxResult {
    pub fn confirmed(hash: impl Into<String>) -> Self {
        Self {
            success: true,
            hash: Some(hash.into()),
            error: None,
        }
    }

    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            success: false,
            hash: None,
            error: Some(error.into()),
        }
    }

    pub fn unconfigured() -> Self {
        Self::rejected("Chain bridge not configured")
    }
}

/// Whether `address` is a well-formed 0x-prefixed 20-byte hex address.
pub fn is_valid_address(address: &str) -> bool {
    match address.strip_prefix("0x") {
        Some(hex) => hex.len() == 40 && hex.bytes().all(|b| b.is_ascii_hexdigit()),
        None => false,
    }
}

impl ChainBridge {
    /// Create a new chain bridge
    pub fn new(config: ChainConfig) -> BridgeResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BridgeError::Connection(e.to_string()))?;

        Ok(Self {
            client,
            config,
            request_id: std::sync::atomic::AtomicU64::new(0),
        })
    }

    /// Whether the bridge can submit transactions.
    pub fn configured(&self) -> bool {
        self.config.configured()
    }

    /// Make an RPC call
    async fn call<T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> BridgeResult<T> {
        let url = self
            .config
            .rpc_url
            .as_deref()
            .ok_or_else(|| BridgeError::Connection("No RPC URL configured".to_string()))?;

        let id = self
            .request_id
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);

        let request = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };

        debug!("Chain RPC call: {} id={}", method, id);

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| BridgeError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BridgeError::Request(format!("HTTP {} - {}", status, body)));
        }

        let rpc_response: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| BridgeError::Request(e.to_string()))?;

        if let Some(error) = rpc_response.error {
            return Err(BridgeError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        rpc_response
            .result
            .ok_or_else(|| BridgeError::Request("Empty response".to_string()))
    }

    /// Test connection to the node
    pub async fn ping(&self) -> BridgeResult<()> {
        let _: serde_json::Value = self.call("web3_clientVersion", serde_json::json!([])).await?;
        Ok(())
    }

    /// Mirror a reward settlement by minting to the user's wallet.
    pub async fn reward_user(&self, wallet_address: &str, amount: Decimal) -> TxResult {
        if !is_valid_address(wallet_address) {
            return TxResult::rejected("Invalid wallet address");
        }
        let Some(contract) = self.config.contract_address.as_deref() else {
            return TxResult::unconfigured();
        };
        if self.config.rpc_url.is_none() {
            return TxResult::unconfigured();
        }

        match self
            .call::<String>(
                "memecoin_reward",
                serde_json::json!([contract, wallet_address, amount.to_string()]),
            )
            .await
        {
            Ok(hash) => {
                info!("Mirrored reward of {} to {}: {}", amount, wallet_address, hash);
                TxResult::confirmed(hash)
            }
            Err(e) => {
                warn!("Chain reward mirror failed for {}: {}", wallet_address, e);
                TxResult::rejected(e.to_string())
            }
        }
    }

    /// Mirror a marketplace settlement by burning from the buyer's wallet.
    pub async fn burn_for_transaction(&self, wallet_address: &str, amount: Decimal) -> TxResult {
        if !is_valid_address(wallet_address) {
            return TxResult::rejected("Invalid wallet address");
        }
        let Some(contract) = self.config.contract_address.as_deref() else {
            return TxResult::unconfigured();
        };
        if self.config.rpc_url.is_none() {
            return TxResult::unconfigured();
        }

        match self
            .call::<String>(
                "memecoin_burn",
                serde_json::json!([contract, wallet_address, amount.to_string()]),
            )
            .await
        {
            Ok(hash) => {
                info!("Mirrored burn of {} from {}: {}", amount, wallet_address, hash);
                TxResult::confirmed(hash)
            }
            Err(e) => {
                warn!("Chain burn mirror failed for {}: {}", wallet_address, e);
                TxResult::rejected(e.to_string())
            }
        }
    }

    /// On-chain balance for a wallet. Zero when the bridge is not configured.
    pub async fn get_balance(&self, wallet_address: &str) -> BridgeResult<Decimal> {
        if !is_valid_address(wallet_address) {
            return Ok(Decimal::ZERO);
        }
        let Some(contract) = self.config.contract_address.as_deref() else {
            return Ok(Decimal::ZERO);
        };
        if self.config.rpc_url.is_none() {
            return Ok(Decimal::ZERO);
        }

        let raw: String = self
            .call(
                "memecoin_balanceOf",
                serde_json::json!([contract, wallet_address]),
            )
            .await?;
        raw.parse::<Decimal>()
            .map_err(|e| BridgeError::Request(format!("Invalid balance {}: {}", raw, e)))
    }

    /// Whether the contract's reward cooldown allows another mirror now.
    ///
    /// Permissive when unconfigured so the ledger settlement proceeds.
    pub async fn can_be_rewarded(&self, wallet_address: &str) -> BridgeResult<bool> {
        let Some(contract) = self.config.contract_address.as_deref() else {
            return Ok(true);
        };
        if self.config.rpc_url.is_none() {
            return Ok(true);
        }
        if !is_valid_address(wallet_address) {
            return Ok(false);
        }

        self.call(
            "memecoin_canBeRewarded",
            serde_json::json!([contract, wallet_address]),
        )
        .await
    }
}

/// Create a shared chain bridge
pub fn create_chain_bridge(config: ChainConfig) -> BridgeResult<Arc<ChainBridge>> {
    Ok(Arc::new(ChainBridge::new(config)?))
}
