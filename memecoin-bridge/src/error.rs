//! Bridge error types

use thiserror::Error;

/// Errors surfaced by external service bridges.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The remote endpoint could not be reached.
    #[error("connection error: {0}")]
    Connection(String),

    /// The remote endpoint rejected or garbled the request.
    #[error("request error: {0}")]
    Request(String),

    /// A JSON-RPC level error from the chain node.
    #[error("rpc error {code}: {message}")]
    Rpc { code: i32, message: String },
}

pub type BridgeResult<T> = Result<T, BridgeError>;
