//! Domain Error Taxonomy
//!
//! Every failure surfaced by the settlement engines maps onto one of these
//! variants; the API layer translates them into HTTP statuses and the
//! structured `{error, code}` envelope.

use rust_decimal::Decimal;
use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum CoreError {
    /// Missing or malformed input, caller's fault
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced entity does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Duplicate engagement, or a concurrent write won the race
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Buyer balance below the required amount
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        required: Decimal,
        available: Decimal,
    },

    /// Self-directed action that the operation forbids
    #[error("Self-action rejected: {0}")]
    SelfAction(String),

    /// Upstream bridge failure that could not be absorbed
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Ledger store failure
    #[error("Store error: {0}")]
    Store(String),

    /// Unclassified internal failure
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Core result type
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not-found error for an entity
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Create a conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create a self-action error
    pub fn self_action(msg: impl Into<String>) -> Self {
        Self::SelfAction(msg.into())
    }

    /// Create a store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Stable machine-readable code for the API error envelope
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::SelfAction(_) => "SELF_ACTION",
            Self::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            Self::Store(_) => "STORE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
