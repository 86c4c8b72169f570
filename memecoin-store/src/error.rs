//! Store error types

use thiserror::Error;

/// Errors surfaced by ledger store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested record does not exist (or has expired).
    #[error("{entity} not found: {id}")]
    Missing { entity: &'static str, id: String },

    /// A versioned write lost the race against a concurrent writer.
    #[error("version conflict on {entity} {id}: expected {expected}, found {found}")]
    VersionConflict {
        entity: &'static str,
        id: String,
        expected: u64,
        found: u64,
    },

    /// A uniqueness guard rejected the write.
    #[error("duplicate {entity}: {id}")]
    Duplicate { entity: &'static str, id: String },

    /// The backend itself failed.
    #[error("backend error: {0}")]
    Backend(String),

    /// A record could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    pub fn missing(entity: &'static str, id: impl Into<String>) -> Self {
        Self::Missing {
            entity,
            id: id.into(),
        }
    }

    pub fn duplicate(entity: &'static str, id: impl Into<String>) -> Self {
        Self::Duplicate {
            entity,
            id: id.into(),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<sled::Error> for StoreError {
    fn from(e: sled::Error) -> Self {
        Self::Backend(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
