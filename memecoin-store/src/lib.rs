//! MemeCoin Store - Ledger Persistence Layer
//!
//! Persistence for the MemeCoin social rewards platform behind the
//! [`LedgerStore`] trait:
//! - **MemoryStore**: map-backed, for development and tests
//! - **SledStore**: embedded sled database, for single-node deployments
//!
//! Both backends share the same semantics:
//! - Versioned saves compare-and-swap on the record's version stamp, so
//!   concurrent settlements surface as conflicts instead of lost updates
//! - Unique engagements are insert-if-absent at the store
//! - Records carry a retention window; expired records read as absent and
//!   `cleanup_expired` reclaims them along with stale index entries

pub mod config;
pub mod error;
pub mod memory;
pub mod sled_store;
pub mod traits;

mod stored;

pub use config::{StoreBackend, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use sled_store::SledStore;
pub use traits::{LedgerStore, MemeQuery, StoreStats};

use std::sync::Arc;

/// Open the backend named by the configuration.
pub fn open_store(config: &StoreConfig) -> StoreResult<Arc<dyn LedgerStore>> {
    match config.backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new(config.clone()))),
        StoreBackend::Sled => Ok(Arc::new(SledStore::new(config)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_memory_store() {
        let config = StoreConfig::test();
        assert!(open_store(&config).is_ok());
    }
}
