//! Balance Mutation Helpers
//!
//! All balance changes go through `credit_user` and `debit_user`, which
//! retry versioned saves a bounded number of times. A retry re-reads the
//! record, so a settlement never overwrites a concurrent one.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::debug;

use memecoin_core::{CoreError, CoreResult, User, UserId};
use memecoin_store::{LedgerStore, StoreError};

use crate::CAS_RETRY_ATTEMPTS;

/// Map a store failure onto the domain error taxonomy.
pub(crate) fn store_error(err: StoreError) -> CoreError {
    match err {
        StoreError::Missing { entity, id } => CoreError::NotFound {
            entity: entity_label(entity),
            id,
        },
        StoreError::VersionConflict { entity, id, .. } => {
            CoreError::conflict(format!("Concurrent update on {} {}", entity, id))
        }
        StoreError::Duplicate { entity, id } => {
            CoreError::conflict(format!("Duplicate {}: {}", entity, id))
        }
        StoreError::Backend(msg) | StoreError::Serialization(msg) => CoreError::store(msg),
    }
}

fn entity_label(entity: &'static str) -> &'static str {
    match entity {
        "user" => "User",
        "meme" => "Meme",
        "engagement" => "Engagement",
        "trend" => "Trend",
        "item" => "Item",
        other => other,
    }
}

/// Credit a user's balance, retrying on version conflicts.
pub(crate) async fn credit_user(
    store: &Arc<dyn LedgerStore>,
    user_id: &UserId,
    amount: Decimal,
) -> CoreResult<User> {
    mutate_balance(store, user_id, |user| {
        user.credit(amount);
        Ok(())
    })
    .await
}

/// Debit a user's balance, retrying on version conflicts. Fails with
/// `InsufficientBalance` before writing anything when funds are short.
pub(crate) async fn debit_user(
    store: &Arc<dyn LedgerStore>,
    user_id: &UserId,
    amount: Decimal,
) -> CoreResult<User> {
    mutate_balance(store, user_id, |user| {
        let available = user.meme_coin_balance;
        if !user.debit(amount) {
            return Err(CoreError::InsufficientBalance {
                required: amount,
                available,
            });
        }
        Ok(())
    })
    .await
}

async fn mutate_balance<F>(
    store: &Arc<dyn LedgerStore>,
    user_id: &UserId,
    mutate: F,
) -> CoreResult<User>
where
    F: Fn(&mut User) -> CoreResult<()>,
{
    for attempt in 0..CAS_RETRY_ATTEMPTS {
        let user = store
            .get_user(user_id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| CoreError::not_found("User", user_id.as_str()))?;

        let mut updated = user.clone();
        mutate(&mut updated)?;

        match store.save_user_versioned(&updated, user.version).await {
            Ok(saved) => return Ok(saved),
            Err(StoreError::VersionConflict { .. }) => {
                debug!(user_id = %user_id, attempt, "balance update lost the version race, retrying");
                continue;
            }
            Err(err) => return Err(store_error(err)),
        }
    }

    Err(CoreError::conflict(format!(
        "Balance update on {} kept losing version races",
        user_id
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use memecoin_store::{MemoryStore, StoreConfig};

    fn test_store() -> Arc<dyn LedgerStore> {
        Arc::new(MemoryStore::new(StoreConfig::test()))
    }

    async fn seed_user(store: &Arc<dyn LedgerStore>, id: &str, balance: u32) -> UserId {
        let mut user = User::new(UserId::new(id));
        user.credit(Decimal::from(balance));
        store.save_user(&user).await.unwrap();
        user.user_id
    }

    #[tokio::test]
    async fn test_credit_stamps_new_version() {
        let store = test_store();
        let id = seed_user(&store, "user_1", 0).await;

        let saved = credit_user(&store, &id, Decimal::from(10u32)).await.unwrap();
        assert_eq!(saved.meme_coin_balance, Decimal::from(10u32));
        assert_eq!(saved.version, 1);

        let saved = credit_user(&store, &id, Decimal::from(5u32)).await.unwrap();
        assert_eq!(saved.meme_coin_balance, Decimal::from(15u32));
        assert_eq!(saved.version, 2);
    }

    #[tokio::test]
    async fn test_debit_insufficient_writes_nothing() {
        let store = test_store();
        let id = seed_user(&store, "user_1", 3).await;

        let err = debit_user(&store, &id, Decimal::from(5u32)).await.unwrap_err();
        assert!(matches!(err, CoreError::InsufficientBalance { .. }));

        let untouched = store.get_user(&id).await.unwrap().unwrap();
        assert_eq!(untouched.meme_coin_balance, Decimal::from(3u32));
        assert_eq!(untouched.version, 0);
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let store = test_store();
        let err = credit_user(&store, &UserId::new("ghost"), Decimal::ONE)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { entity: "User", .. }));
    }

    #[tokio::test]
    async fn test_store_error_mapping() {
        let missing = store_error(StoreError::missing("meme", "meme_1"));
        assert!(matches!(missing, CoreError::NotFound { entity: "Meme", .. }));

        let conflict = store_error(StoreError::VersionConflict {
            entity: "user",
            id: "user_1".to_string(),
            expected: 1,
            found: 2,
        });
        assert!(matches!(conflict, CoreError::Conflict(_)));

        let duplicate = store_error(StoreError::duplicate("engagement", "u|m|upvote"));
        assert!(matches!(duplicate, CoreError::Conflict(_)));

        let backend = store_error(StoreError::Backend("disk full".to_string()));
        assert!(matches!(backend, CoreError::Store(_)));
    }
}
