//! Marketplace Settlement
//!
//! Listings are created by the meme's owner with a rarity derived from
//! upvotes at listing time. A purchase claims the listing with a versioned
//! save before any money moves, so two concurrent buyers cannot both win:
//! the loser's claim surfaces as `Conflict`. Debit, credit and delist run
//! in that order; the burn mirror afterwards is best-effort.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{error, info, warn};

use memecoin_bridge::ChainBridge;
use memecoin_core::{
    CoreError, CoreResult, Currency, ItemId, MarketplaceItem, MemeId, Rarity, TradeReceipt, UserId,
};
use memecoin_store::{LedgerStore, StoreError};

use crate::ledger::{credit_user, debit_user, store_error};

/// Filter for browsing the marketplace.
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    pub seller_id: Option<UserId>,
    pub rarity: Option<Rarity>,
    pub currency: Option<Currency>,
    pub limit: Option<usize>,
}

impl ListingFilter {
    fn matches(&self, item: &MarketplaceItem) -> bool {
        if let Some(seller_id) = &self.seller_id {
            if &item.seller_id != seller_id {
                return false;
            }
        }
        if let Some(rarity) = self.rarity {
            if item.rarity != rarity {
                return false;
            }
        }
        if let Some(currency) = self.currency {
            if item.currency != currency {
                return false;
            }
        }
        true
    }
}

/// Marketplace settlement engine.
pub struct MarketplaceService {
    store: Arc<dyn LedgerStore>,
    chain: Arc<ChainBridge>,
}

impl MarketplaceService {
    pub fn new(store: Arc<dyn LedgerStore>, chain: Arc<ChainBridge>) -> Self {
        Self { store, chain }
    }

    /// Put a meme up for sale.
    pub async fn list_item(
        &self,
        meme_id: MemeId,
        seller_id: UserId,
        price: Decimal,
        currency: Currency,
    ) -> CoreResult<MarketplaceItem> {
        if price <= Decimal::ZERO {
            return Err(CoreError::validation("price must be positive"));
        }
        self.store
            .get_user(&seller_id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| CoreError::not_found("Seller", seller_id.as_str()))?;
        let meme = self
            .store
            .get_meme(&meme_id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| CoreError::not_found("Meme", meme_id.as_str()))?;
        if meme.creator_id != seller_id {
            return Err(CoreError::validation("Only the creator can list this meme"));
        }

        let rarity = Rarity::from_upvotes(meme.upvotes);
        let item = MarketplaceItem::new(meme_id, seller_id, price, currency, rarity);
        self.store.save_item(&item).await.map_err(store_error)?;

        info!(
            item_id = %item.item_id,
            seller_id = %item.seller_id,
            price = %item.price,
            rarity = ?item.rarity,
            "item listed"
        );
        Ok(item)
    }

    /// Settle a purchase and return the trade receipt.
    pub async fn purchase(&self, item_id: ItemId, buyer_id: UserId) -> CoreResult<TradeReceipt> {
        // 1. Preconditions in order, first failure wins
        let item = self
            .store
            .get_item(&item_id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| CoreError::not_found("Item", item_id.as_str()))?;
        if !item.listed {
            return Err(CoreError::conflict("Item is not listed for sale"));
        }
        let buyer = self
            .store
            .get_user(&buyer_id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| CoreError::not_found("Buyer", buyer_id.as_str()))?;
        self.store
            .get_user(&item.seller_id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| CoreError::not_found("Seller", item.seller_id.as_str()))?;
        if buyer_id == item.seller_id {
            return Err(CoreError::self_action("Cannot buy your own items"));
        }
        if buyer.meme_coin_balance < item.price {
            return Err(CoreError::InsufficientBalance {
                required: item.price,
                available: buyer.meme_coin_balance,
            });
        }

        // 2. Claim the listing; a concurrent buyer's claim loses here
        let mut claimed = item.clone();
        claimed.listed = false;
        let claimed = match self.store.save_item_versioned(&claimed, item.version).await {
            Ok(claimed) => claimed,
            Err(StoreError::VersionConflict { .. }) | Err(StoreError::Missing { .. }) => {
                return Err(CoreError::conflict("Item was just sold"));
            }
            Err(err) => return Err(store_error(err)),
        };

        // 3. Move the money, releasing the claim if the debit falls through
        let debited = match debit_user(&self.store, &buyer_id, item.price).await {
            Ok(debited) => debited,
            Err(err) => {
                self.release_claim(claimed).await;
                return Err(err);
            }
        };
        if let Err(err) = credit_user(&self.store, &item.seller_id, item.price).await {
            // Debit landed but the credit did not; surface the failure
            // rather than guessing at a rollback of settled money.
            error!(
                item_id = %item_id,
                buyer_id = %buyer_id,
                seller_id = %item.seller_id,
                price = %item.price,
                error = %err,
                "seller credit failed after buyer debit"
            );
            return Err(err);
        }

        // 4. The listing is consumed
        self.store
            .delete_item(&item_id)
            .await
            .map_err(store_error)?;

        // 5. Best-effort burn for wallet-linked MemeCoin buyers
        if item.currency == Currency::Memecoin {
            if let Some(wallet) = debited.wallet_address.as_deref() {
                let result = self.chain.burn_for_transaction(wallet, item.price).await;
                if !result.success {
                    warn!(
                        buyer_id = %buyer_id,
                        error = result.error.as_deref().unwrap_or("rejected"),
                        "burn mirror failed, ledger remains authoritative"
                    );
                }
            }
        }

        let receipt = TradeReceipt {
            item_id,
            buyer_id,
            seller_id: item.seller_id,
            price: item.price,
            currency: item.currency,
            timestamp: Utc::now(),
        };
        info!(
            item_id = %receipt.item_id,
            buyer_id = %receipt.buyer_id,
            seller_id = %receipt.seller_id,
            price = %receipt.price,
            "purchase settled"
        );
        Ok(receipt)
    }

    /// Take a listing down. Only the seller may cancel.
    pub async fn cancel(&self, item_id: ItemId, seller_id: UserId) -> CoreResult<()> {
        let item = self
            .store
            .get_item(&item_id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| CoreError::not_found("Item", item_id.as_str()))?;
        if item.seller_id != seller_id {
            return Err(CoreError::validation("Only the seller can cancel a listing"));
        }

        // Claim before deleting so a racing purchase cannot pay for a
        // listing that is being withdrawn.
        let mut withdrawn = item.clone();
        withdrawn.listed = false;
        match self.store.save_item_versioned(&withdrawn, item.version).await {
            Ok(_) => {}
            Err(StoreError::VersionConflict { .. }) | Err(StoreError::Missing { .. }) => {
                return Err(CoreError::conflict("Item was just sold"));
            }
            Err(err) => return Err(store_error(err)),
        }
        self.store
            .delete_item(&item_id)
            .await
            .map_err(store_error)?;

        info!(item_id = %item_id, seller_id = %seller_id, "listing cancelled");
        Ok(())
    }

    /// Browse active listings, newest first.
    pub async fn browse(&self, filter: &ListingFilter) -> CoreResult<Vec<MarketplaceItem>> {
        let mut items: Vec<MarketplaceItem> = self
            .store
            .list_listed_items()
            .await
            .map_err(store_error)?
            .into_iter()
            .filter(|item| filter.matches(item))
            .collect();
        if let Some(limit) = filter.limit {
            items.truncate(limit);
        }
        Ok(items)
    }

    /// Relist a claimed item after a failed settlement.
    async fn release_claim(&self, mut claimed: MarketplaceItem) {
        claimed.listed = true;
        if let Err(err) = self.store.save_item(&claimed).await {
            error!(
                item_id = %claimed.item_id,
                error = %err,
                "failed to relist item after aborted purchase"
            );
        }
    }
}
