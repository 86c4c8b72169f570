//! Marketplace Handlers

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use memecoin_core::{Currency, ItemId, MemeId, Rarity, UserId};
use memecoin_engine::ListingFilter;

use crate::{
    dto::{BuyRequest, ItemDto, ListItemRequest, ReceiptDto},
    error::{ApiError, ApiResult},
    state::AppState,
};

const DEFAULT_BROWSE_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseQuery {
    pub seller_id: Option<String>,
    pub rarity: Option<String>,
    pub currency: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelQuery {
    pub item_id: Option<String>,
    pub seller_id: Option<String>,
}

/// `POST /api/marketplace/list`
pub async fn list_item(
    State(state): State<AppState>,
    Json(body): Json<ListItemRequest>,
) -> ApiResult<Json<Value>> {
    let (meme_id, seller_id, price) = match (
        body.meme_id.as_deref().filter(|s| !s.is_empty()),
        body.seller_id.as_deref().filter(|s| !s.is_empty()),
        body.price,
    ) {
        (Some(meme), Some(seller), Some(price)) => (meme, seller, price),
        _ => {
            return Err(ApiError::validation(
                "memeId, sellerId, and price required",
            ))
        }
    };

    let currency = match body.currency.as_deref() {
        Some(raw) => {
            Currency::parse(raw).ok_or_else(|| ApiError::validation("Invalid currency"))?
        }
        None => Currency::default(),
    };

    let item = state
        .marketplace
        .list_item(MemeId::new(meme_id), UserId::new(seller_id), price, currency)
        .await?;
    info!(item_id = %item.item_id, price = %item.price, "Item listed");

    Ok(Json(json!({
        "success": true,
        "item": ItemDto::from(item),
        "message": "Item listed successfully"
    })))
}

/// `GET /api/marketplace/list`
pub async fn browse_marketplace(
    State(state): State<AppState>,
    Query(query): Query<BrowseQuery>,
) -> ApiResult<Json<Value>> {
    let rarity = match query.rarity.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => {
            Some(Rarity::parse(raw).ok_or_else(|| ApiError::validation("Invalid rarity"))?)
        }
        None => None,
    };
    let currency = match query.currency.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => {
            Some(Currency::parse(raw).ok_or_else(|| ApiError::validation("Invalid currency"))?)
        }
        None => None,
    };

    let filter = ListingFilter {
        seller_id: query
            .seller_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(UserId::new),
        rarity,
        currency,
        limit: Some(query.limit.unwrap_or(DEFAULT_BROWSE_LIMIT)),
    };

    let items: Vec<ItemDto> = state
        .marketplace
        .browse(&filter)
        .await?
        .into_iter()
        .map(ItemDto::from)
        .collect();

    Ok(Json(json!({ "items": items })))
}

/// `DELETE /api/marketplace/list?itemId=&sellerId=`
pub async fn cancel_listing(
    State(state): State<AppState>,
    Query(query): Query<CancelQuery>,
) -> ApiResult<Json<Value>> {
    let item_id = query
        .item_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation("itemId parameter required"))?;
    let seller_id = query
        .seller_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation("sellerId parameter required"))?;

    state
        .marketplace
        .cancel(ItemId::new(item_id), UserId::new(seller_id))
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Item delisted successfully"
    })))
}

/// `POST /api/marketplace/buy`
pub async fn buy_item(
    State(state): State<AppState>,
    Json(body): Json<BuyRequest>,
) -> ApiResult<Json<Value>> {
    let (item_id, buyer_id) = match (
        body.item_id.as_deref().filter(|s| !s.is_empty()),
        body.buyer_id.as_deref().filter(|s| !s.is_empty()),
    ) {
        (Some(item), Some(buyer)) => (item, buyer),
        _ => return Err(ApiError::validation("itemId and buyerId required")),
    };

    let receipt = state
        .marketplace
        .purchase(ItemId::new(item_id), UserId::new(buyer_id))
        .await?;
    info!(
        item_id = %receipt.item_id,
        buyer_id = %receipt.buyer_id,
        price = %receipt.price,
        "Purchase settled"
    );

    Ok(Json(json!({
        "success": true,
        "transaction": ReceiptDto::from(receipt),
        "message": "Purchase completed successfully"
    })))
}
