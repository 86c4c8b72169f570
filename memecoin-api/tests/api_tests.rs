//! Integration tests for the MemeCoin API endpoints
//!
//! These tests verify the HTTP surface end to end against the in-memory
//! store and unconfigured bridges, including the complete reward flow.

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum_test::TestServer;
use memecoin_api::{create_router, AppState};
use memecoin_bridge::{BridgeConfig, Bridges};
use memecoin_engine::RateLimitConfig;
use memecoin_store::{LedgerStore, MemoryStore, StoreConfig};
use serde_json::json;

/// Create test app state on the in-memory store with offline bridges
fn create_test_state(rate: RateLimitConfig) -> AppState {
    let store: Arc<dyn LedgerStore> = Arc::new(MemoryStore::new(StoreConfig::test()));
    let bridges = Bridges::new(&BridgeConfig::default()).unwrap();
    AppState::new(store, bridges, rate)
}

/// Create test server
fn create_test_server() -> TestServer {
    let state = create_test_state(RateLimitConfig::default());
    TestServer::new(create_router(state)).unwrap()
}

/// Create test server with a tiny mutation allowance
fn create_strict_server(burst: u32) -> TestServer {
    let state = create_test_state(RateLimitConfig {
        max_requests: burst,
        window: Duration::from_secs(60),
        burst_capacity: burst,
    });
    TestServer::new(create_router(state)).unwrap()
}

async fn create_user(server: &TestServer, user_id: &str) {
    let response = server
        .post("/api/users")
        .json(&json!({ "userId": user_id }))
        .await;
    response.assert_status(StatusCode::CREATED);
}

async fn publish_meme(server: &TestServer, creator_id: &str) -> String {
    let response = server
        .post("/api/memes")
        .json(&json!({
            "creatorId": creator_id,
            "imageUrl": "https://img.example/meme.png",
            "textPrompt": "gm frens",
            "topic": "crypto"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    body["data"]["memeId"].as_str().unwrap().to_string()
}

async fn balance_of(server: &TestServer, user_id: &str) -> String {
    let response = server.get(&format!("/api/users?userId={}", user_id)).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    body["data"]["memeCoinBalance"].as_str().unwrap().to_string()
}

// ============ Health Endpoint Tests ============

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["name"], "memecoin-api");
}

// ============ User Endpoint Tests ============

#[tokio::test]
async fn test_create_user() {
    let server = create_test_server();

    let response = server
        .post("/api/users")
        .json(&json!({
            "userId": "user_1",
            "username": "alice",
            "walletAddress": "0x1234567890abcdef1234567890abcdef12345678"
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["userId"], "user_1");
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["memeCoinBalance"], "0");
    assert!(body["data"]["badges"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_user_requires_user_id() {
    let server = create_test_server();

    let response = server.post("/api/users").json(&json!({})).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["error"].as_str().unwrap().contains("userId is required"));
}

#[tokio::test]
async fn test_duplicate_user_conflicts() {
    let server = create_test_server();
    create_user(&server, "user_1").await;

    let response = server
        .post("/api/users")
        .json(&json!({ "userId": "user_1" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "CONFLICT");
    assert!(body["error"].as_str().unwrap().contains("User already exists"));
}

#[tokio::test]
async fn test_get_user_not_found() {
    let server = create_test_server();

    let response = server.get("/api/users?userId=ghost").await;

    response.assert_status_not_found();
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_leaderboard_assigns_ranks() {
    let server = create_test_server();
    create_user(&server, "rich").await;
    create_user(&server, "poor").await;
    publish_meme(&server, "rich").await;

    let response = server.get("/api/users?action=leaderboard").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["userId"], "rich");
    assert_eq!(entries[0]["memeCoinBalance"], "10");
    assert_eq!(entries[0]["leaderboardRank"], 1);
    assert_eq!(entries[1]["leaderboardRank"], 2);

    let limited = server.get("/api/users?action=leaderboard&limit=1").await;
    let body: serde_json::Value = limited.json();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_invalid_users_action_rejected() {
    let server = create_test_server();

    let response = server.get("/api/users?action=export").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("Invalid action"));
}

// ============ Meme Endpoint Tests ============

#[tokio::test]
async fn test_publish_meme_settles_creation_reward() {
    let server = create_test_server();
    create_user(&server, "creator_1").await;

    let meme_id = publish_meme(&server, "creator_1").await;

    let response = server.get(&format!("/api/memes?memeId={}", meme_id)).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["creatorId"], "creator_1");
    assert_eq!(body["data"]["topic"], "crypto");
    assert_eq!(body["data"]["upvotes"], 0);

    assert_eq!(balance_of(&server, "creator_1").await, "10");
}

#[tokio::test]
async fn test_publish_meme_requires_all_fields() {
    let server = create_test_server();

    let response = server
        .post("/api/memes")
        .json(&json!({ "creatorId": "creator_1" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("creatorId, imageUrl, textPrompt, and topic are required"));
}

#[tokio::test]
async fn test_publish_meme_unknown_creator() {
    let server = create_test_server();

    let response = server
        .post("/api/memes")
        .json(&json!({
            "creatorId": "ghost",
            "imageUrl": "https://img.example/meme.png",
            "textPrompt": "gm",
            "topic": "crypto"
        }))
        .await;

    response.assert_status_not_found();
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("Creator not found"));
}

#[tokio::test]
async fn test_latest_feed_newest_first() {
    let server = create_test_server();
    create_user(&server, "creator_1").await;
    let first = publish_meme(&server, "creator_1").await;
    let second = publish_meme(&server, "creator_1").await;

    let response = server.get("/api/memes").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let feed = body["data"].as_array().unwrap();
    assert_eq!(feed.len(), 2);
    assert_eq!(feed[0]["memeId"], second.as_str());
    assert_eq!(feed[1]["memeId"], first.as_str());
}

#[tokio::test]
async fn test_feed_filters_by_creator() {
    let server = create_test_server();
    create_user(&server, "alice").await;
    create_user(&server, "bob").await;
    publish_meme(&server, "alice").await;
    publish_meme(&server, "bob").await;

    let response = server.get("/api/memes?creatorId=alice").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let feed = body["data"].as_array().unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0]["creatorId"], "alice");
}

#[tokio::test]
async fn test_feed_rejects_unknown_sort() {
    let server = create_test_server();

    let response = server.get("/api/memes?sort=hot").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Sort must be latest or trending"));
}

#[tokio::test]
async fn test_trending_feed_ranks_engaged_memes() {
    let server = create_test_server();
    create_user(&server, "creator_1").await;
    create_user(&server, "fan_1").await;
    publish_meme(&server, "creator_1").await;
    let hot = publish_meme(&server, "creator_1").await;

    server
        .post("/api/engagements")
        .json(&json!({ "userId": "fan_1", "memeId": hot, "type": "upvote" }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server.get("/api/memes?sort=trending").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let feed = body["data"].as_array().unwrap();
    assert!(!feed.is_empty());
    assert_eq!(feed[0]["memeId"], hot.as_str());
}

// ============ Engagement Endpoint Tests ============

#[tokio::test]
async fn test_upvote_pays_creator_once() {
    let server = create_test_server();
    create_user(&server, "creator_1").await;
    create_user(&server, "fan_1").await;
    let meme_id = publish_meme(&server, "creator_1").await;

    let response = server
        .post("/api/engagements")
        .json(&json!({ "userId": "fan_1", "memeId": meme_id, "type": "upvote" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["type"], "upvote");
    assert_eq!(body["data"]["userId"], "fan_1");
    assert_eq!(balance_of(&server, "creator_1").await, "12");

    // The same fan upvoting the same meme again is rejected unchanged
    let repeat = server
        .post("/api/engagements")
        .json(&json!({ "userId": "fan_1", "memeId": meme_id, "type": "upvote" }))
        .await;
    repeat.assert_status(StatusCode::CONFLICT);
    let body: serde_json::Value = repeat.json();
    assert_eq!(body["code"], "CONFLICT");
    assert_eq!(balance_of(&server, "creator_1").await, "12");
}

#[tokio::test]
async fn test_comment_requires_text() {
    let server = create_test_server();
    create_user(&server, "creator_1").await;
    create_user(&server, "fan_1").await;
    let meme_id = publish_meme(&server, "creator_1").await;

    let response = server
        .post("/api/engagements")
        .json(&json!({ "userId": "fan_1", "memeId": meme_id, "type": "comment" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("commentText is required for comment type"));
}

#[tokio::test]
async fn test_engagement_rejects_unknown_type() {
    let server = create_test_server();

    let response = server
        .post("/api/engagements")
        .json(&json!({ "userId": "u1", "memeId": "m1", "type": "like" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Type must be upvote, comment, or share"));
}

#[tokio::test]
async fn test_engagement_requires_fields() {
    let server = create_test_server();

    let response = server
        .post("/api/engagements")
        .json(&json!({ "userId": "u1" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("userId, memeId, and type are required"));
}

#[tokio::test]
async fn test_self_engagement_records_without_paying() {
    let server = create_test_server();
    create_user(&server, "creator_1").await;
    let meme_id = publish_meme(&server, "creator_1").await;

    let response = server
        .post("/api/engagements")
        .json(&json!({ "userId": "creator_1", "memeId": meme_id, "type": "share" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    // The creation reward stands; the self-share added nothing
    assert_eq!(balance_of(&server, "creator_1").await, "10");
}

#[tokio::test]
async fn test_list_engagements_filters() {
    let server = create_test_server();
    create_user(&server, "creator_1").await;
    create_user(&server, "fan_1").await;
    let meme_id = publish_meme(&server, "creator_1").await;

    for payload in [
        json!({ "userId": "fan_1", "memeId": meme_id, "type": "upvote" }),
        json!({ "userId": "fan_1", "memeId": meme_id, "type": "comment", "commentText": "lol" }),
    ] {
        server
            .post("/api/engagements")
            .json(&payload)
            .await
            .assert_status(StatusCode::CREATED);
    }

    let response = server.get(&format!("/api/engagements?memeId={}", meme_id)).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let comments = server
        .get(&format!("/api/engagements?memeId={}&type=comment", meme_id))
        .await;
    let body: serde_json::Value = comments.json();
    let filtered = body["data"].as_array().unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0]["commentText"], "lol");

    let missing = server.get("/api/engagements").await;
    missing.assert_status(StatusCode::BAD_REQUEST);
}

// ============ Reward Endpoint Tests ============

#[tokio::test]
async fn test_settle_daily_login() {
    let server = create_test_server();
    create_user(&server, "user_1").await;

    let response = server
        .post("/api/rewards")
        .json(&json!({ "type": "daily_login", "userId": "user_1" }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["amount"], "5");
    assert_eq!(body["reason"], "Daily login reward");
    assert_eq!(balance_of(&server, "user_1").await, "5");
}

#[tokio::test]
async fn test_first_meme_bonus_settles_once() {
    let server = create_test_server();
    create_user(&server, "user_1").await;

    let first = server
        .post("/api/rewards")
        .json(&json!({ "type": "first_meme", "userId": "user_1" }))
        .await;
    first.assert_status_ok();
    let body: serde_json::Value = first.json();
    assert_eq!(body["amount"], "25");

    let second = server
        .post("/api/rewards")
        .json(&json!({ "type": "first_meme", "userId": "user_1" }))
        .await;
    second.assert_status_ok();
    let body: serde_json::Value = second.json();
    assert_eq!(body["amount"], "0");
    assert_eq!(body["reason"], "First meme bonus already claimed");
    assert_eq!(balance_of(&server, "user_1").await, "25");
}

#[tokio::test]
async fn test_unknown_reward_type_rejected() {
    let server = create_test_server();

    let response = server
        .post("/api/rewards")
        .json(&json!({ "type": "airdrop", "userId": "user_1" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Unknown reward type: airdrop"));
}

#[tokio::test]
async fn test_reward_for_unknown_user_not_found() {
    let server = create_test_server();

    let response = server
        .post("/api/rewards")
        .json(&json!({ "type": "daily_login", "userId": "ghost" }))
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn test_earnings_split() {
    let server = create_test_server();
    create_user(&server, "user_1").await;
    create_user(&server, "meme_author").await;
    let meme_id = publish_meme(&server, "meme_author").await;
    server
        .post("/api/rewards")
        .json(&json!({ "type": "trending_bonus", "userId": "user_1", "memeId": meme_id }))
        .await
        .assert_status_ok();

    let response = server.get("/api/rewards?userId=user_1").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["totalEarned"], "50");
    assert_eq!(body["data"]["creationEstimate"], "30");
    assert_eq!(body["data"]["engagementEstimate"], "15");
    assert_eq!(body["data"]["bonusEstimate"], "5");
}

#[tokio::test]
async fn test_earnings_requires_user_id() {
    let server = create_test_server();

    let response = server.get("/api/rewards").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("userId parameter required"));
}

// ============ Virality Endpoint Tests ============

#[tokio::test]
async fn test_calculate_virality_pays_once() {
    let server = create_test_server();
    create_user(&server, "creator_1").await;
    create_user(&server, "fan_1").await;
    let meme_id = publish_meme(&server, "creator_1").await;
    server
        .post("/api/engagements")
        .json(&json!({ "userId": "fan_1", "memeId": meme_id, "type": "upvote" }))
        .await
        .assert_status(StatusCode::CREATED);

    let first = server
        .post("/api/rewards/calculate")
        .json(&json!({ "memeId": meme_id }))
        .await;
    first.assert_status_ok();
    let body: serde_json::Value = first.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["memeId"], meme_id.as_str());
    assert_eq!(body["data"]["reason"], "Virality reward settled");
    assert_ne!(body["data"]["amountPaid"], "0");
    assert!(body["data"]["viralityMultiplier"].is_number());

    // Nothing changed since settlement, so a repeat pays nothing
    let second = server
        .post("/api/rewards/calculate")
        .json(&json!({ "memeId": meme_id }))
        .await;
    second.assert_status_ok();
    let body: serde_json::Value = second.json();
    assert_eq!(body["data"]["amountPaid"], "0");
    assert_eq!(body["data"]["reason"], "Virality reward already settled");
}

#[tokio::test]
async fn test_calculate_requires_meme_id() {
    let server = create_test_server();

    let response = server.post("/api/rewards/calculate").json(&json!({})).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("memeId is required"));
}

// ============ Marketplace Endpoint Tests ============

#[tokio::test]
async fn test_list_and_browse_marketplace() {
    let server = create_test_server();
    create_user(&server, "seller_1").await;
    let meme_id = publish_meme(&server, "seller_1").await;

    let response = server
        .post("/api/marketplace/list")
        .json(&json!({ "memeId": meme_id, "sellerId": "seller_1", "price": 5 }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Item listed successfully");
    assert_eq!(body["item"]["rarity"], "common");
    assert_eq!(body["item"]["currency"], "MEMECOIN");
    assert_eq!(body["item"]["price"], "5");

    let browse = server.get("/api/marketplace/list").await;
    browse.assert_status_ok();
    let body: serde_json::Value = browse.json();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["sellerId"], "seller_1");

    let filtered = server.get("/api/marketplace/list?rarity=legendary").await;
    let body: serde_json::Value = filtered.json();
    assert!(body["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_listing_requires_fields() {
    let server = create_test_server();

    let response = server
        .post("/api/marketplace/list")
        .json(&json!({ "memeId": "m1" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("memeId, sellerId, and price required"));
}

#[tokio::test]
async fn test_only_creator_can_list() {
    let server = create_test_server();
    create_user(&server, "creator_1").await;
    create_user(&server, "stranger").await;
    let meme_id = publish_meme(&server, "creator_1").await;

    let response = server
        .post("/api/marketplace/list")
        .json(&json!({ "memeId": meme_id, "sellerId": "stranger", "price": 5 }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Only the creator can list this meme"));
}

#[tokio::test]
async fn test_purchase_moves_balances() {
    let server = create_test_server();
    create_user(&server, "seller_1").await;
    create_user(&server, "buyer_1").await;
    let meme_id = publish_meme(&server, "seller_1").await;
    publish_meme(&server, "buyer_1").await;

    let listed = server
        .post("/api/marketplace/list")
        .json(&json!({ "memeId": meme_id, "sellerId": "seller_1", "price": 5 }))
        .await;
    let body: serde_json::Value = listed.json();
    let item_id = body["item"]["itemId"].as_str().unwrap().to_string();

    let response = server
        .post("/api/marketplace/buy")
        .json(&json!({ "itemId": item_id, "buyerId": "buyer_1" }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Purchase completed successfully");
    assert_eq!(body["transaction"]["price"], "5");
    assert_eq!(body["transaction"]["sellerId"], "seller_1");

    // 10 + 5 for the seller, 10 - 5 for the buyer
    assert_eq!(balance_of(&server, "seller_1").await, "15");
    assert_eq!(balance_of(&server, "buyer_1").await, "5");

    let browse = server.get("/api/marketplace/list").await;
    let body: serde_json::Value = browse.json();
    assert!(body["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_purchase_insufficient_balance_rejected() {
    let server = create_test_server();
    create_user(&server, "seller_1").await;
    create_user(&server, "broke").await;
    let meme_id = publish_meme(&server, "seller_1").await;

    let listed = server
        .post("/api/marketplace/list")
        .json(&json!({ "memeId": meme_id, "sellerId": "seller_1", "price": 25 }))
        .await;
    let body: serde_json::Value = listed.json();
    let item_id = body["item"]["itemId"].as_str().unwrap().to_string();

    let response = server
        .post("/api/marketplace/buy")
        .json(&json!({ "itemId": item_id, "buyerId": "broke" }))
        .await;

    response.assert_status(StatusCode::PAYMENT_REQUIRED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "INSUFFICIENT_BALANCE");

    // Nothing moved and the listing is still up
    assert_eq!(balance_of(&server, "seller_1").await, "10");
    assert_eq!(balance_of(&server, "broke").await, "0");
    let browse = server.get("/api/marketplace/list").await;
    let body: serde_json::Value = browse.json();
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_self_purchase_forbidden() {
    let server = create_test_server();
    create_user(&server, "seller_1").await;
    let meme_id = publish_meme(&server, "seller_1").await;

    let listed = server
        .post("/api/marketplace/list")
        .json(&json!({ "memeId": meme_id, "sellerId": "seller_1", "price": 5 }))
        .await;
    let body: serde_json::Value = listed.json();
    let item_id = body["item"]["itemId"].as_str().unwrap().to_string();

    let response = server
        .post("/api/marketplace/buy")
        .json(&json!({ "itemId": item_id, "buyerId": "seller_1" }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "SELF_ACTION");
}

#[tokio::test]
async fn test_cancel_listing_restricted_to_seller() {
    let server = create_test_server();
    create_user(&server, "seller_1").await;
    create_user(&server, "stranger").await;
    let meme_id = publish_meme(&server, "seller_1").await;

    let listed = server
        .post("/api/marketplace/list")
        .json(&json!({ "memeId": meme_id, "sellerId": "seller_1", "price": 5 }))
        .await;
    let body: serde_json::Value = listed.json();
    let item_id = body["item"]["itemId"].as_str().unwrap().to_string();

    let denied = server
        .delete(&format!(
            "/api/marketplace/list?itemId={}&sellerId=stranger",
            item_id
        ))
        .await;
    denied.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .delete(&format!(
            "/api/marketplace/list?itemId={}&sellerId=seller_1",
            item_id
        ))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Item delisted successfully");

    let browse = server.get("/api/marketplace/list").await;
    let body: serde_json::Value = browse.json();
    assert!(body["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_buy_requires_fields() {
    let server = create_test_server();

    let response = server
        .post("/api/marketplace/buy")
        .json(&json!({ "itemId": "item_1" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("itemId and buyerId required"));
}

// ============ Trend Endpoint Tests ============

#[tokio::test]
async fn test_trends_serve_seeded_table() {
    let server = create_test_server();

    let response = server.get("/api/trends").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let trends = body["trends"].as_array().unwrap();
    assert!(!trends.is_empty());
    assert_eq!(trends[0]["keyword"], "DeFi");

    let tech = server.get("/api/trends?category=tech").await;
    let body: serde_json::Value = tech.json();
    for trend in body["trends"].as_array().unwrap() {
        assert_eq!(trend["category"], "tech");
    }
}

#[tokio::test]
async fn test_record_trend_upserts() {
    let server = create_test_server();

    let created = server
        .post("/api/trends")
        .json(&json!({ "keyword": "Restaking", "category": "crypto", "frequency": 40 }))
        .await;
    created.assert_status_ok();
    let body: serde_json::Value = created.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Trend created successfully");
    assert_eq!(body["trend"]["frequency"], 40);

    // Same keyword under different casing bumps the stored entry
    let bumped = server
        .post("/api/trends")
        .json(&json!({ "keyword": "restaking" }))
        .await;
    let body: serde_json::Value = bumped.json();
    assert_eq!(body["trend"]["frequency"], 41);
}

#[tokio::test]
async fn test_trend_requires_keyword() {
    let server = create_test_server();

    let response = server.post("/api/trends").json(&json!({})).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("Keyword required"));
}

#[tokio::test]
async fn test_trends_reject_invalid_category() {
    let server = create_test_server();

    let response = server.get("/api/trends?category=astrology").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("Invalid category"));
}

// ============ Caption Generation Tests ============

#[tokio::test]
async fn test_generate_caption_offline() {
    let server = create_test_server();

    let response = server
        .post("/api/memes/generate")
        .json(&json!({ "topic": "DeFi" }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert!(body["meme"]["text"].as_str().unwrap().contains("DeFi"));
    assert_eq!(body["meme"]["category"], "crypto");
    let score = body["meme"]["viralityScore"].as_u64().unwrap();
    assert!((1..=10).contains(&score));
    let hashtags = body["meme"]["hashtags"].as_array().unwrap();
    assert!(hashtags.contains(&json!("#defi")));
}

#[tokio::test]
async fn test_generate_requires_topic() {
    let server = create_test_server();

    let response = server.post("/api/memes/generate").json(&json!({})).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("Topic required"));
}

#[tokio::test]
async fn test_suggestions_action() {
    let server = create_test_server();

    let response = server.get("/api/memes/generate?action=suggestions").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let suggestions = body["suggestions"].as_array().unwrap();
    assert_eq!(suggestions.len(), 5);
    let current = body["currentTrends"].as_array().unwrap();
    assert!(!current.is_empty());
    assert_eq!(current[0], "DeFi");
}

#[tokio::test]
async fn test_analyze_action() {
    let server = create_test_server();

    let response = server
        .get("/api/memes/generate?action=analyze&text=when+the+chain+halts")
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let score = body["viralityScore"].as_u64().unwrap();
    assert!((1..=10).contains(&score));

    let missing = server.get("/api/memes/generate?action=analyze").await;
    missing.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_generate_rejects_invalid_action() {
    let server = create_test_server();

    let response = server.get("/api/memes/generate?action=remix").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("Invalid action"));
}

// ============ Template Endpoint Tests ============

#[tokio::test]
async fn test_templates_table() {
    let server = create_test_server();

    let response = server.get("/api/templates").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let templates = body["templates"].as_array().unwrap();
    assert!(!templates.is_empty());
    for template in templates {
        assert!(template["id"].as_str().is_some());
        assert!(template["imageUrl"].as_str().is_some());
        assert!(!template["textAreas"].as_array().unwrap().is_empty());
    }
}

// ============ Farcaster Endpoint Tests ============

#[tokio::test]
async fn test_farcaster_user_absent_when_degraded() {
    let server = create_test_server();

    let response = server.get("/api/farcaster/user?fid=3").await;

    // No social API key in tests, so every profile lookup is absent
    response.assert_status_not_found();
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_farcaster_user_requires_fid() {
    let server = create_test_server();

    let missing = server.get("/api/farcaster/user").await;
    missing.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = missing.json();
    assert!(body["error"].as_str().unwrap().contains("FID parameter required"));

    let invalid = server.get("/api/farcaster/user?fid=abc").await;
    invalid.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = invalid.json();
    assert!(body["error"].as_str().unwrap().contains("Invalid FID"));
}

#[tokio::test]
async fn test_farcaster_casts_empty_when_degraded() {
    let server = create_test_server();

    let response = server.get("/api/farcaster/casts?fid=3").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert!(body["casts"].as_array().unwrap().is_empty());
}

// ============ Frame Endpoint Tests ============

#[tokio::test]
async fn test_frame_metadata() {
    let server = create_test_server();

    let response = server.get("/api/frame").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["fc:frame"], "vNext");
    assert!(body["fc:frame:image"]
        .as_str()
        .unwrap()
        .ends_with("/api/frame/image"));
    assert_eq!(body["fc:frame:button:1"], "Create Meme");
    assert_eq!(body["fc:frame:button:4"], "Analytics");
    assert!(body["fc:frame:post_url"]
        .as_str()
        .unwrap()
        .ends_with("/api/frame"));
}

#[tokio::test]
async fn test_frame_action_dispatches_buttons() {
    let server = create_test_server();

    let response = server
        .post("/api/frame")
        .json(&json!({ "untrustedData": { "buttonIndex": 3, "fid": 42 } }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["fc:frame:button:1"], "Open App");
    assert_eq!(body["fc:frame:button:1:action"], "link");
    assert!(body["fc:frame:button:1:target"]
        .as_str()
        .unwrap()
        .ends_with("/marketplace"));

    let feed = server
        .post("/api/frame")
        .json(&json!({ "untrustedData": { "buttonIndex": 2 } }))
        .await;
    let body: serde_json::Value = feed.json();
    assert!(body["fc:frame:button:1:target"].as_str().unwrap().ends_with("/"));
}

#[tokio::test]
async fn test_frame_action_requires_payload() {
    let server = create_test_server();

    let response = server.post("/api/frame").json(&json!({})).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("Invalid frame data"));
}

#[tokio::test]
async fn test_frame_image_is_svg() {
    let server = create_test_server();

    let response = server.get("/api/frame/image").await;

    response.assert_status_ok();
    let headers = response.headers();
    let content_type = headers.get("content-type").unwrap().to_str().unwrap();
    assert_eq!(content_type, "image/svg+xml");
    assert!(headers.get("cache-control").is_some());
    assert!(response.text().contains("<svg"));
}

// ============ Rate Limiting Tests ============

#[tokio::test]
async fn test_mutations_throttled_after_burst() {
    let server = create_strict_server(2);

    for _ in 0..2 {
        server
            .post("/api/trends")
            .json(&json!({ "keyword": "gm" }))
            .await
            .assert_status_ok();
    }

    let denied = server
        .post("/api/trends")
        .json(&json!({ "keyword": "gm" }))
        .await;
    denied.assert_status(StatusCode::TOO_MANY_REQUESTS);
    let body: serde_json::Value = denied.json();
    assert_eq!(body["code"], "RATE_LIMITED");
    let headers = denied.headers();
    assert_eq!(headers.get("x-ratelimit-remaining").unwrap(), "0");
    let retry_after: u64 = headers
        .get("retry-after")
        .unwrap()
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(retry_after >= 1);

    // Reads stay open while mutations are throttled
    server.get("/api/trends").await.assert_status_ok();
}

#[tokio::test]
async fn test_allowed_requests_carry_quota_headers() {
    let server = create_test_server();

    let response = server
        .post("/api/users")
        .json(&json!({ "userId": "user_1" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let headers = response.headers();
    assert_eq!(headers.get("x-ratelimit-limit").unwrap(), "30");
    assert_eq!(headers.get("x-ratelimit-remaining").unwrap(), "29");
}

// ============ End-to-End Flow Tests ============

/// Test complete flow: Create User -> Publish Meme -> Engage -> Balances
#[tokio::test]
async fn test_e2e_reward_flow() {
    let server = create_test_server();

    // Step 1: A fresh creator starts at zero
    create_user(&server, "creator_1").await;
    assert_eq!(balance_of(&server, "creator_1").await, "0");

    // Step 2: Publishing settles the creation reward
    let meme_id = publish_meme(&server, "creator_1").await;
    assert_eq!(balance_of(&server, "creator_1").await, "10");

    // Step 3: A fan's upvote pays the creator
    create_user(&server, "fan_1").await;
    server
        .post("/api/engagements")
        .json(&json!({ "userId": "fan_1", "memeId": meme_id, "type": "upvote" }))
        .await
        .assert_status(StatusCode::CREATED);
    assert_eq!(balance_of(&server, "creator_1").await, "12");

    // Step 4: Replaying the upvote changes nothing
    let repeat = server
        .post("/api/engagements")
        .json(&json!({ "userId": "fan_1", "memeId": meme_id, "type": "upvote" }))
        .await;
    repeat.assert_status(StatusCode::CONFLICT);
    assert_eq!(balance_of(&server, "creator_1").await, "12");

    // Step 5: The meme carries the engagement it earned
    let response = server.get(&format!("/api/memes?memeId={}", meme_id)).await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["upvotes"], 1);
    assert_eq!(balance_of(&server, "fan_1").await, "0");
}
