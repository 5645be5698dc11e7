//! API integration tests
//!
//! These run against a live server with a fresh database:
//! `cargo run` in one terminal, then `cargo test -- --ignored`.

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

fn unique_email(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}+{}@example.com", prefix, nanos)
}

/// Sign up a fresh user and return (token, profile id)
async fn signup(client: &Client, prefix: &str) -> (String, String) {
    let response = client
        .post(format!("{}/auth/signup", BASE_URL))
        .json(&json!({
            "email": unique_email(prefix),
            "password": "correct-horse-battery",
            "username": null
        }))
        .send()
        .await
        .expect("Failed to send signup request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse signup response");
    let token = body["token"].as_str().expect("No token in response").to_string();
    let user_id = body["profile"]["id"].as_str().expect("No profile id").to_string();
    (token, user_id)
}

/// Create an item owned by the given token's user, returning its id
async fn create_item(client: &Client, token: &str, name: &str) -> String {
    let response = client
        .post(format!("{}/items", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "name": name,
            "description": "integration test item",
            "category": "Tools"
        }))
        .send()
        .await
        .expect("Failed to send create item request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse item response");
    body["id"].as_str().expect("No item id").to_string()
}

async fn item_status(client: &Client, item_id: &str) -> String {
    let response = client
        .get(format!("{}/items/{}", BASE_URL, item_id))
        .send()
        .await
        .expect("Failed to send get item request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse item response");
    body["status"].as_str().expect("No status").to_string()
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_signup_and_me() {
    let client = Client::new();
    let (token, user_id) = signup(&client, "me").await;

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["id"].as_str().unwrap(), user_id);
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "nobody@example.com",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_logout_revokes_token() {
    let client = Client::new();
    let (token, _) = signup(&client, "logout").await;

    let response = client
        .post(format!("{}/auth/logout", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_list_items_is_public() {
    let client = Client::new();

    let response = client
        .get(format!("{}/items", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["items"].is_array());
    assert!(body["total"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_new_item_is_available() {
    let client = Client::new();
    let (token, _) = signup(&client, "owner").await;
    let item_id = create_item(&client, &token, "Cordless drill").await;

    assert_eq!(item_status(&client, &item_id).await, "available");
}

#[tokio::test]
#[ignore]
async fn test_request_lifecycle_happy_path() {
    let client = Client::new();
    let (owner_token, _) = signup(&client, "lender").await;
    let (borrower_token, _) = signup(&client, "borrower").await;
    let item_id = create_item(&client, &owner_token, "Pressure washer").await;

    // Borrower requests the item
    let response = client
        .post(format!("{}/items/{}/requests", BASE_URL, item_id))
        .header("Authorization", format!("Bearer {}", borrower_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    let request_id = body["id"].as_str().expect("No request id").to_string();
    assert_eq!(body["status"], "pending");
    assert_eq!(item_status(&client, &item_id).await, "requested");

    // Owner approves; due date lands one week out
    let before = chrono::Utc::now();
    let response = client
        .post(format!("{}/requests/{}/approve", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", owner_token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "approved");
    let due_date: chrono::DateTime<chrono::Utc> =
        body["due_date"].as_str().unwrap().parse().unwrap();
    let expected = before + chrono::Duration::days(7);
    assert!((due_date - expected).num_seconds().abs() < 60);
    assert_eq!(item_status(&client, &item_id).await, "checked_out");

    // Active checkout names the borrower
    let response = client
        .get(format!("{}/items/{}/checkout", BASE_URL, item_id))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["checkout"]["id"].as_str().unwrap(), request_id);

    // Owner marks the item returned
    let response = client
        .post(format!("{}/requests/{}/return", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", owner_token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "returned");
    assert!(body["return_date"].is_string());
    assert_eq!(item_status(&client, &item_id).await, "available");
}

#[tokio::test]
#[ignore]
async fn test_duplicate_request_is_rejected() {
    let client = Client::new();
    let (owner_token, _) = signup(&client, "lender").await;
    let (borrower_token, _) = signup(&client, "eager").await;
    let item_id = create_item(&client, &owner_token, "Tile saw").await;

    let response = client
        .post(format!("{}/items/{}/requests", BASE_URL, item_id))
        .header("Authorization", format!("Bearer {}", borrower_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    // Second request while the first is still pending
    let response = client
        .post(format!("{}/items/{}/requests", BASE_URL, item_id))
        .header("Authorization", format!("Bearer {}", borrower_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "AlreadyRequested");

    // No second row was created, item still shows a single pending request
    assert_eq!(item_status(&client, &item_id).await, "requested");

    let response = client
        .get(format!("{}/items/{}/requests", BASE_URL, item_id))
        .header("Authorization", format!("Bearer {}", owner_token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
#[ignore]
async fn test_owner_cannot_request_own_item() {
    let client = Client::new();
    let (owner_token, _) = signup(&client, "selfish").await;
    let item_id = create_item(&client, &owner_token, "Ladder").await;

    let response = client
        .post(format!("{}/items/{}/requests", BASE_URL, item_id))
        .header("Authorization", format!("Bearer {}", owner_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "OwnItemRequest");
}

#[tokio::test]
#[ignore]
async fn test_cancel_sole_request_restores_availability() {
    let client = Client::new();
    let (owner_token, _) = signup(&client, "lender").await;
    let (borrower_token, _) = signup(&client, "hesitant").await;
    let item_id = create_item(&client, &owner_token, "Hedge trimmer").await;

    let response = client
        .post(format!("{}/items/{}/requests", BASE_URL, item_id))
        .header("Authorization", format!("Bearer {}", borrower_token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let request_id = body["id"].as_str().unwrap().to_string();

    assert_eq!(item_status(&client, &item_id).await, "requested");

    let response = client
        .delete(format!("{}/requests/{}", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", borrower_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    assert_eq!(item_status(&client, &item_id).await, "available");
}

#[tokio::test]
#[ignore]
async fn test_cancel_one_of_several_keeps_requested() {
    let client = Client::new();
    let (owner_token, _) = signup(&client, "lender").await;
    let (first_token, _) = signup(&client, "first").await;
    let (second_token, _) = signup(&client, "second").await;
    let item_id = create_item(&client, &owner_token, "Projector").await;

    let response = client
        .post(format!("{}/items/{}/requests", BASE_URL, item_id))
        .header("Authorization", format!("Bearer {}", first_token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let first_request = body["id"].as_str().unwrap().to_string();

    let response = client
        .post(format!("{}/items/{}/requests", BASE_URL, item_id))
        .header("Authorization", format!("Bearer {}", second_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let response = client
        .delete(format!("{}/requests/{}", BASE_URL, first_request))
        .header("Authorization", format!("Bearer {}", first_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    // The second pending request keeps the item requested
    assert_eq!(item_status(&client, &item_id).await, "requested");
}

#[tokio::test]
#[ignore]
async fn test_approve_rejected_while_checked_out() {
    let client = Client::new();
    let (owner_token, _) = signup(&client, "lender").await;
    let (first_token, _) = signup(&client, "lucky").await;
    let (second_token, _) = signup(&client, "late").await;
    let item_id = create_item(&client, &owner_token, "Generator").await;

    let response = client
        .post(format!("{}/items/{}/requests", BASE_URL, item_id))
        .header("Authorization", format!("Bearer {}", first_token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let first_request = body["id"].as_str().unwrap().to_string();

    let response = client
        .post(format!("{}/items/{}/requests", BASE_URL, item_id))
        .header("Authorization", format!("Bearer {}", second_token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let second_request = body["id"].as_str().unwrap().to_string();

    let response = client
        .post(format!("{}/requests/{}/approve", BASE_URL, first_request))
        .header("Authorization", format!("Bearer {}", owner_token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    // The second pending request cannot be approved while the first is out
    let response = client
        .post(format!("{}/requests/{}/approve", BASE_URL, second_request))
        .header("Authorization", format!("Bearer {}", owner_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "ItemCheckedOut");
}

#[tokio::test]
#[ignore]
async fn test_only_owner_can_approve() {
    let client = Client::new();
    let (owner_token, _) = signup(&client, "lender").await;
    let (borrower_token, _) = signup(&client, "sneaky").await;
    let item_id = create_item(&client, &owner_token, "Chainsaw").await;

    let response = client
        .post(format!("{}/items/{}/requests", BASE_URL, item_id))
        .header("Authorization", format!("Bearer {}", borrower_token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let request_id = body["id"].as_str().unwrap().to_string();

    // The requester cannot approve their own request
    let response = client
        .post(format!("{}/requests/{}/approve", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", borrower_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_delete_item_with_active_requests() {
    let client = Client::new();
    let (owner_token, _) = signup(&client, "lender").await;
    let (borrower_token, _) = signup(&client, "blocker").await;
    let item_id = create_item(&client, &owner_token, "Shop vac").await;

    let response = client
        .post(format!("{}/items/{}/requests", BASE_URL, item_id))
        .header("Authorization", format!("Bearer {}", borrower_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    // Refused while a pending request exists
    let response = client
        .delete(format!("{}/items/{}", BASE_URL, item_id))
        .header("Authorization", format!("Bearer {}", owner_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "ItemHasActiveRequests");

    // Forced deletion cascades
    let response = client
        .delete(format!("{}/items/{}?force=true", BASE_URL, item_id))
        .header("Authorization", format!("Bearer {}", owner_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    let response = client
        .get(format!("{}/items/{}", BASE_URL, item_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_user_stats_count_completed_checkouts() {
    let client = Client::new();
    let (owner_token, owner_id) = signup(&client, "prolific").await;
    let (borrower_token, borrower_id) = signup(&client, "frequent").await;
    let item_id = create_item(&client, &owner_token, "Belt sander").await;

    let response = client
        .post(format!("{}/items/{}/requests", BASE_URL, item_id))
        .header("Authorization", format!("Bearer {}", borrower_token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let request_id = body["id"].as_str().unwrap().to_string();

    let response = client
        .post(format!("{}/requests/{}/approve", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", owner_token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .get(format!("{}/users/{}/stats", BASE_URL, owner_id))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["lending_count"], 1);
    assert_eq!(body["borrowing_count"], 0);

    let response = client
        .get(format!("{}/users/{}/stats", BASE_URL, borrower_id))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["lending_count"], 0);
    assert_eq!(body["borrowing_count"], 1);
}

#[tokio::test]
#[ignore]
async fn test_unauthenticated_mutation_is_rejected() {
    let client = Client::new();

    let response = client
        .post(format!("{}/items", BASE_URL))
        .json(&json!({
            "name": "No auth",
            "category": "Other"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}
