//! API integration tests
//!
//! Run against a live server with a fresh database:
//! `cargo test -- --ignored`

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Unique suffix so repeated runs do not collide on unique columns
fn unique(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}-{}", prefix, nanos)
}

/// Authenticate as the bootstrap administrator
async fn get_admin_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "admin@alexandria-books.org",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Sign up a fresh customer and return (token, user_id, email)
async fn signup_customer(client: &Client) -> (String, i64, String) {
    let email = format!("{}@example.org", unique("customer"));

    let response = client
        .post(format!("{}/users", BASE_URL))
        .json(&json!({
            "name": "Test Customer",
            "email": email,
            "password": "secret-password"
        }))
        .send()
        .await
        .expect("Failed to send signup request");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse signup response");
    let user_id = body["id"].as_i64().expect("No user ID");

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": "secret-password" }))
        .send()
        .await
        .expect("Failed to send login request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse login response");
    let token = body["token"].as_str().expect("No token").to_string();

    (token, user_id, email)
}

/// Create an author + category + book as admin, return the book id
async fn create_book(client: &Client, token: &str) -> i64 {
    let response = client
        .post(format!("{}/authors", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "name": "Herman Melville" }))
        .send()
        .await
        .expect("Failed to create author");
    assert_eq!(response.status(), 201);
    let author: Value = response.json().await.unwrap();

    let response = client
        .post(format!("{}/categories", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "name": unique("novel") }))
        .send()
        .await
        .expect("Failed to create category");
    assert_eq!(response.status(), 201);
    let category: Value = response.json().await.unwrap();

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": "Moby-Dick",
            "description": "A whale of a tale",
            "price": "19.90",
            "category_id": category["id"],
            "author_ids": [author["id"]]
        }))
        .send()
        .await
        .expect("Failed to create book");
    assert_eq!(response.status(), 201);
    let book: Value = response.json().await.unwrap();
    book["id"].as_i64().expect("No book ID")
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
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "admin@alexandria-books.org",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_author_crud_roundtrip() {
    let client = Client::new();
    let token = get_admin_token(&client).await;

    // Create
    let response = client
        .post(format!("{}/authors", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "name": "Ursula K. Le Guin" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let created: Value = response.json().await.unwrap();
    let id = created["id"].as_i64().expect("No author ID");

    // Read
    let response = client
        .get(format!("{}/authors/{}", BASE_URL, id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let fetched: Value = response.json().await.unwrap();
    assert_eq!(fetched["name"], "Ursula K. Le Guin");

    // Update
    let response = client
        .put(format!("{}/authors/{}", BASE_URL, id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "name": "U. K. Le Guin" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["name"], "U. K. Le Guin");

    // Not found
    let response = client
        .get(format!("{}/authors/999999", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_author_name_validation() {
    let client = Client::new();
    let token = get_admin_token(&client).await;

    let response = client
        .post(format!("{}/authors", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "name": "" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 422);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_category_rejected() {
    let client = Client::new();
    let token = get_admin_token(&client).await;
    let name = unique("scifi");

    let response = client
        .post(format!("{}/categories", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "name": name }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    // Same name, different case
    let response = client
        .post(format!("{}/categories", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "name": name.to_uppercase() }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 422);
}

#[tokio::test]
#[ignore]
async fn test_book_with_unknown_category_rejected() {
    let client = Client::new();
    let token = get_admin_token(&client).await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": "Orphan Book",
            "price": "10.00",
            "category_id": 999999,
            "author_ids": [1]
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_list_books_pagination() {
    let client = Client::new();
    let token = get_admin_token(&client).await;

    let response = client
        .get(format!("{}/books?page=1&per_page=5&sort=-price", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["items"].is_array());
    assert!(body["total"].is_number());
    assert!(body["items"].as_array().unwrap().len() <= 5);
}

#[tokio::test]
#[ignore]
async fn test_customer_cannot_create_authors() {
    let client = Client::new();
    let (token, _, _) = signup_customer(&client).await;

    let response = client
        .post(format!("{}/authors", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "name": "Forbidden Author" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_employee_creation_requires_admin() {
    let client = Client::new();

    let response = client
        .post(format!("{}/users", BASE_URL))
        .json(&json!({
            "name": "Sneaky Clerk",
            "email": format!("{}@example.org", unique("clerk")),
            "password": "secret-password",
            "user_type": "employee"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_order_lifecycle() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let book_id = create_book(&client, &admin_token).await;
    let (customer_token, customer_id, _) = signup_customer(&client).await;

    // Reserve
    let response = client
        .post(format!("{}/orders", BASE_URL))
        .header("Authorization", format!("Bearer {}", customer_token))
        .json(&json!({
            "items": [{ "book_id": book_id, "quantity": 2 }]
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let order: Value = response.json().await.unwrap();
    let order_id = order["id"].as_i64().expect("No order ID");
    assert_eq!(order["current_status"], "RESERVED");
    assert_eq!(order["customer_id"].as_i64().unwrap(), customer_id);
    assert_eq!(order["total"], "39.80");
    assert_eq!(order["history"].as_array().unwrap().len(), 1);

    // Cancel
    let response = client
        .put(format!("{}/orders/{}/status", BASE_URL, order_id))
        .header("Authorization", format!("Bearer {}", customer_token))
        .json(&json!({ "status": "CANCELLED" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let cancelled: Value = response.json().await.unwrap();
    assert_eq!(cancelled["current_status"], "CANCELLED");
    assert_eq!(cancelled["history"].as_array().unwrap().len(), 2);

    // A cancelled order may not transition again
    let response = client
        .put(format!("{}/orders/{}/status", BASE_URL, order_id))
        .header("Authorization", format!("Bearer {}", customer_token))
        .json(&json!({ "status": "DELIVERED" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 422);
}

#[tokio::test]
#[ignore]
async fn test_customer_cannot_deliver_own_order() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let book_id = create_book(&client, &admin_token).await;
    let (customer_token, _, _) = signup_customer(&client).await;

    let response = client
        .post(format!("{}/orders", BASE_URL))
        .header("Authorization", format!("Bearer {}", customer_token))
        .json(&json!({ "items": [{ "book_id": book_id, "quantity": 1 }] }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let order: Value = response.json().await.unwrap();

    let response = client
        .put(format!("{}/orders/{}/status", BASE_URL, order["id"]))
        .header("Authorization", format!("Bearer {}", customer_token))
        .json(&json!({ "status": "DELIVERED" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_customer_sees_only_own_orders() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let book_id = create_book(&client, &admin_token).await;

    let (token_a, id_a, _) = signup_customer(&client).await;
    let (token_b, _, _) = signup_customer(&client).await;

    let response = client
        .post(format!("{}/orders", BASE_URL))
        .header("Authorization", format!("Bearer {}", token_a))
        .json(&json!({ "items": [{ "book_id": book_id, "quantity": 1 }] }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let order: Value = response.json().await.unwrap();

    // Customer B cannot see A's order
    let response = client
        .get(format!("{}/orders/{}", BASE_URL, order["id"]))
        .header("Authorization", format!("Bearer {}", token_b))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);

    // B's listing never contains A's orders
    let response = client
        .get(format!("{}/orders", BASE_URL))
        .header("Authorization", format!("Bearer {}", token_b))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    for item in body["items"].as_array().unwrap() {
        assert_ne!(item["customer_id"].as_i64().unwrap(), id_a);
    }
}

#[tokio::test]
#[ignore]
async fn test_audit_log_requires_admin() {
    let client = Client::new();
    let (customer_token, _, _) = signup_customer(&client).await;

    let response = client
        .get(format!("{}/audits", BASE_URL))
        .header("Authorization", format!("Bearer {}", customer_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    let admin_token = get_admin_token(&client).await;
    let response = client
        .get(format!("{}/audits", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.unwrap();
    assert!(body["items"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_manual_expiration_pass() {
    let client = Client::new();
    let (customer_token, _, _) = signup_customer(&client).await;

    // Customers may not trigger the pass
    let response = client
        .post(format!("{}/orders/expire-stale", BASE_URL))
        .header("Authorization", format!("Bearer {}", customer_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    let admin_token = get_admin_token(&client).await;
    let response = client
        .post(format!("{}/orders/expire-stale", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.unwrap();
    assert!(body["expired"].as_u64().is_some());
}
