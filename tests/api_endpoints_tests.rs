//! HTTP dispatcher tests
//!
//! Business failures are HTTP 200 with `ok: false`; only bodies that fail
//! to decode are rejected at the transport level.

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use user_accounts::accounts::{AccountConfig, AccountService, MemoryStore, PasswordConfig};
use user_accounts::server::AccountServer;

// ============================================================================
// Helpers
// ============================================================================

fn create_test_server() -> TestServer {
    let config = AccountConfig {
        jwt_secret: "kX9#mQ2$vL7@pR4!wT6^zN8&bH3*jF5%".to_string(),
        password: PasswordConfig {
            min_length: 3,
            bcrypt_cost: 4,
        },
        ..AccountConfig::default()
    };
    let service = AccountService::new(Arc::new(MemoryStore::new()), config).unwrap();
    let server = AccountServer::new(Arc::new(service), "127.0.0.1".to_string(), 0);

    TestServer::new(server.create_router()).unwrap()
}

async fn register(server: &TestServer, name: &str, email: &str, password: &str) -> Value {
    server
        .post("/api/accounts")
        .json(&json!({ "name": name, "email": email, "password": password }))
        .await
        .json()
}

async fn login_token(server: &TestServer, email: &str, password: &str) -> String {
    let body: Value = server
        .post("/api/accounts/login")
        .json(&json!({ "email": email, "password": password }))
        .await
        .json();
    assert_eq!(body["ok"], true, "login failed: {}", body);
    body["token"].as_str().unwrap().to_string()
}

// ============================================================================
// Routes
// ============================================================================

#[tokio::test]
async fn test_health() {
    let server = create_test_server();

    let response = server.get("/api/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["status"], "ok");
}

#[tokio::test]
async fn test_create_account_and_duplicate() {
    let server = create_test_server();

    let body = register(&server, "Alice", "a@x.com", "secret123").await;
    assert_eq!(body, json!({ "ok": true, "error": null }));

    let response = server
        .post("/api/accounts")
        .json(&json!({ "name": "Bob", "email": "a@x.com", "password": "other" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>(),
        json!({ "ok": false, "error": "email has already taken" })
    );
}

#[tokio::test]
async fn test_login_success_and_failure() {
    let server = create_test_server();
    register(&server, "Alice", "a@x.com", "secret123").await;

    let token = login_token(&server, "a@x.com", "secret123").await;
    assert!(!token.is_empty());

    let response = server
        .post("/api/accounts/login")
        .json(&json!({ "email": "a@x.com", "password": "wrong" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"], "password is not correct");
    assert_eq!(body["token"], Value::Null);
}

#[tokio::test]
async fn test_edit_uses_authorization_header() {
    let server = create_test_server();
    register(&server, "Alice", "a@x.com", "secret123").await;
    let token = login_token(&server, "a@x.com", "secret123").await;

    let unauthorized: Value = server
        .patch("/api/accounts/me")
        .json(&json!({ "name": "Alicia" }))
        .await
        .json();
    assert_eq!(unauthorized["error"], "unauthorized");

    let body: Value = server
        .patch("/api/accounts/me")
        .add_header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "name": "Alicia" }))
        .await
        .json();
    assert_eq!(body["ok"], true);

    let short: Value = server
        .patch("/api/accounts/me")
        .add_header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "password": "ab" }))
        .await
        .json();
    assert_eq!(short["error"], "password should be at least 3 characters");
}

#[tokio::test]
async fn test_search_and_find_never_expose_passwords() {
    let server = create_test_server();
    register(&server, "Alice", "a@x.com", "secret123").await;
    register(&server, "Malice", "m@x.com", "secret123").await;

    let response = server.get("/api/accounts/search?name=ALI").await;
    let text = response.text();
    assert!(!text.contains("password"));
    let body: Value = response.json();
    assert_eq!(body["ok"], true);
    assert_eq!(body["users"].as_array().unwrap().len(), 2);

    let short: Value = server.get("/api/accounts/search?name=al").await.json();
    assert_eq!(short["ok"], false);
    assert_eq!(short["users"], json!([]));

    let response = server.get("/api/accounts/1").await;
    assert!(!response.text().contains("password"));
    let body: Value = response.json();
    assert_eq!(body["user"], json!({ "id": 1, "name": "Alice", "email": "a@x.com" }));

    let missing: Value = server.get("/api/accounts/999").await.json();
    assert_eq!(missing["ok"], false);
    assert_eq!(missing["error"], "could not find this user id 999");
    assert_eq!(missing["user"], Value::Null);
}

#[tokio::test]
async fn test_operations_endpoint() {
    let server = create_test_server();

    let created: Value = server
        .post("/api/operations")
        .json(&json!({
            "operation": "createAccount",
            "arguments": { "name": "Alice", "email": "a@x.com", "password": "secret123" }
        }))
        .await
        .json();
    assert_eq!(created["ok"], true);

    let logged_in: Value = server
        .post("/api/operations")
        .json(&json!({
            "operation": "login",
            "arguments": { "email": "a@x.com", "password": "secret123" }
        }))
        .await
        .json();
    let token = logged_in["token"].as_str().unwrap().to_string();

    let edited: Value = server
        .post("/api/operations")
        .add_header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "operation": "editAccount", "arguments": { "name": "Alicia" } }))
        .await
        .json();
    assert_eq!(edited["ok"], true);

    let found: Value = server
        .post("/api/operations")
        .json(&json!({ "operation": "findAccountById", "arguments": { "id": 1 } }))
        .await
        .json();
    assert_eq!(found["user"]["name"], "Alicia");

    let searched: Value = server
        .post("/api/operations")
        .json(&json!({ "operation": "searchAccounts", "arguments": { "name": "lic" } }))
        .await
        .json();
    assert_eq!(searched["users"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_untyped_arguments_are_rejected_before_the_service() {
    let server = create_test_server();

    let response = server
        .post("/api/operations")
        .json(&json!({ "operation": "findAccountById", "arguments": { "id": "one" } }))
        .await;
    assert!(response.status_code().is_client_error());

    let response = server
        .post("/api/operations")
        .json(&json!({ "operation": "dropTables", "arguments": {} }))
        .await;
    assert!(response.status_code().is_client_error());

    let response = server
        .post("/api/accounts")
        .json(&json!({ "name": "Alice", "email": "a@x.com" }))
        .await;
    assert!(response.status_code().is_client_error());

    let response = server.get("/api/accounts/not-a-number").await;
    assert!(response.status_code().is_client_error());
}
