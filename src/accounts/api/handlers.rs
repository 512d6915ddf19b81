//! API request handlers (thin)
//!
//! Arguments are decoded into typed inputs by axum extractors; a body that
//! fails to decode is rejected by the extractor before the service runs.

use axum::{
    extract::{Json, Path, Query, State},
    http::HeaderMap,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use crate::accounts::{types::*, AccountService};

/// CreateAccount handler
pub async fn create_account(
    State(service): State<Arc<AccountService>>,
    Json(input): Json<CreateAccountInput>,
) -> Json<MutationResult> {
    info!("API: createAccount request: email={}", input.email);
    Json(service.create_account(input).await)
}

/// Login handler
pub async fn login(
    State(service): State<Arc<AccountService>>,
    Json(input): Json<LoginInput>,
) -> Json<LoginResult> {
    info!("API: login request: email={}", input.email);
    Json(service.login(input).await)
}

/// EditAccount handler; the caller token comes from the Authorization header
pub async fn edit_account(
    State(service): State<Arc<AccountService>>,
    headers: HeaderMap,
    Json(input): Json<EditAccountInput>,
) -> Json<MutationResult> {
    info!("API: editAccount request");
    let token = extract_token_from_headers(&headers);
    Json(service.edit_account(token.as_deref(), input).await)
}

/// SearchAccounts handler
pub async fn search_accounts(
    State(service): State<Arc<AccountService>>,
    Query(input): Query<SearchAccountsInput>,
) -> Json<SearchResult> {
    info!("API: searchAccounts request");
    Json(service.search_accounts(input).await)
}

/// FindAccountById handler
pub async fn find_account_by_id(
    State(service): State<Arc<AccountService>>,
    Path(id): Path<i64>,
) -> Json<FindUserResult> {
    info!("API: findAccountById request: id={}", id);
    Json(service.find_account_by_id(FindAccountByIdInput { id }).await)
}

/// Single-endpoint dispatcher: `{"operation": ..., "arguments": {...}}`
pub async fn dispatch(
    State(service): State<Arc<AccountService>>,
    headers: HeaderMap,
    Json(operation): Json<AccountOperation>,
) -> Json<OperationOutcome> {
    info!("API: dispatch {}", operation.name());
    let token = extract_token_from_headers(&headers);
    Json(service.dispatch(operation, token.as_deref()).await)
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

// ========== Helpers ==========

/// Bearer token from the Authorization header, if any
fn extract_token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_token() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_str("Bearer abc.def.ghi").unwrap());

        assert_eq!(extract_token_from_headers(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_extract_token_missing() {
        let headers = HeaderMap::new();
        assert!(extract_token_from_headers(&headers).is_none());

        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert!(extract_token_from_headers(&headers).is_none());

        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Bearer "));
        assert!(extract_token_from_headers(&headers).is_none());
    }
}
