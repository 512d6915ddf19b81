//! API route definitions

use axum::{
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use crate::accounts::AccountService;

/// Account routes
pub fn create_account_routes(service: Arc<AccountService>) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/accounts", post(handlers::create_account))
        .route("/api/accounts/login", post(handlers::login))
        .route("/api/accounts/me", patch(handlers::edit_account))
        .route("/api/accounts/search", get(handlers::search_accounts))
        .route("/api/accounts/:id", get(handlers::find_account_by_id))
        .route("/api/operations", post(handlers::dispatch))
        .with_state(service)
}
