//! HTTP dispatcher layer

pub mod handlers;
pub mod routes;

pub use routes::create_account_routes;
