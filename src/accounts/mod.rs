//! User account module
//!
//! ```text
//! accounts/
//! ├── types.rs          # records, inputs, results
//! ├── errors.rs         # AccountError / StoreError
//! ├── config.rs         # configuration
//! ├── service.rs        # AccountService (operations)
//! ├── core/             # credential primitives
//! │   ├── password_service.rs
//! │   └── token_service.rs
//! ├── storage/          # CredentialStore trait and backends
//! │   ├── trait.rs
//! │   ├── memory.rs
//! │   └── sqlite.rs
//! └── api/              # axum dispatcher
//!     ├── routes.rs
//!     └── handlers.rs
//! ```
//!
//! Layering: API → service → storage. The store is injected into the
//! service as `Arc<dyn CredentialStore>`.

pub mod api;
pub mod config;
pub mod core;
pub mod errors;
pub mod service;
pub mod storage;
pub mod types;

pub use api::create_account_routes;
pub use config::{AccountConfig, AppConfig, PasswordConfig, ServerConfig};
pub use errors::{AccountError, StoreError};
pub use service::AccountService;
pub use storage::{CredentialStore, MemoryStore, SqliteStore};
pub use types::{User, UserRecord};
