//! Storage abstraction layer
//!
//! `CredentialStore` is the only seam the account service talks to; the
//! SQLite backend is used in production, the memory backend in tests.

pub mod r#trait;
pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use r#trait::CredentialStore;
pub use sqlite::SqliteStore;
