//! Storage trait definition

use async_trait::async_trait;

use crate::accounts::{
    errors::StoreError,
    types::{NewUser, UserFilter, UserPatch, UserRecord},
};

/// Persistence over user records
///
/// Backends must enforce uniqueness of `email` and `name` atomically and
/// report a violation as [`StoreError::Conflict`].
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// First record matching `filter`
    async fn find_one(&self, filter: &UserFilter) -> Result<Option<UserRecord>, StoreError>;

    /// All records matching `filter`, ordered by id
    async fn find_many(&self, filter: &UserFilter) -> Result<Vec<UserRecord>, StoreError>;

    /// Insert a record, returning the affected row count
    async fn insert(&self, user: &NewUser) -> Result<u64, StoreError>;

    /// Apply `patch` to the record with `id`, returning the affected row count
    async fn update_by_id(&self, id: i64, patch: &UserPatch) -> Result<u64, StoreError>;

    /// Record by identifier
    async fn get_by_id(&self, id: i64) -> Result<Option<UserRecord>, StoreError>;
}
