//! In-memory store (development and tests)

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use super::r#trait::CredentialStore;
use crate::accounts::{
    errors::StoreError,
    types::{NewUser, UserFilter, UserPatch, UserRecord},
};

#[derive(Debug, Default)]
struct Inner {
    /// id -> record
    users: BTreeMap<i64, UserRecord>,
    next_id: i64,
}

impl Inner {
    fn conflict_for(&self, email: Option<&str>, name: Option<&str>, skip: Option<i64>) -> Option<StoreError> {
        let others = self.users.values().filter(|u| Some(u.id) != skip);
        for user in others {
            if email == Some(user.email.as_str()) {
                return Some(StoreError::Conflict("email"));
            }
            if name == Some(user.name.as_str()) {
                return Some(StoreError::Conflict("name"));
            }
        }
        None
    }
}

/// In-memory credential store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.inner.read().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_one(&self, filter: &UserFilter) -> Result<Option<UserRecord>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| filter.matches(u)).cloned())
    }

    async fn find_many(&self, filter: &UserFilter) -> Result<Vec<UserRecord>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .filter(|u| filter.matches(u))
            .cloned()
            .collect())
    }

    async fn insert(&self, user: &NewUser) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().await;

        if let Some(conflict) = inner.conflict_for(Some(&user.email), Some(&user.name), None) {
            return Err(conflict);
        }

        inner.next_id += 1;
        let id = inner.next_id;
        inner.users.insert(
            id,
            UserRecord {
                id,
                name: user.name.clone(),
                email: user.email.clone(),
                password_hash: user.password_hash.clone(),
            },
        );

        info!("user saved to memory store: id={}", id);
        Ok(1)
    }

    async fn update_by_id(&self, id: i64, patch: &UserPatch) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().await;

        if !inner.users.contains_key(&id) || patch.is_empty() {
            return Ok(0);
        }
        if let Some(conflict) = inner.conflict_for(None, patch.name.as_deref(), Some(id)) {
            return Err(conflict);
        }

        let Some(user) = inner.users.get_mut(&id) else {
            return Ok(0);
        };
        if let Some(name) = &patch.name {
            user.name = name.clone();
        }
        if let Some(hash) = &patch.password_hash {
            user.password_hash = hash.clone();
        }
        Ok(1)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }
}
