//! SQLite store
//!
//! Uniqueness of `email` and `name` is enforced by `UNIQUE` constraints, so
//! concurrent inserts cannot both pass the service-level existence checks.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
    SqlitePool,
};
use tracing::info;

use super::r#trait::CredentialStore;
use crate::accounts::{
    errors::StoreError,
    types::{NewUser, UserFilter, UserPatch, UserRecord},
};

type UserRow = (i64, String, String, String);

const SELECT_USER: &str = "SELECT id, name, email, password_hash FROM users";

/// sqlx-backed credential store
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect and run migrations
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        info!("Initializing user database: {}", database_url);

        let connect_options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        // every connection to :memory: opens a separate database
        let in_memory = database_url.contains(":memory:");
        let mut pool_options = SqlitePoolOptions::new();
        pool_options = if in_memory {
            pool_options
                .max_connections(1)
                .idle_timeout(None::<std::time::Duration>)
                .max_lifetime(None::<std::time::Duration>)
        } else {
            pool_options.max_connections(max_connections.max(1))
        };

        let pool = pool_options.connect_with(connect_options).await?;
        Self::from_pool(pool).await
    }

    /// Wrap an existing pool and run migrations
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::query(include_str!("../../../migrations/users/001_create_users_table.sql"))
            .execute(&pool)
            .await?;

        info!("User database initialization complete");
        Ok(Self { pool })
    }
}

fn into_record(row: UserRow) -> UserRecord {
    UserRecord {
        id: row.0,
        name: row.1,
        email: row.2,
        password_hash: row.3,
    }
}

/// Exact-match filters that SQLite can evaluate itself
fn exact_query(filter: &UserFilter) -> Option<(String, &str)> {
    match filter {
        UserFilter::Email(email) => Some((format!("{} WHERE email = ?", SELECT_USER), email.as_str())),
        UserFilter::Name(name) => Some((format!("{} WHERE name = ?", SELECT_USER), name.as_str())),
        // SQLite's lower() folds ASCII only, so substring matching uses
        // UserFilter::matches like every other backend
        UserFilter::NameContains(_) => None,
    }
}

impl SqliteStore {
    async fn fetch_matching(&self, filter: &UserFilter) -> Result<Vec<UserRecord>, StoreError> {
        let rows = match exact_query(filter) {
            Some((sql, arg)) => {
                sqlx::query_as::<_, UserRow>(&format!("{} ORDER BY id", sql))
                    .bind(arg)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_as::<_, UserRow>(&format!("{} ORDER BY id", SELECT_USER))
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(rows
            .into_iter()
            .map(into_record)
            .filter(|record| filter.matches(record))
            .collect())
    }
}

#[async_trait]
impl CredentialStore for SqliteStore {
    async fn find_one(&self, filter: &UserFilter) -> Result<Option<UserRecord>, StoreError> {
        if let Some((sql, arg)) = exact_query(filter) {
            let row = sqlx::query_as::<_, UserRow>(&format!("{} ORDER BY id LIMIT 1", sql))
                .bind(arg)
                .fetch_optional(&self.pool)
                .await?;
            return Ok(row.map(into_record));
        }
        Ok(self.fetch_matching(filter).await?.into_iter().next())
    }

    async fn find_many(&self, filter: &UserFilter) -> Result<Vec<UserRecord>, StoreError> {
        self.fetch_matching(filter).await
    }

    async fn insert(&self, user: &NewUser) -> Result<u64, StoreError> {
        let result = sqlx::query("INSERT INTO users (name, email, password_hash) VALUES (?, ?, ?)")
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .execute(&self.pool)
            .await?;

        info!("User inserted: id={}", result.last_insert_rowid());
        Ok(result.rows_affected())
    }

    async fn update_by_id(&self, id: i64, patch: &UserPatch) -> Result<u64, StoreError> {
        if patch.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            "UPDATE users SET name = COALESCE(?, name), password_hash = COALESCE(?, password_hash), \
             updated_at = datetime('now') WHERE id = ?",
        )
        .bind(patch.name.as_deref())
        .bind(patch.password_hash.as_deref())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{} WHERE id = ?", SELECT_USER))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(into_record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_store() -> SqliteStore {
        SqliteStore::connect("sqlite::memory:", 5).await.unwrap()
    }

    fn new_user(name: &str, email: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash: "hashed_password".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let store = memory_store().await;

        assert_eq!(store.insert(&new_user("Alice", "a@x.com")).await.unwrap(), 1);
        let found = store
            .find_one(&UserFilter::Email("a@x.com".to_string()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.name, "Alice");
        assert_eq!(found.password_hash, "hashed_password");

        let by_id = store.get_by_id(found.id).await.unwrap().unwrap();
        assert_eq!(by_id, found);
        assert!(store.get_by_id(found.id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unique_constraints() {
        let store = memory_store().await;
        store.insert(&new_user("Alice", "a@x.com")).await.unwrap();

        assert_eq!(
            store.insert(&new_user("Other", "a@x.com")).await,
            Err(StoreError::Conflict("email"))
        );
        assert_eq!(
            store.insert(&new_user("Alice", "c@x.com")).await,
            Err(StoreError::Conflict("name"))
        );
    }

    #[tokio::test]
    async fn test_update_by_id() {
        let store = memory_store().await;
        store.insert(&new_user("Alice", "a@x.com")).await.unwrap();
        let id = store
            .find_one(&UserFilter::Name("Alice".to_string()))
            .await
            .unwrap()
            .unwrap()
            .id;

        assert_eq!(store.update_by_id(id, &UserPatch::password_hash("new_hash")).await.unwrap(), 1);
        let user = store.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(user.password_hash, "new_hash");
        assert_eq!(user.name, "Alice");

        assert_eq!(store.update_by_id(id + 1, &UserPatch::name("Ghost")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_timestamps_are_utc() {
        let store = memory_store().await;
        store.insert(&new_user("Alice", "a@x.com")).await.unwrap();

        let (created_at,): (String,) = sqlx::query_as("SELECT created_at FROM users WHERE id = 1")
            .fetch_one(&store.pool)
            .await
            .unwrap();
        let created_at = chrono::NaiveDateTime::parse_from_str(&created_at, "%Y-%m-%d %H:%M:%S")
            .unwrap()
            .and_utc();
        let skew = (chrono::Utc::now() - created_at).num_seconds().abs();
        assert!(skew < 60, "created_at is {}s away from now", skew);
    }

    #[tokio::test]
    async fn test_name_search_is_unicode_case_insensitive() {
        let store = memory_store().await;
        store.insert(&new_user("Äli", "a@x.com")).await.unwrap();
        store.insert(&new_user("BOB", "b@x.com")).await.unwrap();

        let found = store
            .find_many(&UserFilter::NameContains("äLI".to_string()))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Äli");

        let first = store
            .find_one(&UserFilter::NameContains("ob".to_string()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.name, "BOB");
    }

    #[tokio::test]
    async fn test_name_search_treats_wildcards_literally() {
        let store = memory_store().await;
        store.insert(&new_user("Alice", "a@x.com")).await.unwrap();
        store.insert(&new_user("MALICE", "m@x.com")).await.unwrap();
        store.insert(&new_user("Bob_100%", "b@x.com")).await.unwrap();

        let found = store
            .find_many(&UserFilter::NameContains("LIC".to_string()))
            .await
            .unwrap();
        assert_eq!(found.len(), 2);

        let found = store
            .find_many(&UserFilter::NameContains("_100%".to_string()))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Bob_100%");

        let found = store
            .find_many(&UserFilter::NameContains("%%%".to_string()))
            .await
            .unwrap();
        assert!(found.is_empty());
    }
}
