//! Account type definitions

use serde::{Deserialize, Serialize};

use crate::accounts::errors::AccountError;

/// Stored user record, including the password hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Store-assigned identifier
    pub id: i64,
    /// Display name, unique
    pub name: String,
    /// Login email, unique and immutable
    pub email: String,
    /// bcrypt digest
    pub password_hash: String,
}

/// Outward-facing user. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            email: record.email,
        }
    }
}

/// Record to insert; the store assigns the id
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Partial update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub password_hash: Option<String>,
}

impl UserPatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn password_hash(hash: impl Into<String>) -> Self {
        Self {
            password_hash: Some(hash.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.password_hash.is_none()
    }
}

/// Lookup filter understood by every credential store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserFilter {
    /// Exact email match
    Email(String),
    /// Exact name match
    Name(String),
    /// Case-insensitive substring match on name, with Unicode case folding
    NameContains(String),
}

impl UserFilter {
    /// Whether `record` satisfies this filter
    pub fn matches(&self, record: &UserRecord) -> bool {
        match self {
            Self::Email(email) => record.email == *email,
            Self::Name(name) => record.name == *name,
            Self::NameContains(pattern) => record
                .name
                .to_lowercase()
                .contains(&pattern.to_lowercase()),
        }
    }
}

// ========== Dispatcher inputs ==========

/// CreateAccount arguments
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAccountInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login arguments
#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// EditAccount arguments. The caller token travels out-of-band.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditAccountInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// SearchAccounts arguments
#[derive(Debug, Clone, Deserialize)]
pub struct SearchAccountsInput {
    pub name: String,
}

/// FindAccountById arguments
#[derive(Debug, Clone, Deserialize)]
pub struct FindAccountByIdInput {
    pub id: i64,
}

/// A named operation with its typed arguments
///
/// ```json
/// { "operation": "login", "arguments": { "email": "a@x.com", "password": "secret123" } }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "operation", content = "arguments", rename_all = "camelCase")]
pub enum AccountOperation {
    CreateAccount(CreateAccountInput),
    Login(LoginInput),
    EditAccount(EditAccountInput),
    SearchAccounts(SearchAccountsInput),
    FindAccountById(FindAccountByIdInput),
}

impl AccountOperation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateAccount(_) => "createAccount",
            Self::Login(_) => "login",
            Self::EditAccount(_) => "editAccount",
            Self::SearchAccounts(_) => "searchAccounts",
            Self::FindAccountById(_) => "findAccountById",
        }
    }
}

// ========== Operation results ==========

/// Result of CreateAccount and EditAccount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationResult {
    pub ok: bool,
    pub error: Option<String>,
}

impl MutationResult {
    pub fn success() -> Self {
        Self { ok: true, error: None }
    }

    pub fn failure(err: &AccountError) -> Self {
        Self {
            ok: false,
            error: Some(err.to_string()),
        }
    }
}

/// Result of Login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResult {
    pub ok: bool,
    pub error: Option<String>,
    pub token: Option<String>,
}

impl LoginResult {
    pub fn success(token: String) -> Self {
        Self {
            ok: true,
            error: None,
            token: Some(token),
        }
    }

    pub fn failure(err: &AccountError) -> Self {
        Self {
            ok: false,
            error: Some(err.to_string()),
            token: None,
        }
    }
}

/// Result of SearchAccounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub ok: bool,
    pub error: Option<String>,
    pub users: Vec<User>,
}

impl SearchResult {
    pub fn success(users: Vec<User>) -> Self {
        Self {
            ok: true,
            error: None,
            users,
        }
    }

    pub fn failure(err: &AccountError) -> Self {
        Self {
            ok: false,
            error: Some(err.to_string()),
            users: Vec::new(),
        }
    }
}

/// Result of FindAccountById
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindUserResult {
    pub ok: bool,
    pub error: Option<String>,
    pub user: Option<User>,
}

impl FindUserResult {
    pub fn success(user: User) -> Self {
        Self {
            ok: true,
            error: None,
            user: Some(user),
        }
    }

    pub fn failure(err: &AccountError) -> Self {
        Self {
            ok: false,
            error: Some(err.to_string()),
            user: None,
        }
    }
}

/// Result of a dispatched operation, serialized as the inner result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OperationOutcome {
    Mutation(MutationResult),
    Login(LoginResult),
    Search(SearchResult),
    FindUser(FindUserResult),
}

impl OperationOutcome {
    pub fn is_ok(&self) -> bool {
        match self {
            Self::Mutation(r) => r.ok,
            Self::Login(r) => r.ok,
            Self::Search(r) => r.ok,
            Self::FindUser(r) => r.ok,
        }
    }
}
