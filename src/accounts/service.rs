//! Account service
//!
//! Each operation runs as an internal `Result<_, AccountError>` and is
//! converted into its structured result at the boundary, so store failures
//! end the request and never the process.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::accounts::{
    config::AccountConfig,
    core::{PasswordService, TokenService},
    errors::{AccountError, StoreError},
    storage::CredentialStore,
    types::*,
};

/// Account operations over an injected credential store
pub struct AccountService {
    store: Arc<dyn CredentialStore>,
    password_service: PasswordService,
    token_service: TokenService,
    config: AccountConfig,
}

impl std::fmt::Debug for AccountService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountService")
            .field("token_service", &self.token_service)
            .field("search_min_length", &self.config.search_min_length)
            .finish_non_exhaustive()
    }
}

impl AccountService {
    /// Create the service
    ///
    /// # Errors
    /// Returns `AccountError::InvalidInput` if the signing secret is rejected
    pub fn new(store: Arc<dyn CredentialStore>, config: AccountConfig) -> Result<Self, AccountError> {
        let token_service = TokenService::new(config.jwt_secret.clone(), config.token_expiry)?;
        let password_service = PasswordService::new(config.password.clone());

        Ok(Self {
            store,
            password_service,
            token_service,
            config,
        })
    }

    pub fn token_service(&self) -> &TokenService {
        &self.token_service
    }

    /// Register a new account
    pub async fn create_account(&self, input: CreateAccountInput) -> MutationResult {
        match self.try_create_account(input).await {
            Ok(()) => MutationResult::success(),
            Err(err) => MutationResult::failure(&report("createAccount", err)),
        }
    }

    /// Authenticate and issue a session token
    pub async fn login(&self, input: LoginInput) -> LoginResult {
        match self.try_login(input).await {
            Ok(token) => LoginResult::success(token),
            Err(err) => LoginResult::failure(&report("login", err)),
        }
    }

    /// Change the caller's name and/or password
    pub async fn edit_account(&self, caller_token: Option<&str>, input: EditAccountInput) -> MutationResult {
        match self.try_edit_account(caller_token, input).await {
            Ok(()) => MutationResult::success(),
            Err(err) => MutationResult::failure(&report("editAccount", err)),
        }
    }

    /// Case-insensitive name search
    pub async fn search_accounts(&self, input: SearchAccountsInput) -> SearchResult {
        match self.try_search_accounts(input).await {
            Ok(users) => SearchResult::success(users),
            Err(err) => SearchResult::failure(&report("searchAccounts", err)),
        }
    }

    /// Public record by id
    pub async fn find_account_by_id(&self, input: FindAccountByIdInput) -> FindUserResult {
        match self.try_find_account_by_id(input).await {
            Ok(user) => FindUserResult::success(user),
            Err(err) => FindUserResult::failure(&report("findAccountById", err)),
        }
    }

    /// Route a decoded operation to its handler
    pub async fn dispatch(&self, operation: AccountOperation, caller_token: Option<&str>) -> OperationOutcome {
        match operation {
            AccountOperation::CreateAccount(input) => {
                OperationOutcome::Mutation(self.create_account(input).await)
            }
            AccountOperation::Login(input) => OperationOutcome::Login(self.login(input).await),
            AccountOperation::EditAccount(input) => {
                OperationOutcome::Mutation(self.edit_account(caller_token, input).await)
            }
            AccountOperation::SearchAccounts(input) => {
                OperationOutcome::Search(self.search_accounts(input).await)
            }
            AccountOperation::FindAccountById(input) => {
                OperationOutcome::FindUser(self.find_account_by_id(input).await)
            }
        }
    }

    async fn try_create_account(&self, input: CreateAccountInput) -> Result<(), AccountError> {
        let email_filter = UserFilter::Email(input.email.clone());
        if self.store.find_one(&email_filter).await?.is_some() {
            return Err(AccountError::EmailTaken);
        }

        let password_hash = self.password_service.hash_password(&input.password)?;
        let new_user = NewUser {
            name: input.name,
            email: input.email,
            password_hash,
        };

        let affected = self.store.insert(&new_user).await.map_err(conflict_to_business)?;
        if affected != 1 {
            return Err(AccountError::CreationFailed);
        }

        info!("account created: email={}", new_user.email);
        Ok(())
    }

    async fn try_login(&self, input: LoginInput) -> Result<String, AccountError> {
        let users = self
            .store
            .find_many(&UserFilter::Email(input.email.clone()))
            .await?;
        let user = users.into_iter().next().ok_or(AccountError::EmailNotFound)?;

        if !self.password_service.verify_password(&input.password, &user.password_hash) {
            return Err(AccountError::PasswordIncorrect);
        }

        let token = self.token_service.generate_token(user.id, &user.email)?;
        info!("login succeeded: user_id={}", user.id);
        Ok(token)
    }

    async fn try_edit_account(
        &self,
        caller_token: Option<&str>,
        input: EditAccountInput,
    ) -> Result<(), AccountError> {
        let user_id = caller_token
            .ok_or(AccountError::Unauthorized)
            .and_then(|token| self.token_service.verify_token(token))
            .map_err(|_| AccountError::Unauthorized)?;

        let name = input.name.filter(|n| !n.is_empty());
        let password = input.password.filter(|p| !p.is_empty());

        // length is checked before any write so a rejected edit mutates nothing
        if let Some(password) = &password {
            self.password_service.validate_length(password)?;
        }

        if let Some(name) = name {
            // the caller's own current name is not exempt
            let holders = self.store.find_many(&UserFilter::Name(name.clone())).await?;
            if !holders.is_empty() {
                return Err(AccountError::DuplicateName);
            }

            let affected = self
                .store
                .update_by_id(user_id, &UserPatch::name(name))
                .await
                .map_err(conflict_to_business)?;
            if affected < 1 {
                return Err(AccountError::UpdateFailed);
            }
            info!("name updated: user_id={}", user_id);
        }

        if let Some(password) = password {
            let hash = self.password_service.hash_password(&password)?;
            let affected = self
                .store
                .update_by_id(user_id, &UserPatch::password_hash(hash))
                .await?;
            if affected < 1 {
                return Err(AccountError::UpdateFailed);
            }
            info!("password updated: user_id={}", user_id);
        }

        Ok(())
    }

    async fn try_search_accounts(&self, input: SearchAccountsInput) -> Result<Vec<User>, AccountError> {
        let min = self.config.search_min_length;
        if input.name.chars().count() < min {
            return Err(AccountError::QueryTooShort(min));
        }

        let records = self
            .store
            .find_many(&UserFilter::NameContains(input.name))
            .await?;
        Ok(records.into_iter().map(User::from).collect())
    }

    async fn try_find_account_by_id(&self, input: FindAccountByIdInput) -> Result<User, AccountError> {
        self.store
            .get_by_id(input.id)
            .await?
            .map(User::from)
            .ok_or(AccountError::NotFound(input.id))
    }
}

/// A lost check-then-act race surfaces as a storage conflict
fn conflict_to_business(err: StoreError) -> AccountError {
    match err {
        StoreError::Conflict("email") => AccountError::EmailTaken,
        StoreError::Conflict("name") => AccountError::DuplicateName,
        other => AccountError::Store(other),
    }
}

fn report(operation: &str, err: AccountError) -> AccountError {
    if err.is_internal() {
        error!("{} aborted: {:?}", operation, err);
    } else {
        warn!("{} rejected: {}", operation, err.error_code());
    }
    err
}
