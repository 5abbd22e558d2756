//! Registration and login.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use taskflow_core::{DomainError, DomainResult, UserId};

use crate::password::PasswordHasher;
use crate::token::TokenService;
use crate::user::{User, UserStore, normalize_email, validate_registration};

/// Verified against when the email is unknown, so both login failure paths
/// cost one Argon2 verification.
const DECOY_PASSWORD: &str = "taskflow-decoy-password";

pub struct AccountService {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    tokens: Arc<TokenService>,
    decoy_hash: String,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserStore>,
        hasher: PasswordHasher,
        tokens: Arc<TokenService>,
    ) -> DomainResult<Self> {
        let decoy_hash = hasher.hash(DECOY_PASSWORD)?;
        Ok(Self {
            users,
            hasher,
            tokens,
            decoy_hash,
        })
    }

    /// Create an account. Does not log the user in.
    #[instrument(skip_all)]
    pub async fn register(&self, email: &str, password: &str) -> DomainResult<UserId> {
        let email = validate_registration(email, password)?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(DomainError::conflict("email already registered"));
        }

        let password_hash = self.hash(password.to_string()).await?;
        let user = User {
            id: UserId::new(),
            email,
            password_hash,
        };

        // The store's uniqueness check covers a concurrent registration that
        // slipped past the lookup above.
        self.users.insert(&user).await?;

        info!(user_id = %user.id, "user registered");
        Ok(user.id)
    }

    /// Exchange credentials for a session token.
    ///
    /// Unknown email and wrong password fail identically.
    #[instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &str) -> DomainResult<String> {
        let email = normalize_email(email);
        let user = self.users.find_by_email(&email).await?;

        let record = match &user {
            Some(user) => user.password_hash.clone(),
            None => self.decoy_hash.clone(),
        };
        let matches = self.verify(password.to_string(), record).await?;

        match user {
            Some(user) if matches => {
                let token = self.tokens.issue(user.id)?;
                info!(user_id = %user.id, "login succeeded");
                Ok(token)
            }
            _ => {
                warn!("login rejected");
                Err(DomainError::Unauthenticated)
            }
        }
    }

    async fn hash(&self, password: String) -> DomainResult<String> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| DomainError::internal(format!("hashing task failed: {e}")))?
    }

    async fn verify(&self, password: String, record: String) -> DomainResult<bool> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &record))
            .await
            .map_err(|e| DomainError::internal(format!("verification task failed: {e}")))
    }
}
