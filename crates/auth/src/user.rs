//! User records and the credential store port.

use async_trait::async_trait;

use taskflow_core::{DomainError, DomainResult, Entity, UserId};

pub const MAX_EMAIL_LEN: usize = 254;
pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_PASSWORD_LEN: usize = 128;

/// A registered user.
///
/// Immutable after registration.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    /// Normalised (trimmed, lower-cased) email; unique across users.
    pub email: String,
    /// PHC-format Argon2id record.
    pub password_hash: String,
}

impl core::fmt::Debug for User {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Credential store (external collaborator).
///
/// Implementations must enforce email uniqueness on `insert` and report a
/// duplicate as [`DomainError::Conflict`], even under concurrent inserts.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;

    async fn insert(&self, user: &User) -> DomainResult<()>;
}

/// Canonical form used for every email lookup and insert.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate registration input, returning the normalised email.
pub fn validate_registration(email: &str, password: &str) -> DomainResult<String> {
    let email = normalize_email(email);

    if email.is_empty() {
        return Err(DomainError::validation("email is required"));
    }
    if email.chars().count() > MAX_EMAIL_LEN {
        return Err(DomainError::validation(format!(
            "email must be at most {MAX_EMAIL_LEN} characters"
        )));
    }
    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(|c| c.is_whitespace() || c.is_control()) => {}
        _ => return Err(DomainError::validation("invalid email format")),
    }

    let password_len = password.chars().count();
    if password_len < MIN_PASSWORD_LEN {
        return Err(DomainError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if password_len > MAX_PASSWORD_LEN {
        return Err(DomainError::validation(format!(
            "password must be at most {MAX_PASSWORD_LEN} characters"
        )));
    }

    Ok(email)
}
