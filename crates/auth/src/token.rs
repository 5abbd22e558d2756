//! Session token issuance and validation (HS256 JWT).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use taskflow_core::{DomainError, DomainResult, UserId};

use crate::claims::{SessionClaims, TokenValidationError, validate_claims};

/// The only algorithm this service signs with or accepts.
const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Clone, Deserialize)]
pub struct TokenSettings {
    /// Symmetric signing secret. Never leaves the server.
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    /// Lifetime of an issued token.
    pub duration_minutes: i64,
}

/// Why a presented token was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Bad signature, wrong algorithm, wrong issuer/audience, or missing and
    /// malformed claims.
    #[error("invalid token: {0}")]
    Invalid(String),

    #[error(transparent)]
    Window(#[from] TokenValidationError),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(value: jsonwebtoken::errors::Error) -> Self {
        Self::Invalid(value.to_string())
    }
}

pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    lifetime: Duration,
}

impl core::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(settings: &TokenSettings) -> DomainResult<Self> {
        if settings.secret.is_empty() {
            return Err(DomainError::internal("token secret must not be empty"));
        }
        if settings.duration_minutes <= 0 {
            return Err(DomainError::internal("token duration must be positive"));
        }
        let lifetime = Duration::try_minutes(settings.duration_minutes)
            .ok_or_else(|| DomainError::internal("token duration is out of range"))?;

        // The algorithm list is fixed here and never taken from the token header.
        // Expiry is checked by `validate_claims` against an explicit clock.
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.validate_exp = false;
        validation.set_issuer(&[settings.issuer.as_str()]);
        validation.set_audience(&[settings.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(settings.secret.as_bytes()),
            decoding: DecodingKey::from_secret(settings.secret.as_bytes()),
            validation,
            issuer: settings.issuer.clone(),
            audience: settings.audience.clone(),
            lifetime,
        })
    }

    pub fn issue(&self, user_id: UserId) -> DomainResult<String> {
        self.issue_at(user_id, Utc::now())
    }

    /// Mint a token for `user_id` as if the clock read `now`.
    pub fn issue_at(&self, user_id: UserId, now: DateTime<Utc>) -> DomainResult<String> {
        let expires = now
            .checked_add_signed(self.lifetime)
            .ok_or_else(|| DomainError::internal("token expiry is out of range"))?;
        let claims = SessionClaims {
            sub: user_id,
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: expires.timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };

        jsonwebtoken::encode(&Header::new(ALGORITHM), &claims, &self.encoding)
            .map_err(|e| DomainError::internal(format!("failed to sign token: {e}")))
    }

    pub fn validate(&self, token: &str) -> Result<UserId, TokenError> {
        self.validate_at(token, Utc::now())
    }

    /// Verify the signature and claims of `token` against the clock reading `now`.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<UserId, TokenError> {
        let claims = self.decode(token)?;
        validate_claims(&claims, now)?;
        Ok(claims.sub)
    }

    /// Signature-checked claims, without the time-window check.
    pub fn decode(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &self.validation)?;
        Ok(data.claims)
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }
}

#[cfg(test)]
pub(crate) fn test_settings() -> TokenSettings {
    TokenSettings {
        secret: "test-secret".to_string(),
        issuer: "taskflow".to_string(),
        audience: "taskflow-clients".to_string(),
        duration_minutes: 60,
    }
}
