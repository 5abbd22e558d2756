//! Identity boundary: credentials, session tokens and the request gate.
//!
//! This crate is intentionally decoupled from HTTP and storage. User records
//! are reached through the [`UserStore`] port; adapters live in
//! `taskflow-infra`.

pub mod account;
pub mod claims;
pub mod gate;
pub mod password;
pub mod token;
pub mod user;

pub use account::AccountService;
pub use claims::{SessionClaims, TokenValidationError, validate_claims};
pub use gate::{AuthGate, extract_bearer};
pub use password::{HashingCost, PasswordHasher};
pub use token::{TokenError, TokenService, TokenSettings};
pub use user::{User, UserStore, normalize_email, validate_registration};
