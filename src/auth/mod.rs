//! Authentication building blocks.
//!
//! Two-tier credential scheme: short-lived signed access tokens
//! (see [`crate::jwt`]) and long-lived opaque refresh tokens tracked in
//! the database with explicit revocation. Passwords are bcrypt-hashed,
//! and credentials arrive through the `Authorization` header.

mod extractors;
mod headers;
mod password;
mod refresh;

pub use extractors::{Auth, AuthError, HasAuthState};
pub use headers::{CredentialError, api_key, api_key_matches, bearer_token};
pub use password::{PasswordError, hash_password, verify_password};
pub use refresh::{
    REFRESH_TOKEN_TTL, RefreshError, issue_refresh_token, resolve_refresh_token,
    revoke_refresh_token,
};
