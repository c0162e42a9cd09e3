//! # Security Module
//!
//! Token and password collaborators used by the auth middleware and the user routes.
//!
//! ## Overview
//!
//! Both concerns sit behind narrow traits so the pipeline never depends on a concrete
//! signing scheme or key-derivation function:
//!
//! - [`TokenService`] - issue and verify bearer tokens keyed by a shared secret
//! - [`PasswordHasher`] - derive a stored digest from a salt and a plaintext password
//!
//! The shipped implementations are [`JwtTokens`] (HS256 via `jsonwebtoken`) and
//! [`Pbkdf2PasswordHasher`] (PBKDF2-HMAC-SHA256).
//!
//! ## Token Claims
//!
//! Tokens carry three claims, serialized as:
//!
//! ```json
//! { "email": "ada@example.com", "isAdmin": false, "exp": 1735689600 }
//! ```
//!
//! `exp` is seconds since the Unix epoch. Verification rejects expired tokens and tokens
//! signed with a different secret.
//!
//! ## Example
//!
//! ```rust
//! use edgeroute::security::{JwtTokens, TokenService};
//! use std::time::Duration;
//!
//! let tokens = JwtTokens::new("shared-secret", Duration::from_secs(60));
//! let token = tokens.issue("ada@example.com", true).unwrap();
//! let claims = tokens.verify(&token).unwrap();
//! assert_eq!(claims.email, "ada@example.com");
//! assert!(claims.is_admin);
//! ```

mod jwt;
mod password;

pub use jwt::JwtTokens;
pub use password::{Pbkdf2PasswordHasher, DIGEST_BYTES, ITERATIONS};

use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

/// Claims carried by a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    #[serde(rename = "isAdmin", default)]
    pub is_admin: bool,
    /// Expiry, seconds since the Unix epoch
    pub exp: i64,
}

/// Why a token could not be issued or accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Not a structurally valid token, or its payload cannot be read
    Malformed(String),
    /// Well-formed but rejected: bad signature, expired, wrong algorithm
    Rejected(String),
    /// The token could not be signed
    Signing(String),
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::Malformed(m) => write!(f, "malformed token: {m}"),
            TokenError::Rejected(m) => write!(f, "token rejected: {m}"),
            TokenError::Signing(m) => write!(f, "token signing failed: {m}"),
        }
    }
}

impl std::error::Error for TokenError {}

/// Issues and verifies bearer tokens.
pub trait TokenService: Send + Sync {
    /// Issue a token for `email`, expiring after the service's configured lifetime
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Signing`] when the token cannot be produced.
    fn issue(&self, email: &str, is_admin: bool) -> Result<String, TokenError>;

    /// Read the claims without checking signature or expiry.
    ///
    /// Only used to tell a garbled token apart from a forged or expired one.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Malformed`] when the payload cannot be decoded.
    fn decode(&self, token: &str) -> Result<Claims, TokenError>;

    /// Verify signature and expiry and return the claims
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Malformed`] or [`TokenError::Rejected`].
    fn verify(&self, token: &str) -> Result<Claims, TokenError>;
}

/// Derives the stored form of a password.
pub trait PasswordHasher: Send + Sync {
    /// Deterministic digest of `password` under `salt`
    fn hash(&self, salt: &str, password: &str) -> String;

    /// Whether `password` under `salt` derives `digest`, compared in constant time
    fn verify(&self, salt: &str, password: &str, digest: &str) -> bool {
        self.hash(salt, password)
            .as_bytes()
            .ct_eq(digest.as_bytes())
            .into()
    }
}
