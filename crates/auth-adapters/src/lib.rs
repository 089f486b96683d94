//! # auth-adapters
//!
//! Shared-secret implementation of `AdminGuard`.
//!
//! The operator and the client both know the admin secret; the client sends
//! its lowercase hex SHA-512 digest as `token` and the server compares that
//! against the digest it derived once at startup.

use domains::AdminGuard;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha512};
use subtle::ConstantTimeEq;

/// Lowercase hex SHA-512 of `secret`, the form clients send as `token`.
pub fn admin_hash(secret: &str) -> String {
    hex::encode(Sha512::digest(secret.as_bytes()))
}

pub struct AdminTokenGuard {
    admin_hash: SecretString,
}

impl AdminTokenGuard {
    pub fn from_secret(secret: &SecretString) -> Self {
        Self {
            admin_hash: admin_hash(secret.expose_secret()).into(),
        }
    }
}

impl std::fmt::Debug for AdminTokenGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminTokenGuard").finish_non_exhaustive()
    }
}

impl AdminGuard for AdminTokenGuard {
    fn authorize(&self, token: &str) -> bool {
        let expected = self.admin_hash.expose_secret().as_bytes();
        let granted: bool = token.as_bytes().ct_eq(expected).into();
        if !granted {
            tracing::warn!(token_len = token.len(), "admin token rejected");
        }
        granted
    }
}
