//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use rolodex_core::{Email, UserId};

/// An account holder (domain type).
#[derive(Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login email address.
    pub email: Email,
    /// Argon2id PHC string.
    pub password_hash: String,
    /// Whether the email has been verified.
    pub verified: bool,
    /// Hosted avatar image URL.
    pub avatar_url: Option<String>,
    /// Pending email verification code.
    pub verification_code: Option<String>,
    /// When the pending verification code stops being accepted.
    pub verification_expires_at: Option<DateTime<Utc>>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether the pending verification code has expired at `now`.
    ///
    /// A code without an expiry never expires.
    #[must_use]
    pub fn verification_expired(&self, now: DateTime<Utc>) -> bool {
        self.verification_expires_at
            .is_some_and(|expires_at| now > expires_at)
    }
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("verified", &self.verified)
            .field("avatar_url", &self.avatar_url)
            .field("verification_code", &self.verification_code.as_ref().map(|_| "[REDACTED]"))
            .field("verification_expires_at", &self.verification_expires_at)
            .finish_non_exhaustive()
    }
}

/// Account view returned by the API.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PublicUser {
    pub id: UserId,
    pub email: Email,
    pub verified: bool,
    pub avatar_url: Option<String>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            verified: user.verified,
            avatar_url: user.avatar_url.clone(),
        }
    }
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}
