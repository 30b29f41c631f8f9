//! Authentication service.
//!
//! Password registration and login, email verification codes, password reset
//! tokens and bearer access tokens.

mod error;
pub mod token;

pub use error::AuthError;
pub use token::{Claims, TokenError, TokenIssuer};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sqlx::PgPool;

use rolodex_core::{Email, UserId};

use crate::db::RepositoryError;
use crate::db::password_resets::PasswordResetRepository;
use crate::db::users::{CreateUser, UserRepository};
use crate::models::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// How long an email verification code stays valid.
pub const VERIFICATION_CODE_TTL: Duration = Duration::hours(48);

/// Fresh codes tried before registration gives up on a collision streak.
const VERIFICATION_CODE_ATTEMPTS: usize = 5;

/// How long a password reset token stays valid.
pub const RESET_TOKEN_TTL: Duration = Duration::hours(1);

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    resets: PasswordResetRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
            resets: PasswordResetRepository::new(pool),
        }
    }

    // =========================================================================
    // Password Authentication
    // =========================================================================

    /// Register a new, unverified user with a fresh verification code.
    ///
    /// The returned user carries the code in `verification_code`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    /// Returns `AuthError::VerificationCodeUnavailable` if every drawn code is taken.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;
        for _ in 0..VERIFICATION_CODE_ATTEMPTS {
            let code = generate_verification_code();
            let created = self
                .users
                .create(&CreateUser {
                    email: &email,
                    password_hash: &password_hash,
                    verification_code: &code,
                    verification_expires_at: now + VERIFICATION_CODE_TTL,
                })
                .await
                .map_err(|e| match e {
                    RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                    other => AuthError::Repository(other),
                })?;

            if let Some(user) = created {
                return Ok(user);
            }
            tracing::debug!("verification code already pending, drawing another");
        }

        Err(AuthError::VerificationCodeUnavailable)
    }

    /// Login with email and password.
    ///
    /// Unknown and malformed emails fail the same way as a wrong password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &user.password_hash)?;

        Ok(user)
    }

    // =========================================================================
    // Email Verification
    // =========================================================================

    /// Mark the account holding `code` verified.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if no account holds the code.
    /// Returns `AuthError::VerificationExpired` if the code is past its expiry.
    pub async fn verify_email(&self, code: &str, now: DateTime<Utc>) -> Result<User, AuthError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(AuthError::UserNotFound);
        }

        let mut user = self
            .users
            .get_by_verification_code(code)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if user.verification_expired(now) {
            return Err(AuthError::VerificationExpired);
        }

        self.users.mark_verified(user.id).await.map_err(|e| match e {
            RepositoryError::NotFound => AuthError::UserNotFound,
            other => AuthError::Repository(other),
        })?;

        user.verified = true;
        user.verification_code = None;
        user.verification_expires_at = None;
        Ok(user)
    }

    // =========================================================================
    // Password Reset
    // =========================================================================

    /// Issue a reset token for the account with `email`, if there is one.
    ///
    /// Returns the user and the plaintext token to mail them.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::Repository` if the database fails.
    pub async fn request_password_reset(
        &self,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<(User, String)>, AuthError> {
        let email = Email::parse(email)?;

        let Some(user) = self.users.get_by_email(&email).await? else {
            return Ok(None);
        };

        let token = generate_reset_token();
        self.resets
            .create(user.id, &token, now + RESET_TOKEN_TTL)
            .await?;

        Ok(Some((user, token)))
    }

    /// Consume a reset token and set a new password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the new password doesn't meet requirements.
    /// Returns `AuthError::InvalidResetToken` if the token is unknown, used, or expired.
    pub async fn confirm_password_reset(
        &self,
        token: &str,
        new_password: &str,
        now: DateTime<Utc>,
    ) -> Result<UserId, AuthError> {
        validate_password(new_password)?;
        let password_hash = hash_password(new_password)?;

        self.resets
            .consume(token.trim(), &password_hash, now)
            .await?
            .ok_or(AuthError::InvalidResetToken)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Generate a 6-character hex verification code.
#[must_use]
pub fn generate_verification_code() -> String {
    let mut bytes = [0u8; 3];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Generate a URL-safe password reset token from 32 random bytes.
#[must_use]
pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}
