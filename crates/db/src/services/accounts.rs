//! Account service.
//!
//! Registration, superuser creation, and the email confirmation workflow.
//! Passwords are hashed with Argon2id before they reach the repositories.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use sqlx::PgPool;
use thiserror::Error;

use orderhub_core::{Email, EmailError, UserId, UserRole};

use crate::db::RepositoryError;
use crate::db::tokens::ConfirmEmailTokenRepository;
use crate::db::users::UserRepository;
use crate::models::{ConfirmEmailToken, NewUser, User};
use crate::services::tokens::TokenGenerator;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// How long a confirmation token stays valid.
const TOKEN_TTL_HOURS: i64 = 24;

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Email already registered.
    #[error("user already exists")]
    UserAlreadyExists,

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// Superuser flags must not be explicitly disabled.
    #[error("superuser must have {0}=true")]
    InvalidSuperuserFlags(&'static str),

    /// Confirmation token unknown or already consumed.
    #[error("invalid confirmation token")]
    InvalidToken,

    /// Confirmation token past its expiry.
    #[error("confirmation token expired")]
    TokenExpired,

    /// Invalid credentials (wrong password or inactive account).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

/// Fields accepted at registration.
#[derive(Debug, Clone)]
pub struct Registration<'r> {
    pub email: &'r str,
    pub password: &'r str,
    pub role: UserRole,
    pub company: &'r str,
    pub position: &'r str,
}

/// Account service.
pub struct AccountService<'a> {
    users: UserRepository<'a>,
    tokens: ConfirmEmailTokenRepository<'a>,
    generator: &'a dyn TokenGenerator,
}

impl<'a> AccountService<'a> {
    /// Create a new account service.
    #[must_use]
    pub fn new(pool: &'a PgPool, generator: &'a dyn TokenGenerator) -> Self {
        Self {
            users: UserRepository::new(pool),
            tokens: ConfirmEmailTokenRepository::new(pool),
            generator,
        }
    }

    /// Register a new account.
    ///
    /// The account starts inactive; [`Self::issue_confirmation`] and
    /// [`Self::confirm_email`] complete the activation workflow.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidEmail` if the email format is invalid.
    /// Returns `AccountError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AccountError::UserAlreadyExists` if the email is already registered.
    pub async fn register(&self, registration: Registration<'_>) -> Result<User, AccountError> {
        let email = Email::parse(registration.email)?;
        validate_password(registration.password)?;
        let password_hash = hash_password(registration.password)?;

        let new_user = NewUser {
            email,
            password_hash,
            role: registration.role,
            company: registration.company.to_owned(),
            position: registration.position.to_owned(),
            is_active: false,
            is_staff: false,
            is_superuser: false,
        };

        let user = self.users.create(&new_user).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => AccountError::UserAlreadyExists,
            other => AccountError::Repository(other),
        })?;

        Ok(user)
    }

    /// Create a superuser account, active immediately.
    ///
    /// The optional flags exist so callers can pass explicit `true` values;
    /// passing `Some(false)` for either is rejected rather than silently
    /// overridden.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidSuperuserFlags` if a flag is explicitly false.
    /// Returns `AccountError::InvalidEmail`, `AccountError::WeakPassword`, or
    /// `AccountError::UserAlreadyExists` as [`Self::register`] does.
    pub async fn create_superuser(
        &self,
        email: &str,
        password: &str,
        is_staff: Option<bool>,
        is_superuser: Option<bool>,
    ) -> Result<User, AccountError> {
        validate_superuser_flags(is_staff, is_superuser)?;

        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let new_user = NewUser {
            email,
            password_hash,
            role: UserRole::Buyer,
            company: String::new(),
            position: String::new(),
            is_active: true,
            is_staff: true,
            is_superuser: true,
        };

        let user = self.users.create(&new_user).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => AccountError::UserAlreadyExists,
            other => AccountError::Repository(other),
        })?;

        Ok(user)
    }

    /// Issue an email-confirmation token for a user.
    ///
    /// Idempotent: while an unexpired token exists it is returned as-is, so
    /// repeated "resend confirmation" requests never rotate the key out from
    /// under an email already in flight. Expired tokens (anyone's) are purged
    /// on the way, so a user whose token lapsed gets a fresh key.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::UserNotFound` if the user doesn't exist.
    /// Returns `AccountError::Repository` for database errors.
    pub async fn issue_confirmation(
        &self,
        user_id: UserId,
    ) -> Result<ConfirmEmailToken, AccountError> {
        if self.users.get_by_id(user_id).await?.is_none() {
            return Err(AccountError::UserNotFound);
        }

        let now = Utc::now();

        // Piggyback expired-token cleanup on issuance; there is no background
        // job to do it.
        let purged = self.tokens.purge_expired(now).await?;
        if purged > 0 {
            tracing::debug!(purged, "removed expired confirmation tokens");
        }

        if let Some(existing) = self.tokens.get_active_for_user(user_id, now).await? {
            return Ok(existing);
        }

        let key = self.generator.generate_key();
        let expires_at = now + Duration::hours(TOKEN_TTL_HOURS);
        let token = self.tokens.create(user_id, &key, expires_at).await?;
        Ok(token)
    }

    /// Confirm an email address by consuming a token.
    ///
    /// Activates the account and deletes the token atomically; a token works
    /// exactly once.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidToken` if the key is unknown or the token
    /// was already consumed.
    /// Returns `AccountError::TokenExpired` if the token is past its expiry.
    pub async fn confirm_email(&self, key: &str) -> Result<User, AccountError> {
        let token = self
            .tokens
            .get_by_key(key)
            .await?
            .ok_or(AccountError::InvalidToken)?;

        if token.is_expired(Utc::now()) {
            return Err(AccountError::TokenExpired);
        }

        self.tokens
            .consume(token.id, token.user_id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AccountError::InvalidToken,
                other => AccountError::Repository(other),
            })?;

        self.users
            .get_by_id(token.user_id)
            .await?
            .ok_or(AccountError::UserNotFound)
    }

    /// Login with email and password.
    ///
    /// Inactive accounts cannot log in, regardless of the password; callers
    /// get the same `InvalidCredentials` either way.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidCredentials` if the email, password, or
    /// activation state is wrong.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, AccountError> {
        let email = Email::parse(email)?;

        let (user, password_hash) = self
            .users
            .get_password_hash(&email)
            .await?
            .ok_or(AccountError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        if !user.is_active {
            return Err(AccountError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::UserNotFound` if the user doesn't exist.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, AccountError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AccountError::UserNotFound)
    }
}

/// Reject explicit `false` for either superuser flag.
fn validate_superuser_flags(
    is_staff: Option<bool>,
    is_superuser: Option<bool>,
) -> Result<(), AccountError> {
    if is_staff == Some(false) {
        return Err(AccountError::InvalidSuperuserFlags("is_staff"));
    }
    if is_superuser == Some(false) {
        return Err(AccountError::InvalidSuperuserFlags("is_superuser"));
    }
    Ok(())
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AccountError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AccountError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AccountError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AccountError::PasswordHash)
}

/// Verify a password against a stored Argon2 hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AccountError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AccountError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AccountError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_short_password_rejected() {
        assert!(matches!(
            validate_password("seven77"),
            Err(AccountError::WeakPassword(_))
        ));
        assert!(validate_password("eight888").is_ok());
    }

    #[test]
    fn test_superuser_flags_reject_explicit_false() {
        assert!(validate_superuser_flags(None, None).is_ok());
        assert!(validate_superuser_flags(Some(true), Some(true)).is_ok());
        assert!(matches!(
            validate_superuser_flags(Some(false), None),
            Err(AccountError::InvalidSuperuserFlags("is_staff"))
        ));
        assert!(matches!(
            validate_superuser_flags(None, Some(false)),
            Err(AccountError::InvalidSuperuserFlags("is_superuser"))
        ));
    }

    #[test]
    fn test_hash_and_verify_round_trip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong horse", &hash),
            Err(AccountError::InvalidCredentials)
        ));
    }
}
