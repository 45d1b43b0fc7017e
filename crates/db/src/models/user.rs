//! Identity domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use orderhub_core::{ConfirmEmailTokenId, ContactId, Email, UserId, UserRole};

/// A platform account.
///
/// The password hash is deliberately not part of this type; it never leaves
/// the users repository.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Normalized login email.
    pub email: Email,
    /// Shop or buyer.
    pub role: UserRole,
    /// Company name, free text.
    pub company: String,
    /// Job position, free text.
    pub position: String,
    /// False until the email confirmation workflow flips it.
    pub is_active: bool,
    /// Staff flag (management tooling access).
    pub is_staff: bool,
    /// Superuser flag.
    pub is_superuser: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to insert a new account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    /// Argon2 PHC string, already hashed by the accounts service.
    pub password_hash: String,
    pub role: UserRole,
    pub company: String,
    pub position: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// A shipping contact (phone + address) owned by one user.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Contact {
    pub id: ContactId,
    /// Owning user; deleting the user deletes the contact.
    pub user_id: UserId,
    pub phone: String,
    pub address: String,
}

/// A one-time email confirmation token.
///
/// The key is generated exactly once at creation and is globally unique.
/// Activation consumes the token; expired tokens are rejected.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ConfirmEmailToken {
    pub id: ConfirmEmailTokenId,
    pub user_id: UserId,
    pub key: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ConfirmEmailToken {
    /// Whether the token is past its expiry timestamp.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}
