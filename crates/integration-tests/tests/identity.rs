//! Integration tests for accounts and the email confirmation workflow.
//!
//! These tests require a disposable `PostgreSQL` database reachable via
//! `TEST_DATABASE_URL`. Run with:
//!
//! ```bash
//! cargo test -p orderhub-integration-tests -- --ignored --test-threads=1
//! ```

#![allow(clippy::unwrap_used)]

use chrono::{Duration, Utc};

use orderhub_core::UserRole;
use orderhub_db::db::RepositoryError;
use orderhub_db::db::contacts::ContactRepository;
use orderhub_db::db::tokens::ConfirmEmailTokenRepository;
use orderhub_db::db::users::UserRepository;
use orderhub_db::services::accounts::{AccountError, AccountService, Registration};
use orderhub_db::services::tokens::OsTokenGenerator;
use orderhub_integration_tests::{FixedTokenGenerator, TestDb};

fn registration(email: &str) -> Registration<'_> {
    Registration {
        email,
        password: "long enough password",
        role: UserRole::Buyer,
        company: "Test Co",
        position: "Tester",
    }
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_registration_starts_inactive_and_normalizes_email() {
    let db = TestDb::new().await;
    let generator = OsTokenGenerator;
    let accounts = AccountService::new(&db.pool, &generator);

    let user = accounts
        .register(registration("  Buyer@Example.COM "))
        .await
        .unwrap();

    assert_eq!(user.email.as_str(), "buyer@example.com");
    assert!(!user.is_active);
    assert!(!user.is_staff);
    assert!(!user.is_superuser);
    assert_eq!(user.role, UserRole::Buyer);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_duplicate_email_rejected_even_with_different_case() {
    let db = TestDb::new().await;
    let generator = OsTokenGenerator;
    let accounts = AccountService::new(&db.pool, &generator);

    accounts
        .register(registration("dup@example.com"))
        .await
        .unwrap();

    let err = accounts
        .register(registration("DUP@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, AccountError::UserAlreadyExists));
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_weak_password_rejected() {
    let db = TestDb::new().await;
    let generator = OsTokenGenerator;
    let accounts = AccountService::new(&db.pool, &generator);

    let mut reg = registration("weak@example.com");
    reg.password = "short";
    let err = accounts.register(reg).await.unwrap_err();
    assert!(matches!(err, AccountError::WeakPassword(_)));
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_superuser_is_active_immediately() {
    let db = TestDb::new().await;
    let generator = OsTokenGenerator;
    let accounts = AccountService::new(&db.pool, &generator);

    let admin = accounts
        .create_superuser("root@example.com", "admin password", None, None)
        .await
        .unwrap();

    assert!(admin.is_active);
    assert!(admin.is_staff);
    assert!(admin.is_superuser);

    // Explicitly disabling a flag is a caller bug, not an override.
    let err = accounts
        .create_superuser("root2@example.com", "admin password", Some(false), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AccountError::InvalidSuperuserFlags("is_staff")));
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_confirmation_token_issued_once_and_consumed_once() {
    let db = TestDb::new().await;
    let generator = OsTokenGenerator;
    let accounts = AccountService::new(&db.pool, &generator);

    let user = accounts
        .register(registration("confirm@example.com"))
        .await
        .unwrap();

    // Re-requesting the confirmation must not rotate the key.
    let first = accounts.issue_confirmation(user.id).await.unwrap();
    let second = accounts.issue_confirmation(user.id).await.unwrap();
    assert_eq!(first.key, second.key);
    assert_eq!(first.key.len(), 64);

    let confirmed = accounts.confirm_email(&first.key).await.unwrap();
    assert!(confirmed.is_active);

    // The token was burned by the first confirmation.
    let err = accounts.confirm_email(&first.key).await.unwrap_err();
    assert!(matches!(err, AccountError::InvalidToken));
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_expired_token_rejected_and_account_stays_inactive() {
    let db = TestDb::new().await;
    let generator = OsTokenGenerator;
    let accounts = AccountService::new(&db.pool, &generator);
    let tokens = ConfirmEmailTokenRepository::new(&db.pool);
    let users = UserRepository::new(&db.pool);

    let user = accounts
        .register(registration("late@example.com"))
        .await
        .unwrap();

    let expired_at = Utc::now() - Duration::hours(1);
    let token = tokens.create(user.id, "stale-key", expired_at).await.unwrap();

    let err = accounts.confirm_email(&token.key).await.unwrap_err();
    assert!(matches!(err, AccountError::TokenExpired));

    let user = users.get_by_id(user.id).await.unwrap().unwrap();
    assert!(!user.is_active);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_issuing_purges_expired_tokens_and_rotates_the_key() {
    let db = TestDb::new().await;
    let generator = OsTokenGenerator;
    let accounts = AccountService::new(&db.pool, &generator);
    let tokens = ConfirmEmailTokenRepository::new(&db.pool);

    let user = accounts
        .register(registration("lapsed@example.com"))
        .await
        .unwrap();

    let expired_at = Utc::now() - Duration::hours(1);
    tokens.create(user.id, "lapsed-key", expired_at).await.unwrap();

    // The lapsed token is swept on issuance and a fresh key takes its place.
    let fresh = accounts.issue_confirmation(user.id).await.unwrap();
    assert_ne!(fresh.key, "lapsed-key");
    assert!(tokens.get_by_key("lapsed-key").await.unwrap().is_none());

    let confirmed = accounts.confirm_email(&fresh.key).await.unwrap();
    assert!(confirmed.is_active);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_login_requires_confirmed_account() {
    let db = TestDb::new().await;
    let generator = FixedTokenGenerator("pinned-key-for-login-test");
    let accounts = AccountService::new(&db.pool, &generator);

    accounts
        .register(registration("login@example.com"))
        .await
        .unwrap();

    let err = accounts
        .authenticate("login@example.com", "long enough password")
        .await
        .unwrap_err();
    assert!(matches!(err, AccountError::InvalidCredentials));

    let registered = accounts
        .register(registration("login2@example.com"))
        .await
        .unwrap();
    let token = accounts.issue_confirmation(registered.id).await.unwrap();
    assert_eq!(token.key, "pinned-key-for-login-test");
    accounts.confirm_email("pinned-key-for-login-test").await.unwrap();

    let user = accounts
        .authenticate("LOGIN2@example.com", "long enough password")
        .await
        .unwrap();
    assert_eq!(user.id, registered.id);

    let err = accounts
        .authenticate("login2@example.com", "wrong password!")
        .await
        .unwrap_err();
    assert!(matches!(err, AccountError::InvalidCredentials));
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_deleting_user_cascades_to_contacts_and_tokens() {
    let db = TestDb::new().await;
    let generator = OsTokenGenerator;
    let accounts = AccountService::new(&db.pool, &generator);
    let contacts = ContactRepository::new(&db.pool);
    let users = UserRepository::new(&db.pool);

    let user = accounts
        .register(registration("cascade@example.com"))
        .await
        .unwrap();
    let contact = contacts
        .create(user.id, "+1 555 0101", "2 Cascade Road")
        .await
        .unwrap();
    accounts.issue_confirmation(user.id).await.unwrap();

    assert!(users.delete(user.id).await.unwrap());

    assert!(contacts.get(contact.id).await.unwrap().is_none());
    let token_count: i64 =
        sqlx::query_scalar("SELECT count(*) FROM confirm_email_tokens WHERE user_id = $1")
            .bind(user.id)
            .fetch_one(&db.pool)
            .await
            .unwrap();
    assert_eq!(token_count, 0);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_duplicate_token_key_is_a_conflict() {
    let db = TestDb::new().await;
    let generator = OsTokenGenerator;
    let accounts = AccountService::new(&db.pool, &generator);
    let tokens = ConfirmEmailTokenRepository::new(&db.pool);

    let a = accounts.register(registration("a@example.com")).await.unwrap();
    let b = accounts.register(registration("b@example.com")).await.unwrap();

    let expires = Utc::now() + Duration::hours(24);
    tokens.create(a.id, "shared-key", expires).await.unwrap();
    let err = tokens.create(b.id, "shared-key", expires).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));
}
