//! Tenant registration
//!
//! Registration creates the tenant row and its first API key inside a single
//! transaction, so a tenant is never visible without a credential and a
//! failed registration leaves no rows behind. The unique index on email is
//! the final authority for duplicates: a violation raised at commit time is
//! reported exactly like a pre-check hit, which closes the window between
//! checking and inserting under concurrent registration.

use metrics::counter;
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{self, ApiError};
use crate::keys;
use crate::repositories::{ApiKeyRepository, TenantRepository};

/// Maximum accepted length for tenant names
const MAX_NAME_LEN: usize = 255;

/// Maximum accepted length for email addresses
const MAX_EMAIL_LEN: usize = 320;

/// Outcome of a successful registration.
///
/// `api_key` is the only copy of the plaintext key that will ever exist;
/// it is handed to the caller once and is not recoverable afterwards.
#[derive(Debug)]
pub struct Registration {
    pub tenant_id: Uuid,
    pub api_key: String,
}

/// Normalizes an email for storage and comparison: surrounding whitespace
/// is dropped and ASCII letters are lowercased. The stored form is what the
/// unique index sees, so two spellings differing only in case collide.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// Register a new tenant and issue its API key.
///
/// Returns 409 when the email is already taken and 422 when the payload
/// fails validation; store failures surface as 5xx.
pub async fn register(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
) -> Result<Registration, ApiError> {
    validate(name, email)?;

    let name = name.trim();
    let email = normalize_email(email);

    // Fast path for the common duplicate; the unique index still decides
    // under concurrent registration
    if TenantRepository::new(db).exists_by_email(&email).await? {
        counter!("tenant_registrations_duplicate_total").increment(1);
        debug!("Registration rejected, email already taken");
        return Err(error::duplicate_tenant());
    }

    let issued = keys::issue_key();

    let txn = db.begin().await?;

    let written = async {
        let tenant = TenantRepository::new(&txn).create(name, &email).await?;
        ApiKeyRepository::new(&txn)
            .create(tenant.id, &issued.digest, &issued.prefix)
            .await?;
        Ok::<_, sea_orm::DbErr>(tenant)
    }
    .await;

    let tenant = match written {
        Ok(tenant) => tenant,
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                debug!(error = ?rollback_err, "Rollback after failed registration write");
            }
            return Err(map_write_err(err));
        }
    };

    txn.commit().await.map_err(map_write_err)?;

    counter!("tenant_registrations_total").increment(1);
    info!(tenant_id = %tenant.id, key_prefix = %issued.prefix, "Tenant registered");

    Ok(Registration {
        tenant_id: tenant.id,
        api_key: issued.plaintext,
    })
}

/// Maps write failures inside the registration transaction: a unique
/// violation means another registration won the race with the same email,
/// anything else is an ordinary store error.
fn map_write_err(err: sea_orm::DbErr) -> ApiError {
    if error::is_unique_violation(&err) {
        counter!("tenant_registrations_duplicate_total").increment(1);
        debug!("Registration lost the insert race, email already taken");
        return error::duplicate_tenant();
    }
    ApiError::from(err)
}

fn validate(name: &str, email: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(error::validation_error(
            "Tenant name is required",
            json!({ "field": "name", "message": "Tenant name must not be empty" }),
        ));
    }

    if name.len() > MAX_NAME_LEN {
        return Err(error::validation_error(
            "Tenant name exceeds maximum length",
            json!({ "field": "name", "max_length": MAX_NAME_LEN }),
        ));
    }

    if !is_plausible_email(email.trim()) || email.trim().len() > MAX_EMAIL_LEN {
        return Err(error::validation_error(
            "A valid email address is required",
            json!({ "field": "email", "message": "Email must look like local@domain" }),
        ));
    }

    Ok(())
}

/// Structural email check: one `@` with a non-empty local part and a dotted
/// domain, no whitespace. Deliverability is not this service's problem.
fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.is_empty()
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain.contains('.')
        && !domain.contains('@')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApiKey, Tenant};
    use axum::http::StatusCode;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{Database, EntityTrait, PaginatorTrait};
    use tempfile::TempDir;

    async fn setup_test_db() -> (DatabaseConnection, TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let url = format!("sqlite://{}/test.db?mode=rwc", dir.path().display());
        let db = Database::connect(&url).await.expect("connect test db");
        Migrator::up(&db, None).await.expect("run migrations");
        (db, dir)
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  User@Example.COM "), "user@example.com");
        assert_eq!(normalize_email("plain@example.com"), "plain@example.com");
    }

    #[test]
    fn test_is_plausible_email() {
        assert!(is_plausible_email("user@example.com"));
        assert!(is_plausible_email("first.last+tag@sub.example.org"));

        assert!(!is_plausible_email(""));
        assert!(!is_plausible_email("no-at-sign"));
        assert!(!is_plausible_email("@example.com"));
        assert!(!is_plausible_email("user@"));
        assert!(!is_plausible_email("user@localhost"));
        assert!(!is_plausible_email("user@.example.com"));
        assert!(!is_plausible_email("user name@example.com"));
    }

    #[tokio::test]
    async fn test_register_issues_usable_key() {
        let (db, _dir) = setup_test_db().await;

        let registration = register(&db, "Acme", "hello@acme.test").await.unwrap();
        assert!(registration.api_key.starts_with(keys::KEY_TAG));

        // The stored row carries the digest and prefix, never the plaintext
        let stored = ApiKeyRepository::new(&db)
            .find_by_digest(&keys::digest_key(&registration.api_key))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.tenant_id, registration.tenant_id);
        assert_eq!(stored.key_prefix, keys::display_prefix(&registration.api_key));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let (db, _dir) = setup_test_db().await;

        register(&db, "First", "shared@example.com").await.unwrap();
        let err = register(&db, "Second", "shared@example.com")
            .await
            .unwrap_err();

        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_register_duplicate_email_case_insensitive() {
        let (db, _dir) = setup_test_db().await;

        register(&db, "First", "Shared@Example.com").await.unwrap();
        let err = register(&db, "Second", "shared@EXAMPLE.COM")
            .await
            .unwrap_err();

        assert_eq!(err.status, StatusCode::CONFLICT);

        // The losing registration left nothing behind
        assert!(
            TenantRepository::new(&db)
                .exists_by_email("shared@example.com")
                .await
                .unwrap()
        );
        assert_eq!(Tenant::find().count(&db).await.unwrap(), 1);
        assert_eq!(ApiKey::find().count(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_register_validation() {
        let (db, _dir) = setup_test_db().await;

        let empty_name = register(&db, "   ", "ok@example.com").await.unwrap_err();
        assert_eq!(empty_name.status, StatusCode::UNPROCESSABLE_ENTITY);

        let bad_email = register(&db, "Acme", "not-an-email").await.unwrap_err();
        assert_eq!(bad_email.status, StatusCode::UNPROCESSABLE_ENTITY);

        let long_name = "a".repeat(MAX_NAME_LEN + 1);
        let too_long = register(&db, &long_name, "ok@example.com")
            .await
            .unwrap_err();
        assert_eq!(too_long.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_register_stores_normalized_email() {
        let (db, _dir) = setup_test_db().await;

        let registration = register(&db, "Acme", "  Sales@Acme.COM ").await.unwrap();

        let tenant = TenantRepository::new(&db)
            .find_by_id(registration.tenant_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tenant.email, "sales@acme.com");
    }

    #[tokio::test]
    async fn test_concurrent_same_email_single_winner() {
        let (db, _dir) = setup_test_db().await;

        let mut handles = Vec::new();
        for i in 0..5 {
            let db = db.clone();
            handles.push(tokio::spawn(async move {
                register(&db, &format!("Racer {i}"), "race@example.com").await
            }));
        }

        let mut won = 0;
        let mut duplicates = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => won += 1,
                Err(err) => {
                    assert_eq!(err.status, StatusCode::CONFLICT);
                    duplicates += 1;
                }
            }
        }

        assert_eq!(won, 1);
        assert_eq!(duplicates, 4);

        assert_eq!(Tenant::find().count(&db).await.unwrap(), 1);
        assert_eq!(ApiKey::find().count(&db).await.unwrap(), 1);
    }
}
