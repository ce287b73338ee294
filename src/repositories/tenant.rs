//! # Tenant Repository
//!
//! This module contains the repository implementation for Tenant entities.
//! The struct borrows any SeaORM connection, so callers can run the same
//! methods against the pool or against an open transaction.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::models::tenant::{
    ActiveModel as TenantActiveModel, Column, Entity as Tenant, Model as TenantModel,
};

/// Repository for Tenant database operations
pub struct TenantRepository<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> TenantRepository<'a, C> {
    /// Create a new TenantRepository over the given connection
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Check whether a tenant with this email is already registered.
    ///
    /// Emails are stored normalized, so callers pass the normalized form.
    /// This is only a fast pre-check; the unique index remains the final
    /// authority under concurrent registration.
    pub async fn exists_by_email(&self, email: &str) -> Result<bool, sea_orm::DbErr> {
        let count = Tenant::find()
            .filter(Column::Email.eq(email))
            .count(self.conn)
            .await?;

        Ok(count > 0)
    }

    /// Get tenant by ID
    pub async fn find_by_id(&self, tenant_id: Uuid) -> Result<Option<TenantModel>, sea_orm::DbErr> {
        Tenant::find_by_id(tenant_id).one(self.conn).await
    }

    /// Insert a new tenant row
    pub async fn create(&self, name: &str, email: &str) -> Result<TenantModel, sea_orm::DbErr> {
        let now = Utc::now();

        let tenant = TenantActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            email: Set(email.to_string()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        tenant.insert(self.conn).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{Database, DatabaseConnection};
    use tempfile::TempDir;

    async fn setup_test_db() -> (DatabaseConnection, TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let url = format!("sqlite://{}/test.db?mode=rwc", dir.path().display());
        let db = Database::connect(&url).await.expect("connect test db");
        Migrator::up(&db, None).await.expect("run migrations");
        (db, dir)
    }

    #[tokio::test]
    async fn test_create_and_find_tenant() {
        let (db, _dir) = setup_test_db().await;
        let repo = TenantRepository::new(&db);

        let created = repo
            .create("Test Tenant", "test@example.com")
            .await
            .unwrap();
        assert_eq!(created.name, "Test Tenant");
        assert_eq!(created.email, "test@example.com");

        let found = repo.find_by_id(created.id).await.unwrap();
        assert_eq!(found.unwrap().id, created.id);

        let missing = repo.find_by_id(Uuid::new_v4()).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_exists_by_email() {
        let (db, _dir) = setup_test_db().await;
        let repo = TenantRepository::new(&db);

        assert!(!repo.exists_by_email("nobody@example.com").await.unwrap());

        repo.create("Somebody", "somebody@example.com")
            .await
            .unwrap();

        assert!(repo.exists_by_email("somebody@example.com").await.unwrap());
        // Lookup is on the stored form, not a case-folded comparison
        assert!(!repo.exists_by_email("SOMEBODY@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected_by_index() {
        let (db, _dir) = setup_test_db().await;
        let repo = TenantRepository::new(&db);

        repo.create("First", "same@example.com").await.unwrap();
        let second = repo.create("Second", "same@example.com").await;

        let err = second.unwrap_err();
        assert!(crate::error::is_unique_violation(&err));
    }

    #[tokio::test]
    async fn test_create_inside_transaction() {
        use sea_orm::TransactionTrait;

        let (db, _dir) = setup_test_db().await;

        let txn = db.begin().await.unwrap();
        let created = TenantRepository::new(&txn)
            .create("Txn Tenant", "txn@example.com")
            .await
            .unwrap();
        txn.commit().await.unwrap();

        let found = TenantRepository::new(&db)
            .find_by_id(created.id)
            .await
            .unwrap();
        assert!(found.is_some());
    }
}
