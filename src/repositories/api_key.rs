//! # API Key Repository
//!
//! This module contains the repository implementation for ApiKey entities.
//! Lookups are exact matches on the unique digest column; the plaintext key
//! never reaches this layer.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::models::api_key::{
    ActiveModel as ApiKeyActiveModel, Column, Entity as ApiKey, Model as ApiKeyModel,
};

/// Repository for ApiKey database operations
pub struct ApiKeyRepository<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> ApiKeyRepository<'a, C> {
    /// Create a new ApiKeyRepository over the given connection
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Insert a new key row for a tenant
    pub async fn create(
        &self,
        tenant_id: Uuid,
        key_hash: &str,
        key_prefix: &str,
    ) -> Result<ApiKeyModel, sea_orm::DbErr> {
        let key = ApiKeyActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            key_hash: Set(key_hash.to_string()),
            key_prefix: Set(key_prefix.to_string()),
            created_at: Set(Utc::now().into()),
            last_used_at: Set(None),
        };

        key.insert(self.conn).await
    }

    /// Look up a key row by its digest (exact match on the unique index)
    pub async fn find_by_digest(
        &self,
        key_hash: &str,
    ) -> Result<Option<ApiKeyModel>, sea_orm::DbErr> {
        ApiKey::find()
            .filter(Column::KeyHash.eq(key_hash))
            .one(self.conn)
            .await
    }

    /// Set last_used_at to now for the given key.
    ///
    /// Runs as a single UPDATE; callers treat failures as best-effort.
    pub async fn touch_last_used(&self, key_id: Uuid) -> Result<(), sea_orm::DbErr> {
        ApiKey::update_many()
            .col_expr(Column::LastUsedAt, Expr::value(Utc::now()))
            .filter(Column::Id.eq(key_id))
            .exec(self.conn)
            .await?;

        Ok(())
    }
}
