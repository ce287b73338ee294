//! API key entity model
//!
//! This module contains the SeaORM entity model for the api_keys table.
//! Only the one-way digest of a key is stored; the plaintext is returned
//! once at issuance and never persisted.

use super::tenant::Entity as Tenant;
use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "api_keys")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Tenant that owns this key
    pub tenant_id: Uuid,

    /// SHA-256 hex digest of the full key (unique)
    pub key_hash: String,

    /// Leading characters of the key, safe to display
    pub key_prefix: String,

    pub created_at: DateTimeWithTimeZone,

    /// Best-effort timestamp of the last successful verification
    pub last_used_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Tenant",
        from = "Column::TenantId",
        to = "super::tenant::Column::Id"
    )]
    Tenant,
}

impl Related<Tenant> for Entity {
    fn to() -> RelationDef {
        Relation::Tenant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
