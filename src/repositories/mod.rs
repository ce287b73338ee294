//! # Repository Layer
//!
//! This module contains repository implementations that encapsulate SeaORM
//! operations for database entities. Repositories are generic over the
//! connection so the same methods run on the pool or inside a transaction.

pub mod api_key;
pub mod tenant;

pub use api_key::ApiKeyRepository;
pub use tenant::TenantRepository;
