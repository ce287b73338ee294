//! # Data Models
//!
//! This module contains all the data models used throughout the Accounts API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod api_key;
pub mod tenant;

pub use api_key::Entity as ApiKey;
pub use tenant::Entity as Tenant;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "accounts".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
