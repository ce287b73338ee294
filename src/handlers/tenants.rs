//! # Tenants API Handlers
//!
//! Handlers for tenant self-registration and the authenticated tenant
//! profile. Registration is the only place the plaintext API key ever
//! appears in a response.

use axum::{
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AuthenticatedTenant;
use crate::error::ApiError;
use crate::registrar;
use crate::repositories::TenantRepository;
use crate::server::AppState;

const REGISTER_SUCCESS_MESSAGE: &str =
    "Tenant registered successfully. Save your API key securely!";

/// Request payload for tenant self-registration
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterTenantRequest {
    /// Display name for the tenant (required, max 255 characters)
    #[schema(example = "Acme Corp")]
    pub name: String,
    /// Contact email, unique across tenants
    #[schema(example = "admin@acme.example")]
    pub email: String,
}

/// Response payload for tenant self-registration
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterTenantResponse {
    /// Unique identifier for the new tenant
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub tenant_id: Uuid,
    /// Plaintext API key, returned only once at creation
    pub api_key: String,
    /// Reminder that the key cannot be retrieved again
    pub message: String,
}

/// Response payload describing the authenticated tenant
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TenantProfileResponse {
    pub tenant_id: Uuid,
    pub name: String,
    pub email: String,
}

/// Register a new tenant and issue its API key
#[utoipa::path(
    post,
    path = "/v1/tenants/register",
    request_body = RegisterTenantRequest,
    responses(
        (status = 200, description = "Tenant registered; the API key is shown exactly once", body = RegisterTenantResponse),
        (status = 409, description = "A tenant with this email already exists", body = ApiError),
        (status = 422, description = "Validation failed", body = ApiError),
        (status = 503, description = "Database unavailable", body = ApiError)
    ),
    tag = "tenants"
)]
pub async fn register_tenant(
    State(state): State<AppState>,
    payload: Result<Json<RegisterTenantRequest>, JsonRejection>,
) -> Result<Json<RegisterTenantResponse>, ApiError> {
    let Json(request) = payload?;

    let registration = registrar::register(&state.db, &request.name, &request.email).await?;

    Ok(Json(RegisterTenantResponse {
        tenant_id: registration.tenant_id,
        api_key: registration.api_key,
        message: REGISTER_SUCCESS_MESSAGE.to_string(),
    }))
}

/// Get the tenant that owns the presented API key
#[utoipa::path(
    get,
    path = "/v1/tenants/me",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Authenticated tenant profile", body = TenantProfileResponse),
        (status = 401, description = "Missing or invalid API key", body = ApiError),
        (status = 503, description = "Database unavailable", body = ApiError)
    ),
    tag = "tenants"
)]
pub async fn get_me(
    State(state): State<AppState>,
    AuthenticatedTenant(tenant_id): AuthenticatedTenant,
) -> Result<Json<TenantProfileResponse>, ApiError> {
    let repo = TenantRepository::new(&state.db);
    let tenant = repo.find_by_id(tenant_id).await?.ok_or_else(|| {
        ApiError::new(StatusCode::NOT_FOUND, "TENANT_NOT_FOUND", "Tenant not found")
    })?;

    Ok(Json(TenantProfileResponse {
        tenant_id: tenant.id,
        name: tenant.name,
        email: tenant.email,
    }))
}
