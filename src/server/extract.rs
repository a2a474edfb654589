//! Request extractors: tenant resolution and bearer authentication
//!
//! Handlers take `Tenant` and `CurrentUser` as arguments; rejection is an
//! [`AppError`] so failures render the standard error envelope.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::core::auth::{AuthContext, bearer_token};
use crate::core::error::{AppError, TenantError};
use crate::core::tenant::TenantId;
use crate::server::state::AppState;
use crate::storage::TenantStore;

/// The resolved tenant store for this request.
pub struct Tenant(pub TenantStore);

impl FromRequestParts<AppState> for Tenant {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let tenant_id = TenantId::from_headers(&parts.headers)?;
        if let Some(allowed) = &state.allowed_tenants
            && !allowed.contains(tenant_id.as_str())
        {
            return Err(TenantError::Unknown {
                subdomain: tenant_id.as_str().to_string(),
            }
            .into());
        }
        Ok(Tenant(state.tenants.store(tenant_id.as_str())?))
    }
}

/// The authenticated caller.
pub struct CurrentUser(pub AuthContext);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token);
        let context = state.auth.authenticate(token).await?;
        Ok(CurrentUser(context))
    }
}
