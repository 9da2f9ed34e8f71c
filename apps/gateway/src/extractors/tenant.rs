//! Tenant context extractor.
//!
//! Hands handlers the [`ResolvedTenant`] stored by the tenant middleware.
//! Every tenant-owned read or write downstream must filter by
//! [`CurrentTenant::tenant_id`].

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::errors::AppError;
use crate::tenant::ResolvedTenant;

/// Axum extractor for the request's resolved tenant.
///
/// Rejects with [`AppError::MissingTenant`] when the route is not behind the
/// tenant middleware (or the path is exempt).
#[derive(Debug, Clone)]
pub struct CurrentTenant(pub ResolvedTenant);

impl CurrentTenant {
    pub fn tenant_id(&self) -> &str {
        &self.0.tenant_id
    }

    pub fn resolved(&self) -> &ResolvedTenant {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentTenant
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ResolvedTenant>()
            .cloned()
            .map(CurrentTenant)
            .ok_or(AppError::MissingTenant)
    }
}
