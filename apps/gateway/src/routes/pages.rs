use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::extractors::tenant::CurrentTenant;
use crate::models::tenant::Tenant;
use crate::state::AppState;
use crate::tenant::ResolvedTenant;

#[derive(Serialize)]
pub struct PageResponse {
    pub page: &'static str,
    pub tenant: ResolvedTenant,
}

fn page(name: &'static str, tenant: CurrentTenant) -> Json<PageResponse> {
    Json(PageResponse {
        page: name,
        tenant: tenant.0,
    })
}

/// GET /
pub async fn landing_handler(tenant: CurrentTenant) -> Json<PageResponse> {
    page("landing", tenant)
}

/// GET /auth/login
pub async fn login_handler(tenant: CurrentTenant) -> Json<PageResponse> {
    page("login", tenant)
}

/// GET /dashboard
pub async fn dashboard_handler(tenant: CurrentTenant) -> Json<PageResponse> {
    page("dashboard", tenant)
}

/// GET /tenant
/// Returns the directory record of the request's tenant. The default
/// partition has no record.
pub async fn current_tenant_handler(
    State(state): State<AppState>,
    tenant: CurrentTenant,
) -> Result<Json<Tenant>, AppError> {
    if tenant.resolved().is_default() {
        return Err(AppError::NotFound(
            "Request is served by the default partition".to_string(),
        ));
    }
    let record = state
        .resolver
        .directory()
        .find_by_id(tenant.tenant_id())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Tenant {} not found", tenant.tenant_id())))?;
    Ok(Json(record))
}
