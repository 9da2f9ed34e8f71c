use std::sync::Arc;

use axum::http::HeaderName;

use crate::config::TenancyConfig;
use crate::tenant::{TenantDirectory, TenantResolver};

/// Shared application state injected into the tenant middleware and all
/// route handlers.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<TenantResolver>,
    /// Header stamped with the resolved tenant id on requests and responses.
    pub tenant_header: HeaderName,
}

impl AppState {
    pub fn new(directory: Arc<dyn TenantDirectory>, tenancy: &TenancyConfig) -> Self {
        Self {
            resolver: Arc::new(TenantResolver::new(directory, tenancy)),
            tenant_header: tenancy.header_name.clone(),
        }
    }
}
