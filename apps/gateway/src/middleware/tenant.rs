//! Tenant stamping middleware.
//!
//! Mount with `axum::middleware::from_fn_with_state(state, tenant_middleware)`.
//! For every non-exempt request the resolved tenant id overwrites the tenant
//! header on the request (a client-supplied value is never trusted), the
//! [`ResolvedTenant`] is stored in request extensions, and the same header is
//! set on the response. Exempt requests pass through untouched.

use axum::{
    extract::{Request, State},
    http::{header::HOST, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::warn;

use crate::config::DEFAULT_TENANT_ID;
use crate::state::AppState;
use crate::tenant::{Resolution, ResolvedTenant, TenantSource};

pub async fn tenant_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let host = request_host(&request);
    let path = request.uri().path().to_string();

    let mut resolved = match state.resolver.resolve(host.as_deref(), &path).await {
        Resolution::Exempt => return next.run(request).await,
        Resolution::Resolved(resolved) => resolved,
    };

    let header_value = match HeaderValue::from_str(&resolved.tenant_id) {
        Ok(value) => value,
        Err(_) => {
            warn!(
                tenant_id = %resolved.tenant_id,
                "Tenant id is not a valid header value, using default partition"
            );
            resolved = ResolvedTenant {
                tenant_id: state.resolver.default_tenant().to_string(),
                source: TenantSource::Default,
                redirect: resolved.redirect,
            };
            HeaderValue::from_str(&resolved.tenant_id)
                .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_TENANT_ID))
        }
    };

    request
        .headers_mut()
        .insert(state.tenant_header.clone(), header_value.clone());
    let redirect = resolved.redirect.clone();
    request.extensions_mut().insert(resolved);

    let mut response = match redirect {
        Some(target) => Redirect::temporary(&target).into_response(),
        None => next.run(request).await,
    };
    response
        .headers_mut()
        .insert(state.tenant_header.clone(), header_value);
    response
}

/// `Host` header, falling back to the URI authority (HTTP/2 requests).
fn request_host(request: &Request) -> Option<String> {
    request
        .headers()
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
        .or_else(|| request.uri().authority().map(|a| a.to_string()))
}
