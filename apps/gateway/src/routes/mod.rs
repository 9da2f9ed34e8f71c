pub mod health;
pub mod pages;

use axum::{extract::OriginalUri, middleware, routing::get, Router};

use crate::errors::AppError;
use crate::middleware::tenant::tenant_middleware;
use crate::state::AppState;

async fn not_found(OriginalUri(uri): OriginalUri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Exempt from tenant resolution
        .route("/api/health", get(health::health_handler))
        // Tenant-scoped pages
        .route("/", get(pages::landing_handler))
        .route("/auth/login", get(pages::login_handler))
        .route("/dashboard", get(pages::dashboard_handler))
        .route("/tenant", get(pages::current_tenant_handler))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            tenant_middleware,
        ))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{
            header::{HOST, LOCATION},
            Request, StatusCode,
        },
        response::Response,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::config::TenancyConfig;
    use crate::models::tenant::Tenant;
    use crate::tenant::InMemoryTenantDirectory;

    fn app(directory: Arc<InMemoryTenantDirectory>) -> Router {
        build_router(AppState::new(directory, &TenancyConfig::default()))
    }

    async fn get_page(app: Router, host: &str, path: &str) -> Response {
        app.oneshot(
            Request::builder()
                .uri(path)
                .header(HOST, host)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_known_subdomain_dashboard() {
        let directory = Arc::new(InMemoryTenantDirectory::new([Tenant::new("t1", Some("acme"))]));
        let response = get_page(app(directory), "acme.example.com", "/dashboard").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-tenant-id"], "t1");
        let body = json_body(response).await;
        assert_eq!(body["page"], "dashboard");
        assert_eq!(body["tenant"]["tenant_id"], "t1");
        assert_eq!(body["tenant"]["source"], "domain");
    }

    #[tokio::test]
    async fn test_unknown_subdomain_root_redirects_to_login() {
        let directory = Arc::new(InMemoryTenantDirectory::new([Tenant::new("t1", Some("acme"))]));
        let response = get_page(app(directory), "unknown.example.com", "/").await;

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[LOCATION], "/auth/login");
        assert_eq!(response.headers()["x-tenant-id"], "platform");
    }

    #[tokio::test]
    async fn test_api_route_is_exempt() {
        let directory = Arc::new(InMemoryTenantDirectory::default());
        let response = get_page(app(directory.clone()), "platform.example.com", "/api/health").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("x-tenant-id").is_none());
        assert_eq!(json_body(response).await["status"], "ok");
        assert_eq!(directory.lookups(), 0);
    }

    #[tokio::test]
    async fn test_unrouted_api_path_is_exempt_404() {
        let directory = Arc::new(InMemoryTenantDirectory::default());
        let response = get_page(app(directory.clone()), "acme.example.com", "/api/cron/daily").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get("x-tenant-id").is_none());
        assert_eq!(directory.lookups(), 0);
    }

    #[tokio::test]
    async fn test_directory_outage_serves_default_partition() {
        let directory = Arc::new(InMemoryTenantDirectory::new([Tenant::new("t1", Some("acme"))]));
        directory.set_failing(true);
        let response = get_page(app(directory), "acme.example.com", "/dashboard").await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["tenant"]["tenant_id"], "platform");
        assert_eq!(body["tenant"]["source"], "default");
    }

    #[tokio::test]
    async fn test_localhost_without_subdomain() {
        let directory = Arc::new(InMemoryTenantDirectory::default());
        let response = get_page(app(directory), "localhost:9002", "/dashboard").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-tenant-id"], "platform");
    }

    #[tokio::test]
    async fn test_local_subdomain_by_identifier_redirects() {
        let directory = Arc::new(InMemoryTenantDirectory::new([Tenant::new("t1", None)]));
        let response = get_page(app(directory), "t1.localhost:9002", "/").await;

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[LOCATION], "/auth/login");
        assert_eq!(response.headers()["x-tenant-id"], "t1");
    }

    #[tokio::test]
    async fn test_login_page_does_not_redirect() {
        let directory = Arc::new(InMemoryTenantDirectory::new([Tenant::new("t1", Some("acme"))]));
        let response = get_page(app(directory), "acme.example.com", "/auth/login").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["page"], "login");
    }

    #[tokio::test]
    async fn test_current_tenant_record() {
        let directory = Arc::new(InMemoryTenantDirectory::new([Tenant::new("t1", Some("acme"))]));
        let response = get_page(app(directory.clone()), "acme.example.com", "/tenant").await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["id"], "t1");
        assert_eq!(body["domain"], "acme");

        let response = get_page(app(directory), "example.com", "/tenant").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_two_tenants_never_see_each_other() {
        let directory = Arc::new(InMemoryTenantDirectory::new([
            Tenant::new("t1", Some("acme")),
            Tenant::new("t2", Some("globex")),
        ]));
        let router = app(directory);

        let acme = get_page(router.clone(), "acme.example.com", "/dashboard").await;
        let globex = get_page(router, "globex.example.com", "/dashboard").await;

        assert_eq!(json_body(acme).await["tenant"]["tenant_id"], "t1");
        assert_eq!(json_body(globex).await["tenant"]["tenant_id"], "t2");
    }
}
