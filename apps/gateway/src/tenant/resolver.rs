//! Host-based tenant resolution.
//!
//! Resolution order for a non-exempt request:
//!
//! 1. derive a subdomain candidate from the `Host` header ([`HostPolicy`]),
//! 2. look the candidate up as a tenant `domain`,
//! 3. on a miss, look it up as a tenant `id`,
//! 4. otherwise fall back to the default partition.
//!
//! Directory errors and timeouts also fall back to the default partition.
//! Nothing in here returns an error to the caller.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::TenancyConfig;
use crate::models::tenant::Tenant;

use super::directory::{DirectoryError, TenantDirectory};
use super::exemptions::ExemptPaths;
use super::host::HostPolicy;
use super::source::TenantSource;

/// The request-scoped tenant context handed to downstream handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTenant {
    pub tenant_id: String,
    pub source: TenantSource,
    /// Login path to redirect to, set for landing paths on a tenant subdomain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

impl ResolvedTenant {
    pub fn is_default(&self) -> bool {
        self.source.is_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Tenant-agnostic path; nothing was looked up and nothing is stamped.
    Exempt,
    Resolved(ResolvedTenant),
}

/// Resolves the tenant for each request against an injected directory.
///
/// Holds no mutable state, so one instance is shared by all requests.
pub struct TenantResolver {
    directory: Arc<dyn TenantDirectory>,
    hosts: HostPolicy,
    exempt: ExemptPaths,
    default_tenant: String,
    login_path: String,
    landing_paths: Vec<String>,
    lookup_timeout: Duration,
}

impl TenantResolver {
    pub fn new(directory: Arc<dyn TenantDirectory>, config: &TenancyConfig) -> Self {
        Self {
            directory,
            hosts: HostPolicy::new(config),
            exempt: ExemptPaths::new(config),
            default_tenant: config.default_tenant.clone(),
            login_path: config.login_path.clone(),
            landing_paths: config.landing_paths.clone(),
            lookup_timeout: config.lookup_timeout,
        }
    }

    pub fn default_tenant(&self) -> &str {
        &self.default_tenant
    }

    pub fn directory(&self) -> &Arc<dyn TenantDirectory> {
        &self.directory
    }

    pub async fn resolve(&self, host: Option<&str>, path: &str) -> Resolution {
        if self.exempt.is_exempt(path) {
            debug!(path, "Exempt path, skipping tenant resolution");
            return Resolution::Exempt;
        }

        // The default sentinel as a subdomain means "no tenant".
        let candidate = self
            .hosts
            .candidate(host)
            .filter(|c| !c.eq_ignore_ascii_case(&self.default_tenant));

        let redirect = match candidate {
            Some(_) if self.is_landing(path) => Some(self.login_path.clone()),
            _ => None,
        };

        let (tenant_id, source) = match candidate.as_deref() {
            Some(candidate) => self.lookup(host, candidate).await,
            None => {
                debug!(host = ?host, "No tenant subdomain, using default partition");
                self.fallback()
            }
        };

        Resolution::Resolved(ResolvedTenant {
            tenant_id,
            source,
            redirect,
        })
    }

    async fn lookup(&self, host: Option<&str>, candidate: &str) -> (String, TenantSource) {
        match self.find(candidate).await {
            Ok(Some((tenant, _))) if tenant.id.trim().is_empty() => {
                warn!(
                    host = ?host,
                    candidate,
                    reason = "invalid_record",
                    "Tenant record has an empty id, using default partition"
                );
                self.fallback()
            }
            Ok(Some((tenant, source))) => {
                debug!(
                    host = ?host,
                    candidate,
                    tenant_id = %tenant.id,
                    source = %source,
                    "Resolved tenant"
                );
                (tenant.id, source)
            }
            Ok(None) => {
                info!(
                    host = ?host,
                    candidate,
                    reason = "not_found",
                    "No tenant matches subdomain, using default partition"
                );
                self.fallback()
            }
            Err(e) => {
                warn!(
                    host = ?host,
                    candidate,
                    error = %e,
                    reason = "directory_error",
                    "Tenant lookup failed, using default partition"
                );
                self.fallback()
            }
        }
    }

    /// Domain first, then identifier. The second read only happens on a miss.
    async fn find(&self, candidate: &str) -> Result<Option<(Tenant, TenantSource)>, DirectoryError> {
        if let Some(tenant) = self
            .bounded("domain", self.directory.find_by_domain(candidate))
            .await?
        {
            return Ok(Some((tenant, TenantSource::Domain)));
        }

        Ok(self
            .bounded("identifier", self.directory.find_by_id(candidate))
            .await?
            .map(|tenant| (tenant, TenantSource::Identifier)))
    }

    async fn bounded<F>(&self, lookup: &'static str, query: F) -> Result<Option<Tenant>, DirectoryError>
    where
        F: Future<Output = Result<Option<Tenant>, DirectoryError>>,
    {
        tokio::time::timeout(self.lookup_timeout, query)
            .await
            .map_err(|_| DirectoryError::Timeout {
                lookup,
                after_ms: self.lookup_timeout.as_millis() as u64,
            })?
    }

    fn is_landing(&self, path: &str) -> bool {
        path == "/" || self.landing_paths.iter().any(|p| p == path)
    }

    fn fallback(&self) -> (String, TenantSource) {
        (self.default_tenant.clone(), TenantSource::Default)
    }
}
