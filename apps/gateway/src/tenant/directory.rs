//! Tenant directory: the read path the resolver consults.
//!
//! `PgTenantDirectory` is the production backend. `InMemoryTenantDirectory`
//! serves local runs without a database and stands in for Postgres in tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::models::tenant::Tenant;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{lookup} lookup timed out after {after_ms}ms")]
    Timeout { lookup: &'static str, after_ms: u64 },

    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

/// Read-only view of the tenant registry.
///
/// Carried as `Arc<dyn TenantDirectory>` so the backend is chosen at startup
/// and tests can substitute a fake. Implementations must tolerate many
/// concurrent readers.
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    /// At most one tenant owns a given domain label.
    async fn find_by_domain(&self, domain: &str) -> Result<Option<Tenant>, DirectoryError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Tenant>, DirectoryError>;
}

// Candidates arrive lowercased from the host, so both columns compare
// case-insensitively. Backed by the `lower(domain)` unique index.
const FIND_BY_DOMAIN_SQL: &str =
    "SELECT id, domain, name, created_at FROM tenants WHERE lower(domain) = lower($1) LIMIT 1";
const FIND_BY_ID_SQL: &str =
    "SELECT id, domain, name, created_at FROM tenants WHERE lower(id) = lower($1) LIMIT 1";

/// Postgres-backed directory over the `tenants` table.
#[derive(Clone)]
pub struct PgTenantDirectory {
    pool: PgPool,
}

impl PgTenantDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantDirectory for PgTenantDirectory {
    async fn find_by_domain(&self, domain: &str) -> Result<Option<Tenant>, DirectoryError> {
        Ok(sqlx::query_as::<_, Tenant>(FIND_BY_DOMAIN_SQL)
            .bind(domain)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Tenant>, DirectoryError> {
        Ok(sqlx::query_as::<_, Tenant>(FIND_BY_ID_SQL)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }
}

/// Map-backed directory. Can be flipped into an outage mode and counts every
/// lookup it serves.
#[derive(Default)]
pub struct InMemoryTenantDirectory {
    tenants: RwLock<HashMap<String, Tenant>>,
    failing: AtomicBool,
    lookups: AtomicUsize,
}

impl InMemoryTenantDirectory {
    pub fn new(tenants: impl IntoIterator<Item = Tenant>) -> Self {
        let directory = Self::default();
        for tenant in tenants {
            directory.insert(tenant);
        }
        directory
    }

    pub fn insert(&self, tenant: Tenant) {
        if let Ok(mut tenants) = self.tenants.write() {
            tenants.insert(tenant.id.clone(), tenant);
        }
    }

    #[cfg(test)]
    /// While set, every lookup fails with `DirectoryError::Unavailable`.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    #[cfg(test)]
    /// Number of lookups served (or attempted) so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    fn lookup<F>(&self, predicate: F) -> Result<Option<Tenant>, DirectoryError>
    where
        F: Fn(&Tenant) -> bool,
    {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(DirectoryError::Unavailable(
                "in-memory directory is in outage mode".to_string(),
            ));
        }
        let tenants = self
            .tenants
            .read()
            .map_err(|_| DirectoryError::Unavailable("tenant map lock poisoned".to_string()))?;
        Ok(tenants.values().find(|t| predicate(t)).cloned())
    }
}

#[async_trait]
impl TenantDirectory for InMemoryTenantDirectory {
    async fn find_by_domain(&self, domain: &str) -> Result<Option<Tenant>, DirectoryError> {
        self.lookup(|t| {
            t.domain
                .as_deref()
                .is_some_and(|d| d.eq_ignore_ascii_case(domain))
        })
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Tenant>, DirectoryError> {
        self.lookup(|t| t.id.eq_ignore_ascii_case(id))
    }
}

/// Parses a `id:domain,id2:,id3` seed list for the in-memory directory.
/// An empty or missing domain leaves the tenant addressable by id only.
pub fn parse_seed(raw: &str) -> Vec<Tenant> {
    crate::config::parse_list(raw)
        .iter()
        .filter_map(|entry| {
            let (id, domain) = match entry.split_once(':') {
                Some((id, domain)) => (id.trim(), domain.trim()),
                None => (entry.as_str(), ""),
            };
            if id.is_empty() {
                return None;
            }
            let domain = (!domain.is_empty()).then(|| domain.to_lowercase());
            Some(Tenant::new(id, domain.as_deref()))
        })
        .collect()
}
