use std::fmt;

use serde::Serialize;

/// How a request's tenant was resolved.
///
/// `Default` covers every fallback. Whether the directory missed or failed
/// is only visible in the logs, never to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantSource {
    /// Subdomain matched a tenant's vanity `domain`.
    Domain,
    /// Subdomain matched a tenant's `id`.
    Identifier,
    /// No tenant matched; the default partition applies.
    Default,
}

impl TenantSource {
    pub fn is_default(&self) -> bool {
        matches!(self, TenantSource::Default)
    }
}

impl fmt::Display for TenantSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TenantSource::Domain => write!(f, "domain"),
            TenantSource::Identifier => write!(f, "identifier"),
            TenantSource::Default => write!(f, "default"),
        }
    }
}
