use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::{HeaderName, HeaderValue};

/// Application configuration loaded from environment variables.
/// Fails at startup if any variable is malformed.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres tenant directory. Without it the gateway runs on an
    /// in-memory directory seeded from `TENANT_SEED`.
    pub database_url: Option<String>,
    /// `id:domain` pairs for the in-memory directory.
    pub tenant_seed: String,
    pub db_max_connections: u32,
    pub port: u16,
    pub rust_log: String,
    pub tenancy: TenancyConfig,
}

/// Everything the tenant middleware needs to know about hosts, paths and
/// the default partition.
#[derive(Debug, Clone)]
pub struct TenancyConfig {
    /// Sentinel id for the shared/platform partition.
    pub default_tenant: String,
    /// Header carrying the resolved tenant id to downstream handlers.
    pub header_name: HeaderName,
    pub login_path: String,
    /// Paths that redirect to `login_path` when a subdomain is present.
    pub landing_paths: Vec<String>,
    pub local_suffix: String,
    pub reserved_subdomains: Vec<String>,
    pub public_min_labels: usize,
    pub local_min_labels: usize,
    pub exempt_prefixes: Vec<String>,
    pub exempt_extensions: Vec<String>,
    /// Upper bound for a single directory lookup.
    pub lookup_timeout: Duration,
}

pub const DEFAULT_TENANT_ID: &str = "platform";
pub const DEFAULT_TENANT_HEADER: &str = "x-tenant-id";
const DEFAULT_EXEMPT_PREFIXES: &str = "/api,/_next";
const DEFAULT_EXEMPT_EXTENSIONS: &str = "svg,png,jpg,jpeg,gif,webp,ico,css,js,map,woff,woff2,txt";

impl Default for TenancyConfig {
    fn default() -> Self {
        Self {
            default_tenant: DEFAULT_TENANT_ID.to_string(),
            header_name: HeaderName::from_static(DEFAULT_TENANT_HEADER),
            login_path: "/auth/login".to_string(),
            landing_paths: vec!["/".to_string()],
            local_suffix: "localhost".to_string(),
            reserved_subdomains: vec!["www".to_string()],
            public_min_labels: 3,
            local_min_labels: 2,
            exempt_prefixes: parse_list(DEFAULT_EXEMPT_PREFIXES),
            exempt_extensions: parse_list(DEFAULT_EXEMPT_EXTENSIONS),
            lookup_timeout: Duration::from_millis(2000),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            tenant_seed: std::env::var("TENANT_SEED").unwrap_or_default(),
            db_max_connections: parse_env("DB_MAX_CONNECTIONS", 10)?,
            port: parse_env("PORT", 9002)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            tenancy: TenancyConfig::from_env()?,
        })
    }
}

impl TenancyConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = TenancyConfig::default();

        let header_name = match std::env::var("TENANT_HEADER") {
            Ok(raw) => HeaderName::from_str(raw.trim())
                .with_context(|| format!("TENANT_HEADER '{raw}' is not a valid header name"))?,
            Err(_) => defaults.header_name,
        };

        let default_tenant = env_or("DEFAULT_TENANT_ID", &defaults.default_tenant);
        if default_tenant.trim().is_empty() {
            anyhow::bail!("DEFAULT_TENANT_ID must not be empty");
        }
        HeaderValue::from_str(default_tenant.trim())
            .with_context(|| format!("DEFAULT_TENANT_ID '{default_tenant}' is not a valid header value"))?;

        Ok(TenancyConfig {
            default_tenant: default_tenant.trim().to_string(),
            header_name,
            login_path: env_or("LOGIN_PATH", &defaults.login_path),
            landing_paths: list_env("LANDING_PATHS").unwrap_or(defaults.landing_paths),
            local_suffix: env_or("LOCAL_HOST_SUFFIX", &defaults.local_suffix),
            reserved_subdomains: list_env("RESERVED_SUBDOMAINS")
                .unwrap_or(defaults.reserved_subdomains),
            public_min_labels: parse_env("PUBLIC_MIN_LABELS", defaults.public_min_labels)?,
            local_min_labels: parse_env("LOCAL_MIN_LABELS", defaults.local_min_labels)?,
            exempt_prefixes: list_env("EXEMPT_PATH_PREFIXES").unwrap_or(defaults.exempt_prefixes),
            exempt_extensions: list_env("EXEMPT_EXTENSIONS")
                .unwrap_or(defaults.exempt_extensions),
            lookup_timeout: Duration::from_millis(parse_env(
                "TENANT_LOOKUP_TIMEOUT_MS",
                defaults.lookup_timeout.as_millis() as u64,
            )?),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn list_env(key: &str) -> Option<Vec<String>> {
    std::env::var(key).ok().map(|raw| parse_list(&raw))
}

/// Splits a comma-separated list, dropping blanks.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_trims_and_drops_blanks() {
        assert_eq!(parse_list(" /api , ,/_next,"), vec!["/api", "/_next"]);
    }

    #[test]
    fn test_parse_list_empty() {
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn test_defaults_match_documented_values() {
        let config = TenancyConfig::default();
        assert_eq!(config.default_tenant, "platform");
        assert_eq!(config.header_name.as_str(), "x-tenant-id");
        assert_eq!(config.login_path, "/auth/login");
        assert_eq!(config.landing_paths, vec!["/"]);
        assert_eq!(config.public_min_labels, 3);
        assert_eq!(config.local_min_labels, 2);
        assert!(config.exempt_prefixes.contains(&"/api".to_string()));
        assert!(config.exempt_extensions.contains(&"woff2".to_string()));
        assert_eq!(config.lookup_timeout, Duration::from_secs(2));
    }
}
