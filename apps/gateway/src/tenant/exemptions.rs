use crate::config::TenancyConfig;

/// Paths that never take part in tenant resolution: API routes,
/// framework-internal routes and static assets.
#[derive(Debug, Clone)]
pub struct ExemptPaths {
    prefixes: Vec<String>,
    extensions: Vec<String>,
}

impl ExemptPaths {
    pub fn new(config: &TenancyConfig) -> Self {
        let prefixes = config
            .exempt_prefixes
            .iter()
            .map(|p| normalize_prefix(p))
            .filter(|p| !p.is_empty())
            .collect();
        let extensions = config
            .exempt_extensions
            .iter()
            .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        Self {
            prefixes,
            extensions,
        }
    }

    pub fn is_exempt(&self, path: &str) -> bool {
        self.matches_prefix(path) || self.matches_extension(path)
    }

    /// `/api` matches `/api` and `/api/...` but not `/apiary`.
    fn matches_prefix(&self, path: &str) -> bool {
        self.prefixes.iter().any(|prefix| {
            path.strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
    }

    fn matches_extension(&self, path: &str) -> bool {
        let last_segment = path.rsplit('/').next().unwrap_or(path);
        match last_segment.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => {
                let ext = ext.to_ascii_lowercase();
                self.extensions.iter().any(|e| *e == ext)
            }
            _ => false,
        }
    }
}

fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exempt() -> ExemptPaths {
        ExemptPaths::new(&TenancyConfig::default())
    }

    #[test]
    fn test_api_and_internal_prefixes() {
        let paths = exempt();
        assert!(paths.is_exempt("/api"));
        assert!(paths.is_exempt("/api/cron/daily"));
        assert!(paths.is_exempt("/_next/static/chunks/main.js"));
        assert!(paths.is_exempt("/_next/image"));
    }

    #[test]
    fn test_prefix_is_segment_aware() {
        let paths = exempt();
        assert!(!paths.is_exempt("/apiary"));
        assert!(!paths.is_exempt("/_nextgen"));
    }

    #[test]
    fn test_static_extensions() {
        let paths = exempt();
        assert!(paths.is_exempt("/favicon.ico"));
        assert!(paths.is_exempt("/images/logo.SVG"));
        assert!(paths.is_exempt("/fonts/inter.woff2"));
    }

    #[test]
    fn test_pages_are_not_exempt() {
        let paths = exempt();
        assert!(!paths.is_exempt("/"));
        assert!(!paths.is_exempt("/dashboard"));
        assert!(!paths.is_exempt("/auth/login"));
        assert!(!paths.is_exempt("/jobs/v1.2"));
        assert!(!paths.is_exempt("/.png"));
    }

    #[test]
    fn test_config_values_are_normalized() {
        let config = TenancyConfig {
            exempt_prefixes: vec!["internal/".to_string(), " ".to_string()],
            exempt_extensions: vec![".PDF".to_string()],
            ..Default::default()
        };
        let paths = ExemptPaths::new(&config);
        assert!(paths.is_exempt("/internal/metrics"));
        assert!(paths.is_exempt("/docs/guide.pdf"));
        assert!(!paths.is_exempt("/api/cron"));
        assert!(!paths.is_exempt("/dashboard"));
    }
}
