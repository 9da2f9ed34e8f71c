//! Subdomain extraction from the `Host` header.

use std::net::Ipv4Addr;

use crate::config::TenancyConfig;

/// Label-arity rules deciding whether a host carries a tenant subdomain.
///
/// Public hosts need `public_min_labels` labels (`acme.example.com`), hosts
/// under the local development suffix need `local_min_labels`
/// (`acme.localhost`). The leading label is never a candidate when it is
/// reserved or is the local suffix itself.
#[derive(Debug, Clone)]
pub struct HostPolicy {
    local_suffix: String,
    reserved: Vec<String>,
    public_min_labels: usize,
    local_min_labels: usize,
}

impl HostPolicy {
    pub fn new(config: &TenancyConfig) -> Self {
        Self {
            local_suffix: config.local_suffix.trim().to_ascii_lowercase(),
            reserved: config
                .reserved_subdomains
                .iter()
                .map(|r| r.trim().to_ascii_lowercase())
                .collect(),
            public_min_labels: config.public_min_labels,
            local_min_labels: config.local_min_labels,
        }
    }

    /// Returns the subdomain candidate for a raw `Host` value, if any.
    /// Malformed hosts yield `None` rather than an error.
    pub fn candidate(&self, host: Option<&str>) -> Option<String> {
        let host = strip_port(host?.trim())?;
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        if host.is_empty() || host.parse::<Ipv4Addr>().is_ok() {
            return None;
        }

        let labels: Vec<&str> = host.split('.').collect();
        if !labels.iter().all(|label| is_valid_label(label)) {
            return None;
        }

        // The bare local host never carries a subdomain, whatever the suffix arity.
        if host == self.local_suffix {
            return None;
        }

        let min_labels = if self.is_local(&host) {
            self.local_min_labels
        } else {
            self.public_min_labels
        };
        if labels.len() < min_labels {
            return None;
        }

        let leading = *labels.first()?;
        if leading == self.local_suffix_label() || self.reserved.iter().any(|r| r == leading) {
            return None;
        }
        Some(leading.to_string())
    }

    /// First label of the local suffix (`lvh` for `lvh.me`).
    fn local_suffix_label(&self) -> &str {
        self.local_suffix
            .split('.')
            .next()
            .unwrap_or(&self.local_suffix)
    }

    fn is_local(&self, host: &str) -> bool {
        host == self.local_suffix
            || host
                .strip_suffix(self.local_suffix.as_str())
                .is_some_and(|rest| rest.ends_with('.'))
    }
}

/// Drops a trailing `:port`. Bracketed IPv6 literals and non-numeric ports
/// are treated as malformed.
fn strip_port(host: &str) -> Option<&str> {
    if host.starts_with('[') {
        return None;
    }
    match host.rsplit_once(':') {
        Some((name, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => {
            Some(name)
        }
        Some(_) => None,
        None => Some(host),
    }
}

fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= 63
        && label
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
