//! Origin allow-list applied once, during the WebSocket upgrade.
//!
//! Exact origins are compared byte for byte before any parsing. Everything
//! else must be an `https` origin whose host is on the list or under one of
//! the allowed suffixes.

use tracing::warn;
use url::Url;

use crate::config::OriginSettings;

#[derive(Debug, Clone, Default)]
pub struct OriginPolicy {
    exact_origins: Vec<String>,
    allowed_hosts: Vec<String>,
    allowed_host_suffixes: Vec<String>,
}

impl OriginPolicy {
    pub fn new(
        exact_origins: Vec<String>,
        allowed_hosts: Vec<String>,
        allowed_host_suffixes: Vec<String>,
    ) -> Self {
        Self {
            exact_origins,
            allowed_hosts,
            allowed_host_suffixes,
        }
    }

    /// `origin` is the raw `Origin` header value, if the request carried one.
    pub fn allows(&self, origin: Option<&str>) -> bool {
        let origin = match origin {
            Some(o) if !o.is_empty() => o,
            _ => {
                warn!("received empty origin");
                return false;
            }
        };

        if self.exact_origins.iter().any(|allowed| allowed == origin) {
            return true;
        }

        let parsed = match Url::parse(origin) {
            Ok(url) => url,
            Err(e) => {
                warn!(origin, "received invalid origin: {e}");
                return false;
            }
        };

        if parsed.scheme() != "https" {
            warn!(origin, "received non-https origin");
            return false;
        }

        let host = parsed.host_str().unwrap_or_default();
        let allowed = self.allowed_hosts.iter().any(|h| h == host)
            || self
                .allowed_host_suffixes
                .iter()
                .any(|suffix| host.ends_with(suffix.as_str()));

        if !allowed {
            warn!(origin, "received disallowed origin");
        }
        allowed
    }
}

impl From<&OriginSettings> for OriginPolicy {
    fn from(settings: &OriginSettings) -> Self {
        Self::new(
            settings.exact_origins.clone(),
            settings.allowed_hosts.clone(),
            settings.allowed_host_suffixes.clone(),
        )
    }
}
