use crate::DomainError;
use std::sync::Arc;

/// Prevents the relay from calling itself, directly or through a subdomain
/// of its own domain.
#[derive(Debug, Clone)]
pub struct LoopGuard {
    own_domain: Arc<str>,
}

impl LoopGuard {
    pub fn new(own_domain: &str) -> Self {
        Self {
            own_domain: normalize(own_domain).into(),
        }
    }

    pub fn own_domain(&self) -> &str {
        &self.own_domain
    }

    /// True when `host` is the own domain or any name below it.
    pub fn matches_own_domain(&self, host: &str) -> bool {
        let host = normalize(host);
        if host.is_empty() || self.own_domain.is_empty() {
            return false;
        }

        if host == *self.own_domain {
            return true;
        }

        host.ends_with(&format!(".{}", self.own_domain))
    }

    /// Checks the target of an outbound call. Must run before the call is issued.
    ///
    /// Only absolute `http`/`https` URLs with a host pass. Scheme-relative and
    /// authority-form strings such as `http:relay.test` are rejected, since
    /// the outbound client reads their host differently.
    pub fn check_target(&self, url: &str) -> Result<(), DomainError> {
        let uri: http::Uri = url
            .parse()
            .map_err(|e| DomainError::InvalidPayload(format!("invalid url {}: {}", url, e)))?;

        match uri.scheme_str() {
            Some(scheme)
                if scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https") => {}
            _ => {
                return Err(DomainError::InvalidPayload(format!(
                    "url {} is not absolute http(s)",
                    url
                )))
            }
        }

        let host = uri
            .host()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| DomainError::InvalidPayload(format!("url {} has no host", url)))?;

        self.check_host(host)
    }

    pub fn check_host(&self, host: &str) -> Result<(), DomainError> {
        if self.matches_own_domain(host) {
            return Err(DomainError::LoopDetected {
                host: host.to_string(),
            });
        }
        Ok(())
    }

    /// Checks an inbound, non-tunnel query name routed back through the relay.
    pub fn check_query_name(&self, name: &str) -> Result<(), DomainError> {
        self.check_host(name)
    }
}

fn normalize(name: &str) -> String {
    name.trim()
        .trim_end_matches('.')
        .trim_start_matches('[')
        .trim_end_matches(']')
        .to_lowercase()
}
