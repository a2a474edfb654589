//! Tenant identification
//!
//! Every request addresses exactly one tenant. The subdomain arrives either
//! in the `x-tenant-subdomain` header (set by the SPA's HTTP client) or as
//! the first label of the `Host` header.

use axum::http::HeaderMap;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

use crate::core::error::TenantError;

/// Header carrying the tenant subdomain explicitly.
pub const TENANT_HEADER: &str = "x-tenant-subdomain";

/// A validated tenant subdomain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TenantId(String);

fn subdomain_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?$").unwrap())
}

impl TenantId {
    /// Validate and wrap a subdomain label.
    pub fn parse(subdomain: &str) -> Result<Self, TenantError> {
        let subdomain = subdomain.trim().to_ascii_lowercase();
        if !subdomain_regex().is_match(&subdomain) {
            return Err(TenantError::InvalidSubdomain { subdomain });
        }
        Ok(Self(subdomain))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve the tenant from request headers.
    ///
    /// `x-tenant-subdomain` wins; otherwise the first label of `Host` is
    /// used, ignoring bare hosts like `localhost` or IP addresses.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, TenantError> {
        if let Some(value) = headers.get(TENANT_HEADER) {
            let raw = value.to_str().map_err(|_| TenantError::Missing)?;
            return Self::parse(raw);
        }

        if let Some(host) = headers.get(axum::http::header::HOST) {
            let host = host.to_str().map_err(|_| TenantError::Missing)?;
            if let Some(subdomain) = subdomain_of(host) {
                return Self::parse(subdomain);
            }
        }

        Err(TenantError::Missing)
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract the subdomain label of a host, if it has one.
///
/// `acme.app.example.com:8080` -> `acme`; `localhost` and IPs -> None.
fn subdomain_of(host: &str) -> Option<&str> {
    let host = host.split(':').next().unwrap_or(host);
    if host.parse::<std::net::IpAddr>().is_ok() {
        return None;
    }
    let mut labels = host.split('.');
    let first = labels.next()?;
    // Need at least two more labels (base domain + TLD) for a subdomain
    if labels.count() >= 2 { Some(first) } else { None }
}
