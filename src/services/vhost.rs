/// Tenant resolution: request host -> storage configuration.
///
/// The tenant table is built once at startup from configuration and shared
/// read-only by every request, which satisfies the concurrency requirement
/// without any per-request locking.
use crate::error::{AppError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Storage configuration for one tenant (virtual host)
#[derive(Clone, Debug, Deserialize)]
pub struct TenantConfig {
    /// Remote bucket holding this tenant's objects
    pub bucket: String,
    /// Public base URL for this tenant's objects. When set, `resolve_url`
    /// joins it with the object key instead of presigning.
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Maps request hosts to tenant configurations
pub struct VHostResolver {
    tenants: HashMap<String, Arc<TenantConfig>>,
}

impl VHostResolver {
    pub fn new(tenants: HashMap<String, TenantConfig>) -> Self {
        Self {
            tenants: tenants
                .into_iter()
                .map(|(host, cfg)| (host, Arc::new(cfg)))
                .collect(),
        }
    }

    /// Resolve the tenant for a request host.
    ///
    /// An unresolvable host is a normal not-found outcome, not a system
    /// error; the orchestrator maps it to a 404.
    pub fn resolve(&self, host: &str) -> Result<Arc<TenantConfig>> {
        self.tenants
            .get(host)
            .cloned()
            .ok_or_else(|| AppError::UnknownTenant(host.to_string()))
    }

    pub fn len(&self) -> usize {
        self.tenants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tenants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> VHostResolver {
        let mut tenants = HashMap::new();
        tenants.insert(
            "example.com".to_string(),
            TenantConfig {
                bucket: "example-assets".to_string(),
                base_url: None,
            },
        );
        VHostResolver::new(tenants)
    }

    #[test]
    fn test_resolves_known_host() {
        let tenant = resolver().resolve("example.com").unwrap();
        assert_eq!(tenant.bucket, "example-assets");
    }

    #[test]
    fn test_unknown_host_is_unknown_tenant() {
        match resolver().resolve("nope.example") {
            Err(AppError::UnknownTenant(host)) => assert_eq!(host, "nope.example"),
            other => panic!("expected UnknownTenant, got {other:?}"),
        }
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let r = resolver();
        let a = r.resolve("example.com").unwrap();
        let b = r.resolve("example.com").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
