//! Remote storage access, parameterized per tenant.
//!
//! The orchestrator depends only on the [`RemoteStorage`] trait; the S3
//! implementation covers any S3-compatible backend, and tests inject
//! in-memory doubles.

use crate::error::Result;
use crate::services::vhost::TenantConfig;
use async_trait::async_trait;
use bytes::Bytes;

pub mod s3;

pub use s3::S3Storage;

/// Client for a tenant's remote object store.
///
/// `fetch_bytes` and `resolve_url` are independent operations selected by
/// the request geometry: `resolve_url` is only ever called on the `remote`
/// redirect fast path and must not transfer object bytes.
#[async_trait]
pub trait RemoteStorage: Send + Sync {
    /// Fetch the raw bytes of `object_key` from the tenant's bucket.
    ///
    /// Fails with `RemoteNotFound` when the object does not exist upstream
    /// and `RemoteUnavailable` on transport-level failure.
    async fn fetch_bytes(&self, tenant: &TenantConfig, object_key: &str) -> Result<Bytes>;

    /// Resolve a stable, externally reachable URL for `object_key` without
    /// transferring its bytes.
    async fn resolve_url(&self, tenant: &TenantConfig, object_key: &str) -> Result<String>;
}
