/// S3-compatible remote storage client.
///
/// One shared client serves every tenant; the bucket comes from the tenant
/// configuration per call. `resolve_url` prefers a tenant's public base URL
/// and falls back to a presigned GET for private buckets.
use crate::config::StorageConfig;
use crate::error::{AppError, Result};
use crate::services::storage::RemoteStorage;
use crate::services::vhost::TenantConfig;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client;
use bytes::Bytes;
use std::time::Duration;
use tracing::debug;

pub struct S3Storage {
    client: Client,
    presign_expiry: Duration,
}

impl S3Storage {
    /// Build a client from gateway configuration.
    ///
    /// Credentials come from the environment via the standard AWS provider
    /// chain. A custom endpoint (MinIO and friends) switches the client to
    /// path-style addressing.
    pub async fn from_config(cfg: &StorageConfig) -> Self {
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(cfg.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &cfg.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self {
            client: Client::from_conf(builder.build()),
            presign_expiry: Duration::from_secs(cfg.presign_expiry_secs),
        }
    }
}

#[async_trait]
impl RemoteStorage for S3Storage {
    async fn fetch_bytes(&self, tenant: &TenantConfig, object_key: &str) -> Result<Bytes> {
        let response = self
            .client
            .get_object()
            .bucket(&tenant.bucket)
            .key(object_key)
            .send()
            .await
            .map_err(|e| {
                let service_error = e.into_service_error();
                if service_error.is_no_such_key() {
                    AppError::RemoteNotFound(object_key.to_string())
                } else {
                    AppError::RemoteUnavailable(format!(
                        "GetObject failed for {object_key}: {service_error}"
                    ))
                }
            })?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| {
                AppError::RemoteUnavailable(format!("Failed to read object body: {e}"))
            })?
            .into_bytes();

        debug!(%object_key, size = data.len(), "fetched object from remote storage");
        Ok(data)
    }

    async fn resolve_url(&self, tenant: &TenantConfig, object_key: &str) -> Result<String> {
        if let Some(base) = &tenant.base_url {
            return Ok(format!(
                "{}/{}",
                base.trim_end_matches('/'),
                object_key.trim_start_matches('/')
            ));
        }

        let presigning = PresigningConfig::builder()
            .expires_in(self.presign_expiry)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create presigning config: {e}")))?;

        let presigned = self
            .client
            .get_object()
            .bucket(&tenant.bucket)
            .key(object_key)
            .presigned(presigning)
            .await
            .map_err(|e| {
                AppError::RemoteUnavailable(format!("Failed to presign URL for {object_key}: {e}"))
            })?;

        Ok(presigned.uri().to_string())
    }
}
