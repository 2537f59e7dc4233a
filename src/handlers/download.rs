//! Download orchestration.
//!
//! Composes tenant resolution, the local cache store, remote storage, and
//! the thumbnail pipeline into one request resolution sequence:
//!
//! - `remote` geometry serves a locally cached object as-is; when the
//!   object is not cached it resolves the remote URL and redirects,
//!   never transferring or caching the object bytes.
//! - `original` geometry serves the cached or freshly fetched bytes
//!   unmodified.
//! - Dimension geometries serve a cached rendering when one exists,
//!   otherwise render from the original and write the variant back.
//!
//! Originals fetched from remote storage are always cached under the
//! original key before serving, so later requests for any geometry of the
//! same object stay local.

use crate::error::{AppError, Result};
use crate::handlers::AppState;
use crate::models::{CacheKey, Geometry, OutputFormat, RequestDescriptor};
use crate::services::thumbnail::GeometrySpec;
use crate::services::vhost::TenantConfig;
use actix_web::http::header;
use actix_web::HttpResponse;
use bytes::Bytes;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

/// Resolve one parsed download request to an HTTP response
pub async fn serve(state: &AppState, descriptor: RequestDescriptor) -> Result<HttpResponse> {
    let tenant = state.vhosts.resolve(&descriptor.tenant_host)?;
    let format = OutputFormat::from_filename(&descriptor.filename);

    match Geometry::classify(&descriptor.geometry) {
        Geometry::Remote => {
            // A cached object is served directly; only cache misses become
            // redirects. Either way the object bytes never cross the wire
            // from remote storage for this geometry.
            let key = CacheKey::original(&descriptor);
            if let Some(bytes) = state.cache.read(&key).await? {
                debug!(%key, "cache hit, serving instead of redirecting");
                return Ok(ok_response(format, bytes));
            }
            redirect_to_source(state, &tenant, &descriptor).await
        }
        Geometry::Original => {
            let bytes = load_original(state, &tenant, &descriptor).await?;
            Ok(ok_response(format, bytes))
        }
        Geometry::Dimensions(token) => {
            serve_rendering(state, &tenant, &descriptor, &token, format).await
        }
    }
}

/// The `remote` cache-miss path: a pure URL-resolution + redirect shortcut.
///
/// Never writes the cache and never transfers object bytes; a missing
/// upstream object is a 404.
async fn redirect_to_source(
    state: &AppState,
    tenant: &Arc<TenantConfig>,
    descriptor: &RequestDescriptor,
) -> Result<HttpResponse> {
    let object_key = descriptor.object_key();
    let url = time_boxed(
        state.remote_timeout,
        state.storage.resolve_url(tenant, &object_key),
        &object_key,
    )
    .await?;

    debug!(%object_key, %url, "redirecting to remote location");
    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, url))
        .insert_header((header::CACHE_CONTROL, "private, no-cache"))
        .finish())
}

async fn serve_rendering(
    state: &AppState,
    tenant: &Arc<TenantConfig>,
    descriptor: &RequestDescriptor,
    geometry: &str,
    format: OutputFormat,
) -> Result<HttpResponse> {
    // Validate the token up front so a stale cached variant can never
    // answer for a geometry the grammar rejects.
    let spec = GeometrySpec::parse(geometry)?;

    let rendered_key = CacheKey::rendered(descriptor, geometry);
    if let Some(bytes) = state.cache.read(&rendered_key).await? {
        debug!(key = %rendered_key, "serving cached rendering");
        return Ok(ok_response(format, bytes));
    }

    let original = load_original(state, tenant, descriptor).await?;
    let rendered = state.thumbnailer.render(original, spec, format).await?;

    // The rendering cache is an optimization; a failed variant write must
    // not fail a request we can already answer.
    if let Err(e) = state.cache.write(&rendered_key, rendered.clone()).await {
        warn!(key = %rendered_key, "rendering cache write failed: {e}");
    }

    Ok(ok_response(format, rendered))
}

/// Serve the original bytes from cache, fetching and caching them on miss.
///
/// The cache write is atomic and mandatory: a failed remote fetch leaves no
/// entry behind, and a failed write is a cache error rather than a silently
/// uncached response.
async fn load_original(
    state: &AppState,
    tenant: &Arc<TenantConfig>,
    descriptor: &RequestDescriptor,
) -> Result<Bytes> {
    let key = CacheKey::original(descriptor);
    if let Some(bytes) = state.cache.read(&key).await? {
        debug!(%key, "cache hit");
        return Ok(bytes);
    }

    let object_key = descriptor.object_key();
    debug!(%key, %object_key, "cache miss, fetching from remote storage");
    let fetched = time_boxed(
        state.remote_timeout,
        state.storage.fetch_bytes(tenant, &object_key),
        &object_key,
    )
    .await?;

    state.cache.write(&key, fetched.clone()).await?;
    Ok(fetched)
}

async fn time_boxed<T>(
    limit: std::time::Duration,
    call: impl Future<Output = Result<T>>,
    object_key: &str,
) -> Result<T> {
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| AppError::RemoteUnavailable(format!("Timed out on {object_key}")))?
}

fn ok_response(format: OutputFormat, body: Bytes) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(format.content_type())
        .body(body)
}
