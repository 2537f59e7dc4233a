//! Request handling: the download orchestrator and the shared state it
//! runs against.

use crate::cache::ByteCache;
use crate::services::storage::RemoteStorage;
use crate::services::thumbnail::Thumbnailer;
use crate::services::vhost::VHostResolver;
use std::sync::Arc;
use std::time::Duration;

pub mod download;

/// Shared, read-only state for the download orchestrator.
///
/// Built once at startup and shared across all requests; the orchestrator
/// itself holds no cross-request mutable state.
pub struct AppState {
    pub vhosts: VHostResolver,
    pub cache: Arc<dyn ByteCache>,
    pub storage: Arc<dyn RemoteStorage>,
    pub thumbnailer: Arc<Thumbnailer>,
    /// Time box on a single remote storage call
    pub remote_timeout: Duration,
}
