//! Local cache store: a content-addressed key/value byte store.
//!
//! The orchestrator only depends on the [`ByteCache`] trait, so tests can
//! inject in-memory doubles and deployments can swap the backing store.

use crate::error::Result;
use crate::models::CacheKey;
use async_trait::async_trait;
use bytes::Bytes;

pub mod disk;

pub use disk::FileStore;

/// Key/value byte store with read-after-write consistency.
///
/// `write` is idempotent, last write wins, and must be atomic: a concurrent
/// reader sees either the previous entry or the complete new one, never a
/// partial payload.
#[async_trait]
pub trait ByteCache: Send + Sync {
    /// Read the payload stored under `key`, or `None` if absent
    async fn read(&self, key: &CacheKey) -> Result<Option<Bytes>>;

    /// Store `payload` under `key`, replacing any previous entry wholesale
    async fn write(&self, key: &CacheKey, payload: Bytes) -> Result<()>;
}
