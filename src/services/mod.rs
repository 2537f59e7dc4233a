//! Gateway services: tenant resolution, remote storage access, and the
//! thumbnail pipeline.

pub mod storage;
pub mod thumbnail;
pub mod vhost;

pub use storage::{RemoteStorage, S3Storage};
pub use thumbnail::{GeometrySpec, Thumbnailer};
pub use vhost::{TenantConfig, VHostResolver};
