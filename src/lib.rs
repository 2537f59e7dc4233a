//! media-gateway
//!
//! Read path of a multi-tenant file-storage gateway: given a request
//! encoding a tenant host, a directory, a transform geometry, and a
//! filename, it serves a cached rendering, a freshly generated thumbnail,
//! the original bytes, or a redirect to the file's remote location.

pub mod cache;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

// Public re-exports
pub use config::Config;
pub use error::{AppError, Result};
pub use handlers::AppState;
