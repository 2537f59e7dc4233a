/// Configuration management for the gateway
///
/// Loads configuration from environment variables with sensible defaults.
/// The tenant table is a JSON object in `GATEWAY_VHOSTS`, mapping request
/// hosts to their storage configuration:
///
/// ```json
/// {"cdn.example.com": {"bucket": "example-assets", "base_url": "https://assets.example.com"}}
/// ```
use crate::services::vhost::TenantConfig;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub cache: CacheConfig,
    pub storage: StorageConfig,
    pub render: RenderConfig,
    pub tenants: HashMap<String, TenantConfig>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub env: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CacheConfig {
    /// Root directory of the local byte cache
    pub dir: PathBuf,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StorageConfig {
    pub region: String,
    pub endpoint: Option<String>,
    /// Expiry for presigned GET URLs handed out by `resolve_url`
    pub presign_expiry_secs: u64,
    /// Time box on a single remote fetch
    pub fetch_timeout_secs: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RenderConfig {
    /// JPEG quality (0-100)
    pub jpeg_quality: u8,
    /// Upper bound on a requested output dimension, in pixels
    pub max_dimension: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 85,
            max_dimension: 4096,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let tenants = match std::env::var("GATEWAY_VHOSTS") {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|e| format!("Invalid GATEWAY_VHOSTS JSON: {e}"))?,
            Err(_) => HashMap::new(),
        };

        Ok(Config {
            app: AppConfig {
                host: std::env::var("GATEWAY_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("GATEWAY_PORT")
                    .unwrap_or_else(|_| "8084".to_string())
                    .parse()
                    .unwrap_or(8084),
                env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            },
            cache: CacheConfig {
                dir: std::env::var("GATEWAY_CACHE_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| std::env::temp_dir().join("media-gateway-cache")),
            },
            storage: StorageConfig {
                region: std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
                endpoint: std::env::var("S3_ENDPOINT").ok(),
                presign_expiry_secs: parse_env("S3_PRESIGN_EXPIRY_SECS", 900),
                fetch_timeout_secs: parse_env("REMOTE_FETCH_TIMEOUT_SECS", 30),
            },
            render: RenderConfig {
                jpeg_quality: parse_env("THUMBNAIL_JPEG_QUALITY", 85),
                max_dimension: parse_env("THUMBNAIL_MAX_DIMENSION", 4096),
            },
            tenants,
        })
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
