/// Error types for the gateway read path
///
/// Every failure is resolved to an HTTP status at the orchestrator boundary;
/// nothing leaks to the client as an unhandled fault. Absence of an object
/// (unknown tenant, missing remote object) is a normal 404, distinct from
/// transport failures upstream, which surface as 502.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::fmt;

/// Result type for gateway operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Debug)]
pub enum AppError {
    /// No tenant configuration exists for the request host
    UnknownTenant(String),

    /// The object does not exist in the tenant's remote storage
    RemoteNotFound(String),

    /// Remote storage exists but could not be reached (transport failure, timeout)
    RemoteUnavailable(String),

    /// The geometry token does not match the supported grammar
    UnsupportedGeometry(String),

    /// The cached or fetched bytes are not a decodable image
    DecodeError(String),

    /// Local cache store operation failed
    CacheError(String),

    /// Internal server error
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::UnknownTenant(host) => write!(f, "Unknown tenant: {}", host),
            AppError::RemoteNotFound(key) => write!(f, "Remote object not found: {}", key),
            AppError::RemoteUnavailable(msg) => write!(f, "Remote storage unavailable: {}", msg),
            AppError::UnsupportedGeometry(token) => write!(f, "Unsupported geometry: {}", token),
            AppError::DecodeError(msg) => write!(f, "Image decode failed: {}", msg),
            AppError::CacheError(msg) => write!(f, "Cache error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::UnknownTenant(_) | AppError::RemoteNotFound(_) => StatusCode::NOT_FOUND,
            AppError::RemoteUnavailable(_) => StatusCode::BAD_GATEWAY,
            AppError::UnsupportedGeometry(_) => StatusCode::BAD_REQUEST,
            AppError::DecodeError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::CacheError(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        // Not-found responses carry an empty body; everything else gets a
        // minimal JSON payload so callers can tell failure classes apart.
        if status == StatusCode::NOT_FOUND {
            return HttpResponse::NotFound().finish();
        }

        let error_type = match self {
            AppError::RemoteUnavailable(_) => "remote_unavailable",
            AppError::UnsupportedGeometry(_) => "unsupported_geometry",
            AppError::DecodeError(_) => "decode_error",
            _ => "server_error",
        };

        HttpResponse::build(status).json(serde_json::json!({
            "error": error_type,
            "message": self.to_string(),
        }))
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Internal(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Internal(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classes_map_to_404() {
        assert_eq!(
            AppError::UnknownTenant("nope.example".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::RemoteNotFound("dir/file.gif".into()).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_transport_failure_is_not_a_404() {
        assert_eq!(
            AppError::RemoteUnavailable("connect timeout".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_render_failures_are_distinct_from_not_found() {
        assert_eq!(
            AppError::UnsupportedGeometry("banana".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::DecodeError("not an image".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
