//! Error types for fortirest.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Main error type for fortirest operations.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Errors reported by the FortiOS API
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Client-side usage errors
    #[error("Client error: {0}")]
    Client(#[from] ClientError),
}

impl Error {
    /// Whether retrying the failed operation may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transport(e) => e.is_retryable(),
            Error::Api(e) => e.is_retryable(),
            Error::Client(_) => false,
        }
    }
}

/// Transport layer errors (connection, TLS, authentication).
#[derive(Error, Debug)]
pub enum TransportError {
    /// Failed to reach the device
    #[error("Connection failed to {host}:{port}: {source}")]
    ConnectionFailed {
        host: String,
        port: u16,
        #[source]
        source: reqwest::Error,
    },

    /// HTTP protocol error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Base URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Login was rejected by the device
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// No session established
    #[error("Not authenticated - call connect() first")]
    NotAuthenticated,

    /// Response body was not a valid API envelope
    #[error("Malformed API response: {0}")]
    Decode(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl TransportError {
    /// Whether retrying may succeed (timeouts and connection resets).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TransportError::Timeout(_) | TransportError::ConnectionFailed { .. }
        )
    }
}

/// Errors reported by the FortiOS REST API.
///
/// Produced by static lookup from the HTTP status and the CMDB error code
/// carried in the response envelope. The `path` fields hold the request path
/// that triggered the error.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request was malformed or carried invalid parameters
    #[error("Bad request at '{path}'")]
    BadRequest { path: String, code: Option<i64> },

    /// Missing or invalid credentials
    #[error("Authentication required")]
    AuthenticationRequired,

    /// The admin profile does not permit this operation
    #[error("Permission denied at '{path}'")]
    PermissionDenied { path: String },

    /// The addressed object does not exist
    #[error("Resource not found: '{path}'")]
    ResourceNotFound { path: String },

    /// HTTP method not supported on this endpoint
    #[error("Method not allowed at '{path}'")]
    MethodNotAllowed { path: String },

    /// Request body exceeded the device limit
    #[error("Request entity too large at '{path}'")]
    RequestTooLarge { path: String },

    /// The object is referenced by another object and cannot be changed
    #[error("Entry at '{path}' is in use")]
    EntryInUse { path: String },

    /// An object with the same mkey already exists
    #[error("Duplicate entry at '{path}'")]
    DuplicateEntry { path: String },

    /// An attribute value was rejected by the device
    #[error("Invalid value at '{path}'")]
    InvalidValue { path: String },

    /// Too many requests, the device is throttling this client
    #[error("Rate limit exceeded")]
    RateLimited,

    /// The device reported an internal failure
    #[error("Internal device error at '{path}' (code {code:?})")]
    Internal { path: String, code: Option<i64> },

    /// Status/code pair with no table entry
    #[error("Unexpected API response: HTTP {http_status} (code {code:?})")]
    Unexpected { http_status: u16, code: Option<i64> },
}

impl ApiError {
    /// Whether retrying may succeed. Only throttling and internal device
    /// failures qualify; everything else is a stable property of the request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::RateLimited | ApiError::Internal { .. })
    }

    /// Map a FortiOS HTTP status / CMDB error code pair to an error.
    ///
    /// The CMDB code takes precedence when present, since the device reuses
    /// generic HTTP statuses (most CMDB failures arrive as 500 or 404 with a
    /// more specific negative code in the envelope).
    pub(crate) fn classify(http_status: u16, code: Option<i64>, path: &str) -> ApiError {
        let path = path.to_string();

        match code {
            Some(-3) => return ApiError::ResourceNotFound { path },
            Some(-5) => return ApiError::DuplicateEntry { path },
            Some(-14) | Some(-15) => return ApiError::PermissionDenied { path },
            Some(-23) => return ApiError::EntryInUse { path },
            Some(-651) => return ApiError::InvalidValue { path },
            _ => {}
        }

        match http_status {
            400 => ApiError::BadRequest { path, code },
            401 => ApiError::AuthenticationRequired,
            403 => ApiError::PermissionDenied { path },
            404 => ApiError::ResourceNotFound { path },
            405 => ApiError::MethodNotAllowed { path },
            413 => ApiError::RequestTooLarge { path },
            424 => ApiError::EntryInUse { path },
            429 => ApiError::RateLimited,
            500..=599 => ApiError::Internal { path, code },
            _ => ApiError::Unexpected { http_status, code },
        }
    }
}

/// Client-side usage errors.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Invalid configuration in the client builder
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// A transaction is already bound to this client
    #[error("Transaction {id} is still pending on this client")]
    TransactionPending { id: u64 },

    /// The transaction-start response carried no transaction id
    #[error("Transaction start did not return a transaction id")]
    MissingTransactionId,

    /// No detached transaction to resume
    #[error("No pending transaction to resume")]
    NoTransaction,

    /// Response results did not match the expected shape
    #[error("Failed to decode results: {0}")]
    Decode(serde_json::Error),
}

/// Result type alias using fortirest's Error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmdb_code_takes_precedence() {
        // -5 (duplicate) arrives with HTTP 500 on real devices
        let err = ApiError::classify(500, Some(-5), "/api/v2/cmdb/firewall/address");
        assert!(matches!(err, ApiError::DuplicateEntry { .. }));

        let err = ApiError::classify(404, Some(-3), "/api/v2/cmdb/firewall/address/x");
        assert!(matches!(err, ApiError::ResourceNotFound { .. }));

        let err = ApiError::classify(500, Some(-23), "/api/v2/cmdb/firewall/address/x");
        assert!(matches!(err, ApiError::EntryInUse { .. }));

        let err = ApiError::classify(500, Some(-651), "/api/v2/cmdb/firewall/policy/1");
        assert!(matches!(err, ApiError::InvalidValue { .. }));
    }

    #[test]
    fn test_http_status_fallback() {
        assert!(matches!(
            ApiError::classify(404, None, "/x"),
            ApiError::ResourceNotFound { .. }
        ));
        assert!(matches!(
            ApiError::classify(401, None, "/x"),
            ApiError::AuthenticationRequired
        ));
        assert!(matches!(
            ApiError::classify(403, None, "/x"),
            ApiError::PermissionDenied { .. }
        ));
        assert!(matches!(ApiError::classify(429, None, "/x"), ApiError::RateLimited));
        assert!(matches!(
            ApiError::classify(424, None, "/x"),
            ApiError::EntryInUse { .. }
        ));
        assert!(matches!(
            ApiError::classify(503, None, "/x"),
            ApiError::Internal { .. }
        ));
        assert!(matches!(
            ApiError::classify(302, None, "/x"),
            ApiError::Unexpected { http_status: 302, .. }
        ));
    }

    #[test]
    fn test_retryable_classification() {
        assert!(ApiError::RateLimited.is_retryable());
        assert!(
            ApiError::Internal {
                path: "/x".into(),
                code: None
            }
            .is_retryable()
        );
        assert!(
            !ApiError::ResourceNotFound { path: "/x".into() }.is_retryable()
        );
        assert!(
            !ApiError::DuplicateEntry { path: "/x".into() }.is_retryable()
        );

        assert!(TransportError::Timeout(Duration::from_secs(5)).is_retryable());
        assert!(!TransportError::NotAuthenticated.is_retryable());

        let err: Error = ClientError::MissingTransactionId.into();
        assert!(!err.is_retryable());
    }
}
