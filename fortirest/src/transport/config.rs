//! Connection configuration.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// TLS certificate verification mode.
#[derive(Debug, Clone, Default)]
pub enum TlsVerification {
    /// Verify the device certificate against the system trust store.
    /// This is the default.
    #[default]
    Strict,

    /// Accept any certificate without checking. For testing and lab
    /// devices with self-signed certificates only.
    Disabled,
}

/// Connection configuration for a FortiOS device.
#[derive(Debug, Clone)]
pub struct ConnectConfig {
    /// Base URL of the management interface (e.g. `https://fw1:4443`).
    pub base_url: Url,

    /// Authentication method.
    pub auth: AuthMethod,

    /// Per-request timeout.
    pub timeout: Duration,

    /// TLS certificate verification mode.
    pub tls: TlsVerification,
}

/// Authentication method for the management API.
///
/// Secrets are held as [`SecretString`] and only exposed at header/form
/// construction time.
#[derive(Debug, Clone)]
pub enum AuthMethod {
    /// REST API access token, sent as `Authorization: Bearer`.
    /// Valid from the first request; no login round-trip.
    ApiKey(SecretString),

    /// Username/password session established via `/logincheck`.
    /// Write operations carry the `X-CSRFTOKEN` header harvested
    /// from the session cookie.
    Credentials {
        username: String,
        password: SecretString,
    },
}
