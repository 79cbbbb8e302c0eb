//! Builder for creating FortiOS clients.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use super::FortiClient;
use crate::api::Scope;
use crate::audit::AuditSink;
use crate::error::{ClientError, Result, TransportError};
use crate::retry::RetryPolicy;
use crate::transport::{AuthMethod, ConnectConfig, HttpTransport, TlsVerification};

/// Builder for constructing [`FortiClient`] instances.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use fortirest::{FortiClient, RetryPolicy, TlsVerification};
///
/// # fn example() -> Result<(), fortirest::Error> {
/// let client = FortiClient::builder("192.0.2.10")
///     .port(4443)
///     .credentials("admin", "secret")
///     .vdom("root")
///     .timeout(Duration::from_secs(10))
///     .tls_verification(TlsVerification::Disabled)
///     .retry(RetryPolicy::new(3))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    host: String,
    port: Option<u16>,
    auth: Option<AuthMethod>,
    scope: Option<Scope>,
    timeout: Duration,
    tls: TlsVerification,
    retry: RetryPolicy,
    audit: Option<Arc<dyn AuditSink>>,
}

impl ClientBuilder {
    /// Create a new builder for the specified host.
    ///
    /// `host` may be a bare hostname or IP (`https` on 443 assumed),
    /// `host:port`, or a full URL including scheme.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            auth: None,
            scope: None,
            timeout: Duration::from_secs(30),
            tls: TlsVerification::default(),
            retry: RetryPolicy::default(),
            audit: None,
        }
    }

    /// Set the management port (default: 443).
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Authenticate with a REST API access token.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.auth = Some(AuthMethod::ApiKey(SecretString::from(key.into())));
        self
    }

    /// Authenticate with an admin username and password session.
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = Some(AuthMethod::Credentials {
            username: username.into(),
            password: SecretString::from(password.into()),
        });
        self
    }

    /// Set the default VDOM for requests.
    pub fn vdom(mut self, vdom: impl Into<String>) -> Self {
        self.scope = Some(Scope::Vdom(vdom.into()));
        self
    }

    /// Scope requests to the global configuration by default.
    pub fn global_scope(mut self) -> Self {
        self.scope = Some(Scope::Global);
        self
    }

    /// Set the per-request timeout (default: 30 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the TLS certificate verification mode.
    pub fn tls_verification(mut self, tls: TlsVerification) -> Self {
        self.tls = tls;
        self
    }

    /// Set the retry policy for retryable failures (default: no retries).
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Attach an audit sink; one event is recorded per API request.
    pub fn audit(mut self, sink: impl AuditSink + 'static) -> Self {
        self.audit = Some(Arc::new(sink));
        self
    }

    /// Build the client.
    ///
    /// This does not contact the device. Call
    /// [`connect`](FortiClient::connect) on the returned client to
    /// authenticate and verify reachability.
    pub fn build(self) -> Result<FortiClient> {
        let auth = self.auth.ok_or_else(|| ClientError::InvalidConfig {
            message: "An authentication method is required".to_string(),
        })?;

        let mut base_url = if self.host.contains("://") {
            Url::parse(&self.host).map_err(TransportError::InvalidUrl)?
        } else {
            Url::parse(&format!("https://{}", self.host)).map_err(TransportError::InvalidUrl)?
        };

        if let Some(port) = self.port {
            base_url
                .set_port(Some(port))
                .map_err(|_| ClientError::InvalidConfig {
                    message: format!("Cannot set port on '{}'", base_url),
                })?;
        }

        let config = ConnectConfig {
            base_url,
            auth,
            timeout: self.timeout,
            tls: self.tls,
        };

        let transport = HttpTransport::new(config, self.retry)?;
        Ok(FortiClient::from_parts(transport, self.scope, self.audit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_host_becomes_https() {
        let client = ClientBuilder::new("fw1.example.com")
            .api_key("k")
            .build()
            .unwrap();
        assert!(client.is_authenticated());
    }

    #[test]
    fn test_host_with_port_and_scheme() {
        assert!(
            ClientBuilder::new("http://127.0.0.1:8080")
                .api_key("k")
                .build()
                .is_ok()
        );
        assert!(
            ClientBuilder::new("10.0.0.1:4443")
                .api_key("k")
                .build()
                .is_ok()
        );
    }

    #[test]
    fn test_auth_is_required() {
        let err = ClientBuilder::new("fw1").build().unwrap_err();
        assert!(err.to_string().contains("authentication method"));
    }

    #[test]
    fn test_invalid_host_is_rejected() {
        assert!(ClientBuilder::new("not a url").api_key("k").build().is_err());
    }
}
