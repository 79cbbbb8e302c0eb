//! High-level client for the FortiOS management API.
//!
//! The client layer provides the main API for issuing requests against
//! the CMDB, monitor, log, and service namespaces of a FortiOS device.

mod builder;
pub(crate) mod response;
pub mod transaction;

pub use builder::ClientBuilder;
pub use response::ApiResponse;
pub use transaction::Transaction;

use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use chrono::Utc;
use log::debug;
use reqwest::Method;
use serde_json::Value;
use url::Url;

use crate::api::{Cmdb, Log, Monitor, Namespace, Query, Scope, Service};
use crate::audit::{AuditEvent, AuditSink};
use crate::error::{ClientError, Result};
use crate::transport::HttpTransport;

/// Device identity cached from response envelopes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Firmware version (e.g. "v7.4.1").
    pub version: String,

    /// Device serial number.
    pub serial: Option<String>,

    /// Firmware build number.
    pub build: Option<i64>,
}

/// Client for a single FortiOS device.
///
/// Constructed via [`ClientBuilder`]; cheap per-namespace handles are
/// returned by [`cmdb`](FortiClient::cmdb), [`monitor`](FortiClient::monitor),
/// [`log`](FortiClient::log), and [`service`](FortiClient::service).
///
/// # Example
///
/// ```rust,no_run
/// use fortirest::{FortiClient, Query};
///
/// # async fn example() -> Result<(), fortirest::Error> {
/// let mut client = FortiClient::builder("fw1.example.com")
///     .api_key("p3g1hn5jQw...")
///     .vdom("root")
///     .build()?;
///
/// client.connect().await?;
///
/// let addresses = client.cmdb().list("firewall", "address", &Query::new()).await?;
/// println!("{} address objects", addresses.len());
///
/// client.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct FortiClient {
    /// HTTPS transport.
    transport: HttpTransport,

    /// Default VDOM scope, applied when a query carries none.
    scope: Option<Scope>,

    /// Audit sink for per-request events.
    audit: Option<Arc<dyn AuditSink>>,

    /// Transaction currently bound to this client.
    pub(crate) txid: Option<u64>,

    /// Device identity from the last envelope that carried one.
    device: RwLock<Option<DeviceInfo>>,
}

impl std::fmt::Debug for FortiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FortiClient")
            .field("scope", &self.scope)
            .field("audit", &self.audit.is_some())
            .field("txid", &self.txid)
            .field("device", &self.device)
            .finish_non_exhaustive()
    }
}

impl FortiClient {
    /// Start building a client for the given host.
    ///
    /// `host` may be a bare hostname/IP, `host:port`, or a full URL.
    pub fn builder(host: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(host)
    }

    pub(crate) fn from_parts(
        transport: HttpTransport,
        scope: Option<Scope>,
        audit: Option<Arc<dyn AuditSink>>,
    ) -> Self {
        Self {
            transport,
            scope,
            audit,
            txid: None,
            device: RwLock::new(None),
        }
    }

    /// Authenticate and verify reachability.
    ///
    /// Establishes the session (a login round-trip for credential auth, a
    /// no-op for API keys) and probes `monitor/system/status` to validate
    /// the credentials and cache the device identity.
    pub async fn connect(&mut self) -> Result<()> {
        self.transport.login().await?;
        self.request(Method::GET, Namespace::Monitor, "system/status", None, &Query::new(), None)
            .await?;
        Ok(())
    }

    /// Tear down the session.
    pub async fn close(&mut self) -> Result<()> {
        self.transport.logout().await
    }

    /// Whether a usable session exists.
    pub fn is_authenticated(&self) -> bool {
        self.transport.is_authenticated()
    }

    /// Device identity, if any response has carried one yet.
    /// [`connect`](FortiClient::connect) populates this.
    pub fn device_info(&self) -> Option<DeviceInfo> {
        self.device.read().ok().and_then(|d| d.clone())
    }

    /// The default scope applied to requests.
    pub fn scope(&self) -> Option<&Scope> {
        self.scope.as_ref()
    }

    /// Set the default VDOM for subsequent requests.
    pub fn set_vdom(&mut self, vdom: impl Into<String>) {
        self.scope = Some(Scope::Vdom(vdom.into()));
    }

    /// Scope subsequent requests to the global configuration.
    pub fn set_global_scope(&mut self) {
        self.scope = Some(Scope::Global);
    }

    /// The id of the transaction bound to this client, if any.
    pub fn pending_transaction(&self) -> Option<u64> {
        self.txid
    }

    /// Handle for the configuration database namespace.
    pub fn cmdb(&self) -> Cmdb<'_> {
        Cmdb::new(self)
    }

    /// Handle for the monitor namespace.
    pub fn monitor(&self) -> Monitor<'_> {
        Monitor::new(self)
    }

    /// Handle for the log namespace.
    pub fn log(&self) -> Log<'_> {
        Log::new(self)
    }

    /// Handle for the service namespace.
    pub fn service(&self) -> Service<'_> {
        Service::new(self)
    }

    /// Start a CMDB transaction with the given server-side timeout.
    ///
    /// Shorthand for [`Transaction::begin`].
    pub async fn transaction(&mut self, timeout: Duration) -> Result<Transaction<'_>> {
        Transaction::begin(self, timeout).await
    }

    /// Issue a request against an arbitrary endpoint.
    ///
    /// This is the escape hatch the namespace handles are built on:
    /// `mkey`, when present, is appended as a single (encoded) path
    /// segment after `path`.
    pub async fn request(
        &self,
        method: Method,
        namespace: Namespace,
        path: &str,
        mkey: Option<&str>,
        query: &Query,
        body: Option<&Value>,
    ) -> Result<ApiResponse> {
        let url = self.build_url(namespace, path, mkey, query)?;
        debug!("{} {}", method, url.path());

        let mut full_path = if path.is_empty() {
            namespace.as_str().to_string()
        } else {
            format!("{}/{}", namespace.as_str(), path)
        };
        if let Some(mkey) = mkey {
            full_path.push('/');
            full_path.push_str(mkey);
        }
        let vdom = query.scope().or(self.scope.as_ref()).map(|s| match s {
            Scope::Vdom(v) => v.clone(),
            Scope::Global => "global".to_string(),
        });

        let started = Instant::now();
        let result = self.transport.send(method.clone(), url, body).await;

        if let Ok(resp) = &result {
            self.cache_device_info(resp);
        }
        self.record_audit(&method, full_path, vdom, &result, started.elapsed());

        result
    }

    fn build_url(
        &self,
        namespace: Namespace,
        path: &str,
        mkey: Option<&str>,
        query: &Query,
    ) -> Result<Url> {
        let mut url = self.transport.base_url().clone();

        {
            let mut segments = url.path_segments_mut().map_err(|_| ClientError::InvalidConfig {
                message: "base URL cannot be an opaque URL".to_string(),
            })?;
            segments.pop_if_empty();
            segments.push("api");
            segments.push("v2");
            segments.push(namespace.as_str());
            for segment in path.split('/').filter(|s| !s.is_empty()) {
                segments.push(segment);
            }
            // An mkey is one segment even when it contains '/'
            if let Some(mkey) = mkey {
                segments.push(mkey);
            }
        }

        let scope = query.scope().or(self.scope.as_ref());
        let query_pairs = query.pairs();
        if scope.is_some() || self.txid.is_some() || !query_pairs.is_empty() {
            let mut pairs = url.query_pairs_mut();
            if let Some(scope) = scope {
                let (key, value) = scope.pair();
                pairs.append_pair(key, &value);
            }
            if let Some(id) = self.txid {
                pairs.append_pair("transaction", &id.to_string());
            }
            for (key, value) in &query_pairs {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    fn cache_device_info(&self, resp: &ApiResponse) {
        if let Some(version) = &resp.version {
            if let Ok(mut device) = self.device.write() {
                *device = Some(DeviceInfo {
                    version: version.clone(),
                    serial: resp.serial.clone(),
                    build: resp.build,
                });
            }
        }
    }

    fn record_audit(
        &self,
        method: &Method,
        full_path: String,
        vdom: Option<String>,
        result: &Result<ApiResponse>,
        elapsed: Duration,
    ) {
        let Some(sink) = &self.audit else {
            return;
        };

        let event = match result {
            Ok(resp) => AuditEvent {
                timestamp: Utc::now(),
                method: method.as_str().to_string(),
                path: full_path,
                vdom,
                outcome: "success".to_string(),
                http_status: resp.http_status,
                error: None,
                elapsed_ms: elapsed.as_millis() as u64,
            },
            Err(err) => AuditEvent {
                timestamp: Utc::now(),
                method: method.as_str().to_string(),
                path: full_path,
                vdom,
                outcome: "error".to_string(),
                http_status: None,
                error: Some(err.to_string()),
                elapsed_ms: elapsed.as_millis() as u64,
            },
        };

        sink.record(&event);
    }
}
