//! HTTP transport implementation using reqwest.

use std::sync::RwLock;

use log::{debug, warn};
use reqwest::header::SET_COOKIE;
use reqwest::Method;
use secrecy::ExposeSecret;
use serde_json::Value;
use url::Url;

use super::config::{AuthMethod, ConnectConfig, TlsVerification};
use crate::client::response::ApiResponse;
use crate::error::{ApiError, Result, TransportError};
use crate::retry::RetryPolicy;

/// HTTPS transport wrapping a reqwest client.
///
/// All requests issued by [`FortiClient`](crate::FortiClient) funnel through
/// [`send`](HttpTransport::send), which applies authentication, maps transport
/// failures, unwraps the FortiOS envelope, and retries retryable errors per
/// the configured [`RetryPolicy`].
pub struct HttpTransport {
    /// The underlying HTTP client (cookie store enabled for session auth).
    http: reqwest::Client,

    /// Configuration used for this connection.
    config: ConnectConfig,

    /// Retry policy for retryable failures.
    retry: RetryPolicy,

    /// Session state (CSRF token, authenticated flag).
    session: RwLock<SessionState>,
}

#[derive(Debug, Default)]
struct SessionState {
    csrf_token: Option<String>,
    authenticated: bool,
}

impl HttpTransport {
    /// Build a transport from connection config and retry policy.
    ///
    /// API-key transports are usable immediately; credential transports
    /// require [`login`](HttpTransport::login) first.
    pub fn new(config: ConnectConfig, retry: RetryPolicy) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.timeout);

        if matches!(config.tls, TlsVerification::Disabled) {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let http = builder.build().map_err(TransportError::Http)?;

        // Bearer tokens need no login round-trip
        let authenticated = matches!(config.auth, AuthMethod::ApiKey(_));

        Ok(Self {
            http,
            config,
            retry,
            session: RwLock::new(SessionState {
                csrf_token: None,
                authenticated,
            }),
        })
    }

    /// The base URL this transport talks to.
    pub fn base_url(&self) -> &Url {
        &self.config.base_url
    }

    /// Whether a usable session exists.
    pub fn is_authenticated(&self) -> bool {
        self.session.read().map(|s| s.authenticated).unwrap_or(false)
    }

    /// Establish a session.
    ///
    /// A no-op for API-key auth. For credentials, POSTs the form to
    /// `/logincheck` and harvests the `ccsrftoken` cookie; the device
    /// signals rejected credentials by setting the token to `0%260`.
    pub async fn login(&self) -> Result<()> {
        let AuthMethod::Credentials { username, password } = &self.config.auth else {
            return Ok(());
        };

        let url = self
            .config
            .base_url
            .join("logincheck")
            .map_err(TransportError::InvalidUrl)?;

        let resp = self
            .http
            .post(url)
            .form(&[
                ("username", username.as_str()),
                ("secretkey", password.expose_secret()),
            ])
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !resp.status().is_success() {
            return Err(TransportError::AuthenticationFailed {
                user: username.clone(),
            }
            .into());
        }

        let token = resp
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(parse_csrf_cookie);

        match token {
            Some(token) if token != "0%260" => {
                debug!("session established for user '{}'", username);
                if let Ok(mut s) = self.session.write() {
                    s.csrf_token = Some(token);
                    s.authenticated = true;
                }
                Ok(())
            }
            _ => Err(TransportError::AuthenticationFailed {
                user: username.clone(),
            }
            .into()),
        }
    }

    /// Tear down the session.
    ///
    /// Credential sessions POST `/logoutcheck`; a failed logout is logged
    /// and otherwise ignored since the session cookie dies with the client.
    pub async fn logout(&self) -> Result<()> {
        if matches!(self.config.auth, AuthMethod::Credentials { .. }) && self.is_authenticated() {
            let url = self
                .config
                .base_url
                .join("logoutcheck")
                .map_err(TransportError::InvalidUrl)?;

            if let Err(e) = self.http.post(url).send().await {
                warn!("logout request failed: {}", e);
            }
        }

        if let Ok(mut s) = self.session.write() {
            s.csrf_token = None;
            s.authenticated = matches!(self.config.auth, AuthMethod::ApiKey(_));
        }
        Ok(())
    }

    /// Send a request, retrying retryable failures per the retry policy.
    pub async fn send(&self, method: Method, url: Url, body: Option<&Value>) -> Result<ApiResponse> {
        if !self.is_authenticated() {
            return Err(TransportError::NotAuthenticated.into());
        }

        let mut attempt = 0u32;
        loop {
            match self.send_once(method.clone(), url.clone(), body).await {
                Err(err) if err.is_retryable() && attempt < self.retry.max_retries => {
                    let delay = self.retry.delay(attempt);
                    debug!(
                        "retrying {} {} in {:?} ({})",
                        method,
                        url.path(),
                        delay,
                        err
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    async fn send_once(&self, method: Method, url: Url, body: Option<&Value>) -> Result<ApiResponse> {
        let mut req = self.http.request(method.clone(), url.clone());
        req = self.apply_auth(&method, req);
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await.map_err(|e| self.map_send_error(e))?;
        let http_status = resp.status().as_u16();
        let bytes = resp.bytes().await.map_err(TransportError::Http)?;

        let ok = (200..300).contains(&http_status);
        let parsed: std::result::Result<ApiResponse, serde_json::Error> = if bytes.is_empty() {
            Ok(ApiResponse::default())
        } else {
            serde_json::from_slice(&bytes)
        };

        match parsed {
            Ok(mut envelope) if ok && !envelope.is_error() => {
                envelope.http_status.get_or_insert(http_status);
                Ok(envelope)
            }
            Ok(envelope) => {
                let status = envelope.http_status.unwrap_or(http_status);
                Err(ApiError::classify(status, envelope.error, url.path()).into())
            }
            // Non-JSON error page: classify from the HTTP status alone
            Err(_) if !ok => Err(ApiError::classify(http_status, None, url.path()).into()),
            Err(e) => Err(TransportError::Decode(e).into()),
        }
    }

    /// Attach credentials: bearer header for API keys, CSRF header for
    /// session-authenticated writes (reads ride on the cookie alone).
    fn apply_auth(&self, method: &Method, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.auth {
            AuthMethod::ApiKey(key) => req.bearer_auth(key.expose_secret()),
            AuthMethod::Credentials { .. } => {
                if *method != Method::GET {
                    if let Some(token) = self
                        .session
                        .read()
                        .ok()
                        .and_then(|s| s.csrf_token.clone())
                    {
                        return req.header("X-CSRFTOKEN", token);
                    }
                }
                req
            }
        }
    }

    fn map_send_error(&self, err: reqwest::Error) -> crate::error::Error {
        if err.is_timeout() {
            TransportError::Timeout(self.config.timeout).into()
        } else if err.is_connect() {
            TransportError::ConnectionFailed {
                host: self
                    .config
                    .base_url
                    .host_str()
                    .unwrap_or_default()
                    .to_string(),
                port: self.config.base_url.port_or_known_default().unwrap_or(443),
                source: err,
            }
            .into()
        } else {
            TransportError::Http(err).into()
        }
    }
}

/// Extract the CSRF token value from one `Set-Cookie` header.
///
/// FortiOS quotes the value: `ccsrftoken="<token>"; path=/; ...`.
fn parse_csrf_cookie(cookie: &str) -> Option<String> {
    let rest = cookie.trim_start().strip_prefix("ccsrftoken=")?;
    let value = rest.split(';').next().unwrap_or(rest).trim();
    Some(value.trim_matches('"').to_string())
}
