//! Monitor namespace: runtime state and imperative actions.

use reqwest::Method;
use serde_json::Value;

use super::query::Query;
use super::Namespace;
use crate::client::response::ApiResponse;
use crate::client::FortiClient;
use crate::error::Result;

/// Handle for the monitor namespace.
///
/// Endpoints are addressed by their full path below `/api/v2/monitor`
/// (e.g. `"system/status"`, `"firewall/session"`). Obtain via
/// [`FortiClient::monitor`].
pub struct Monitor<'a> {
    client: &'a FortiClient,
}

impl<'a> Monitor<'a> {
    pub(crate) fn new(client: &'a FortiClient) -> Self {
        Self { client }
    }

    /// Read runtime state from an endpoint, returning its results.
    pub async fn get(&self, path: &str, query: &Query) -> Result<Value> {
        let resp = self
            .client
            .request(Method::GET, Namespace::Monitor, path, None, query, None)
            .await?;
        Ok(resp.results.unwrap_or(Value::Null))
    }

    /// Read the `select` view of an endpoint.
    pub async fn select(&self, path: &str, query: &Query) -> Result<Value> {
        self.get(&format!("{}/select", path), query).await
    }

    /// Invoke an imperative action (e.g. `system/os` + `reboot`).
    pub async fn action(&self, path: &str, action: &str, body: &Value) -> Result<ApiResponse> {
        self.client
            .request(
                Method::POST,
                Namespace::Monitor,
                &format!("{}/{}", path, action),
                None,
                &Query::new(),
                Some(body),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::{ClientBuilder, Query};

    #[tokio::test]
    async fn test_status_read_and_action() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v2/monitor/system/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "http_status": 200,
                "results": {"hostname": "fw1", "model_name": "FortiGate"},
                "version": "v7.4.1",
                "serial": "FGT60F0000000001",
                "build": 2463,
            })))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/v2/monitor/system/os/reboot"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "http_status": 200,
            })))
            .mount(&server)
            .await;

        let client = ClientBuilder::new(server.uri())
            .api_key("test-key")
            .build()
            .unwrap();

        let status = client
            .monitor()
            .get("system/status", &Query::new())
            .await
            .unwrap();
        assert_eq!(status["hostname"], "fw1");

        // The envelope's identity fields land in the device cache
        let info = client.device_info().unwrap();
        assert_eq!(info.version, "v7.4.1");
        assert_eq!(info.build, Some(2463));

        client
            .monitor()
            .action("system/os", "reboot", &json!({"event_log_message": "scheduled"}))
            .await
            .unwrap();
    }
}
