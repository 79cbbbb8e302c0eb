//! Log namespace: reading device logs.

use reqwest::Method;
use serde_json::Value;

use super::query::Query;
use super::Namespace;
use crate::client::FortiClient;
use crate::error::Result;

/// Where the device stores the logs being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogDevice {
    /// Local disk storage.
    Disk,
    /// In-memory log buffer.
    Memory,
    /// Logs forwarded to a FortiAnalyzer.
    Fortianalyzer,
}

impl LogDevice {
    /// The URL segment for this log device.
    pub fn as_str(self) -> &'static str {
        match self {
            LogDevice::Disk => "disk",
            LogDevice::Memory => "memory",
            LogDevice::Fortianalyzer => "fortianalyzer",
        }
    }
}

/// Handle for the log namespace.
///
/// Logs are addressed by device and type path, e.g.
/// `(LogDevice::Disk, "traffic/forward")` or
/// `(LogDevice::Memory, "event/system")`. Paging rides on the
/// query's `start`/`count` parameters. Obtain via [`FortiClient::log`].
pub struct Log<'a> {
    client: &'a FortiClient,
}

impl<'a> Log<'a> {
    pub(crate) fn new(client: &'a FortiClient) -> Self {
        Self { client }
    }

    /// Read log entries.
    pub async fn get(&self, device: LogDevice, log_type: &str, query: &Query) -> Result<Vec<Value>> {
        let resp = self
            .client
            .request(
                Method::GET,
                Namespace::Log,
                &format!("{}/{}", device.as_str(), log_type),
                None,
                query,
                None,
            )
            .await?;
        Ok(resp.result_list())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::ClientBuilder;

    #[tokio::test]
    async fn test_log_read_with_paging() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v2/log/memory/event/system"))
            .and(query_param("start", "0"))
            .and(query_param("count", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "http_status": 200,
                "results": [
                    {"logid": "0100032001", "action": "login"},
                    {"logid": "0100032002", "action": "logout"}
                ],
            })))
            .mount(&server)
            .await;

        let client = ClientBuilder::new(server.uri())
            .api_key("test-key")
            .build()
            .unwrap();

        let entries = client
            .log()
            .get(
                LogDevice::Memory,
                "event/system",
                &Query::new().start(0).count(2),
            )
            .await
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1]["action"], "logout");
    }
}
