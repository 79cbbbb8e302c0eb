//! Configuration database (CMDB) operations.

use reqwest::Method;
use serde_json::Value;

use super::query::Query;
use super::schema::ObjectSchema;
use super::Namespace;
use crate::client::response::ApiResponse;
use crate::client::FortiClient;
use crate::error::{ApiError, Error, Result};

/// Position argument for [`Cmdb::move_entry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovePosition {
    /// Place the object before the reference mkey.
    Before,
    /// Place the object after the reference mkey.
    After,
}

impl MovePosition {
    fn as_str(self) -> &'static str {
        match self {
            MovePosition::Before => "before",
            MovePosition::After => "after",
        }
    }
}

/// Handle for the CMDB namespace.
///
/// Tables are addressed by `path` and `name` (e.g. `"firewall"`,
/// `"address"`), objects within a table by their mkey. Obtain via
/// [`FortiClient::cmdb`].
pub struct Cmdb<'a> {
    client: &'a FortiClient,
}

impl<'a> Cmdb<'a> {
    pub(crate) fn new(client: &'a FortiClient) -> Self {
        Self { client }
    }

    /// List the objects in a table.
    pub async fn list(&self, path: &str, name: &str, query: &Query) -> Result<Vec<Value>> {
        let resp = self
            .client
            .request(
                Method::GET,
                Namespace::Cmdb,
                &table_path(path, name),
                None,
                query,
                None,
            )
            .await?;
        Ok(resp.result_list())
    }

    /// Fetch a single object by mkey.
    pub async fn get(&self, path: &str, name: &str, mkey: &str, query: &Query) -> Result<Value> {
        let resp = self
            .client
            .request(
                Method::GET,
                Namespace::Cmdb,
                &table_path(path, name),
                Some(mkey),
                query,
                None,
            )
            .await?;

        resp.first_result().ok_or_else(|| {
            ApiError::ResourceNotFound {
                path: format!("/api/v2/cmdb/{}/{}/{}", path, name, mkey),
            }
            .into()
        })
    }

    /// Check whether an object exists.
    ///
    /// Maps `ResourceNotFound` to `false`; every other error propagates.
    pub async fn exists(&self, path: &str, name: &str, mkey: &str) -> Result<bool> {
        match self.get(path, name, mkey, &Query::new()).await {
            Ok(_) => Ok(true),
            Err(Error::Api(ApiError::ResourceNotFound { .. })) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Create a new object. `data` must carry the table's mkey field.
    pub async fn create(&self, path: &str, name: &str, data: &Value) -> Result<ApiResponse> {
        self.client
            .request(
                Method::POST,
                Namespace::Cmdb,
                &table_path(path, name),
                None,
                &Query::new(),
                Some(data),
            )
            .await
    }

    /// Update an existing object.
    pub async fn update(
        &self,
        path: &str,
        name: &str,
        mkey: &str,
        data: &Value,
    ) -> Result<ApiResponse> {
        self.client
            .request(
                Method::PUT,
                Namespace::Cmdb,
                &table_path(path, name),
                Some(mkey),
                &Query::new(),
                Some(data),
            )
            .await
    }

    /// Update an object, creating it if it does not exist.
    ///
    /// Tries a PUT first and falls back to POST on `ResourceNotFound`, so
    /// `data` must carry the mkey field for the create path.
    pub async fn set(&self, path: &str, name: &str, mkey: &str, data: &Value) -> Result<ApiResponse> {
        match self.update(path, name, mkey, data).await {
            Err(Error::Api(ApiError::ResourceNotFound { .. })) => {
                self.create(path, name, data).await
            }
            other => other,
        }
    }

    /// Delete an object by mkey.
    pub async fn delete(&self, path: &str, name: &str, mkey: &str) -> Result<ApiResponse> {
        self.client
            .request(
                Method::DELETE,
                Namespace::Cmdb,
                &table_path(path, name),
                Some(mkey),
                &Query::new(),
                None,
            )
            .await
    }

    /// Delete every object in a table (`action=purge`).
    pub async fn purge(&self, path: &str, name: &str) -> Result<ApiResponse> {
        self.client
            .request(
                Method::DELETE,
                Namespace::Cmdb,
                &table_path(path, name),
                None,
                &Query::new().action("purge"),
                None,
            )
            .await
    }

    /// Fetch the table schema (`action=schema`).
    pub async fn schema(&self, path: &str, name: &str) -> Result<ObjectSchema> {
        let resp = self
            .client
            .request(
                Method::GET,
                Namespace::Cmdb,
                &table_path(path, name),
                None,
                &Query::new().action("schema"),
                None,
            )
            .await?;
        ObjectSchema::from_results(resp.results.as_ref().unwrap_or(&Value::Null))
    }

    /// Fetch the table's default values (`action=default`).
    pub async fn defaults(&self, path: &str, name: &str) -> Result<Value> {
        let resp = self
            .client
            .request(
                Method::GET,
                Namespace::Cmdb,
                &table_path(path, name),
                None,
                &Query::new().action("default"),
                None,
            )
            .await?;
        Ok(resp.results.unwrap_or(Value::Null))
    }

    /// Reorder an object relative to another (`action=move`).
    ///
    /// Only meaningful for sequence-ordered tables such as firewall
    /// policies.
    pub async fn move_entry(
        &self,
        path: &str,
        name: &str,
        mkey: &str,
        position: MovePosition,
        reference: &str,
    ) -> Result<ApiResponse> {
        self.client
            .request(
                Method::PUT,
                Namespace::Cmdb,
                &table_path(path, name),
                Some(mkey),
                &Query::new()
                    .action("move")
                    .param(position.as_str(), reference),
                None,
            )
            .await
    }

    /// Copy an object under a new mkey (`action=clone`).
    pub async fn clone_entry(
        &self,
        path: &str,
        name: &str,
        mkey: &str,
        new_mkey: &str,
    ) -> Result<ApiResponse> {
        self.client
            .request(
                Method::POST,
                Namespace::Cmdb,
                &table_path(path, name),
                Some(mkey),
                &Query::new().action("clone").param("nkey", new_mkey),
                None,
            )
            .await
    }
}

fn table_path(path: &str, name: &str) -> String {
    format!("{}/{}", path, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::{ClientBuilder, Filter};

    async fn test_client(server: &MockServer) -> FortiClient {
        ClientBuilder::new(server.uri())
            .api_key("test-key")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_list_sends_bearer_and_filters() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v2/cmdb/firewall/address"))
            .and(header("Authorization", "Bearer test-key"))
            .and(query_param("filter", "type==ipmask"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "http_status": 200,
                "results": [{"name": "all"}, {"name": "lan"}],
                "vdom": "root",
            })))
            .mount(&server)
            .await;

        let client = test_client(&server).await;
        let addrs = client
            .cmdb()
            .list(
                "firewall",
                "address",
                &Query::new().filter(Filter::eq("type", "ipmask")),
            )
            .await
            .unwrap();

        assert_eq!(addrs.len(), 2);
        assert_eq!(addrs[0]["name"], "all");
    }

    #[tokio::test]
    async fn test_get_unwraps_single_object() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v2/cmdb/firewall/address/lan"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "http_status": 200,
                "results": [{"name": "lan", "subnet": "10.0.0.0 255.255.255.0"}],
            })))
            .mount(&server)
            .await;

        let client = test_client(&server).await;
        let addr = client
            .cmdb()
            .get("firewall", "address", "lan", &Query::new())
            .await
            .unwrap();
        assert_eq!(addr["subnet"], "10.0.0.0 255.255.255.0");
    }

    #[tokio::test]
    async fn test_exists_maps_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v2/cmdb/firewall/address/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "status": "error",
                "http_status": 404,
                "error": -3,
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v2/cmdb/firewall/address/lan"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "results": [{"name": "lan"}],
            })))
            .mount(&server)
            .await;

        let client = test_client(&server).await;
        assert!(!client.cmdb().exists("firewall", "address", "missing").await.unwrap());
        assert!(client.cmdb().exists("firewall", "address", "lan").await.unwrap());
    }

    #[tokio::test]
    async fn test_set_falls_back_to_create() {
        let server = MockServer::start().await;
        let data = json!({"name": "dmz", "subnet": "172.16.0.0 255.255.0.0"});

        Mock::given(method("PUT"))
            .and(path("/api/v2/cmdb/firewall/address/dmz"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "status": "error",
                "http_status": 404,
                "error": -3,
            })))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/v2/cmdb/firewall/address"))
            .and(body_json(data.clone()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "http_status": 200,
                "mkey": "dmz",
            })))
            .mount(&server)
            .await;

        let client = test_client(&server).await;
        let resp = client
            .cmdb()
            .set("firewall", "address", "dmz", &data)
            .await
            .unwrap();
        assert_eq!(resp.mkey_str().as_deref(), Some("dmz"));
    }

    #[tokio::test]
    async fn test_duplicate_create_maps_to_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v2/cmdb/firewall/address"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "status": "error",
                "http_status": 500,
                "error": -5,
            })))
            .mount(&server)
            .await;

        let client = test_client(&server).await;
        let err = client
            .cmdb()
            .create("firewall", "address", &json!({"name": "all"}))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Api(ApiError::DuplicateEntry { .. })
        ));
    }

    #[tokio::test]
    async fn test_move_and_clone_params() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/api/v2/cmdb/firewall/policy/4"))
            .and(query_param("action", "move"))
            .and(query_param("after", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/v2/cmdb/firewall/policy/4"))
            .and(query_param("action", "clone"))
            .and(query_param("nkey", "9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
            .mount(&server)
            .await;

        let client = test_client(&server).await;
        client
            .cmdb()
            .move_entry("firewall", "policy", "4", MovePosition::After, "2")
            .await
            .unwrap();
        client
            .cmdb()
            .clone_entry("firewall", "policy", "4", "9")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_mkey_with_slash_is_encoded() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v2/cmdb/firewall/address/net%2F24"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "results": [{"name": "net/24"}],
            })))
            .mount(&server)
            .await;

        let client = test_client(&server).await;
        let addr = client
            .cmdb()
            .get("firewall", "address", "net/24", &Query::new())
            .await
            .unwrap();
        assert_eq!(addr["name"], "net/24");
    }
}
