//! Service namespace: generic passthrough for auxiliary endpoints.

use reqwest::Method;
use serde_json::Value;

use super::query::Query;
use super::Namespace;
use crate::client::response::ApiResponse;
use crate::client::FortiClient;
use crate::error::Result;

/// Handle for the service namespace.
///
/// Service endpoints are build-specific and carry no table structure, so
/// this handle stays generic: raw methods against a path, envelope back.
/// Obtain via [`FortiClient::service`].
pub struct Service<'a> {
    client: &'a FortiClient,
}

impl<'a> Service<'a> {
    pub(crate) fn new(client: &'a FortiClient) -> Self {
        Self { client }
    }

    /// GET a service endpoint.
    pub async fn get(&self, path: &str, query: &Query) -> Result<ApiResponse> {
        self.client
            .request(Method::GET, Namespace::Service, path, None, query, None)
            .await
    }

    /// POST to a service endpoint.
    pub async fn post(&self, path: &str, query: &Query, body: Option<&Value>) -> Result<ApiResponse> {
        self.client
            .request(Method::POST, Namespace::Service, path, None, query, body)
            .await
    }

    /// PUT to a service endpoint.
    pub async fn put(&self, path: &str, query: &Query, body: Option<&Value>) -> Result<ApiResponse> {
        self.client
            .request(Method::PUT, Namespace::Service, path, None, query, body)
            .await
    }

    /// DELETE a service endpoint.
    pub async fn delete(&self, path: &str, query: &Query) -> Result<ApiResponse> {
        self.client
            .request(Method::DELETE, Namespace::Service, path, None, query, None)
            .await
    }
}
