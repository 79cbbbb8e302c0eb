//! The FortiOS response envelope.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ClientError, Result};

/// Response envelope returned by every FortiOS REST endpoint.
///
/// All fields are optional on the wire; which ones are present depends on
/// the namespace and firmware build. The payload lives in `results`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiResponse {
    /// HTTP method the device echoed back.
    pub http_method: Option<String>,

    /// "success" or "error".
    pub status: Option<String>,

    /// HTTP status as reported inside the envelope.
    pub http_status: Option<u16>,

    /// CMDB error code (negative) when the operation failed.
    pub error: Option<i64>,

    /// The operation payload.
    pub results: Option<Value>,

    /// VDOM the operation was applied to.
    pub vdom: Option<String>,

    /// CMDB table path (e.g. "firewall").
    pub path: Option<String>,

    /// CMDB table name (e.g. "address").
    pub name: Option<String>,

    /// Primary key of the affected object. A string for most tables,
    /// an integer for tables keyed by id (e.g. `policyid`).
    pub mkey: Option<Value>,

    /// Configuration revision after a write.
    pub revision: Option<String>,

    /// Device serial number.
    pub serial: Option<String>,

    /// Firmware version (e.g. "v7.4.1").
    pub version: Option<String>,

    /// Firmware build number.
    pub build: Option<i64>,
}

impl ApiResponse {
    /// Check if the envelope indicates success.
    pub fn is_success(&self) -> bool {
        !self.is_error()
    }

    pub(crate) fn is_error(&self) -> bool {
        matches!(self.status.as_deref(), Some("error")) || self.error.is_some()
    }

    /// Deserialize `results` into a concrete type.
    pub fn results_as<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        let value = self.results.clone().unwrap_or(Value::Null);
        serde_json::from_value(value).map_err(|e| ClientError::Decode(e).into())
    }

    /// The `results` as a list of objects.
    ///
    /// CMDB endpoints return an array even for single-object reads; monitor
    /// endpoints may return a bare object, which comes back as a one-element
    /// list here.
    pub fn result_list(&self) -> Vec<Value> {
        match &self.results {
            Some(Value::Array(items)) => items.clone(),
            Some(Value::Null) | None => Vec::new(),
            Some(other) => vec![other.clone()],
        }
    }

    /// The first (often only) object in `results`.
    pub fn first_result(&self) -> Option<Value> {
        match &self.results {
            Some(Value::Array(items)) => items.first().cloned(),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.clone()),
        }
    }

    /// The affected object's mkey rendered as a string.
    pub fn mkey_str(&self) -> Option<String> {
        match &self.mkey {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_cmdb_list_envelope() {
        let raw = json!({
            "http_method": "GET",
            "revision": "24.0.1.10746",
            "results": [
                {"name": "all", "subnet": "0.0.0.0 0.0.0.0"},
                {"name": "lan", "subnet": "10.0.0.0 255.255.255.0"}
            ],
            "vdom": "root",
            "path": "firewall",
            "name": "address",
            "status": "success",
            "http_status": 200,
            "serial": "FGT60F0000000001",
            "version": "v7.4.1",
            "build": 2463
        });

        let resp: ApiResponse = serde_json::from_value(raw).unwrap();
        assert!(resp.is_success());
        assert_eq!(resp.result_list().len(), 2);
        assert_eq!(resp.first_result().unwrap()["name"], "all");
        assert_eq!(resp.version.as_deref(), Some("v7.4.1"));
        assert_eq!(resp.vdom.as_deref(), Some("root"));
    }

    #[test]
    fn test_parse_error_envelope() {
        let raw = json!({
            "http_method": "POST",
            "status": "error",
            "http_status": 500,
            "error": -5,
            "vdom": "root",
            "path": "firewall",
            "name": "address"
        });

        let resp: ApiResponse = serde_json::from_value(raw).unwrap();
        assert!(!resp.is_success());
        assert_eq!(resp.error, Some(-5));
        assert!(resp.result_list().is_empty());
    }

    #[test]
    fn test_numeric_mkey() {
        let raw = json!({"status": "success", "mkey": 12, "http_status": 200});
        let resp: ApiResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(resp.mkey_str().as_deref(), Some("12"));

        let raw = json!({"status": "success", "mkey": "wan-out"});
        let resp: ApiResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(resp.mkey_str().as_deref(), Some("wan-out"));
    }

    #[test]
    fn test_monitor_object_results() {
        let raw = json!({
            "status": "success",
            "results": {"hostname": "fw1", "model": "FGT60F"}
        });
        let resp: ApiResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(resp.result_list().len(), 1);
        assert_eq!(resp.first_result().unwrap()["hostname"], "fw1");
    }

    #[test]
    fn test_typed_results() {
        #[derive(serde::Deserialize)]
        struct Address {
            name: String,
        }

        let raw = json!({"status": "success", "results": [{"name": "all"}]});
        let resp: ApiResponse = serde_json::from_value(raw).unwrap();
        let addrs: Vec<Address> = resp.results_as().unwrap();
        assert_eq!(addrs[0].name, "all");
    }
}
