//! CMDB transaction guard.
//!
//! FortiOS batches CMDB writes into server-side transactions: writes issued
//! with a transaction id are deferred and applied (or discarded) as a unit
//! when the transaction is committed (or aborted). All atomicity and rollback
//! guarantees live on the firewall; this guard only drives the four
//! `transaction-*` endpoints and keeps the id bound to the client.
//!
//! The guard uses Rust's ownership system for safety:
//! - it holds `&mut FortiClient`, preventing concurrent client use
//! - `commit()`/`abort()` consume the guard, ensuring single-use
//! - `detach()` releases the guard without ending the transaction
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use serde_json::json;
//! use fortirest::FortiClient;
//!
//! # async fn example(client: &mut FortiClient) -> Result<(), fortirest::Error> {
//! let tx = client.transaction(Duration::from_secs(60)).await?;
//!
//! tx.cmdb()
//!     .create("firewall", "address", &json!({"name": "lab", "subnet": "10.9.0.0 255.255.0.0"}))
//!     .await?;
//!
//! tx.commit().await?; // consumes the guard; the writes apply as a unit
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use log::{debug, warn};
use reqwest::Method;
use serde_json::{json, Value};

use super::response::ApiResponse;
use super::FortiClient;
use crate::api::{Cmdb, Namespace, Query};
use crate::error::{ClientError, Result};

/// RAII guard for a server-side CMDB transaction.
///
/// Holds `&mut FortiClient` so no request can bypass the transaction while
/// the guard is live; every request issued through the guard carries the
/// transaction id. At most one transaction can be bound to a client —
/// [`begin`](Transaction::begin) refuses to start a second one while a
/// detached transaction is still pending.
#[derive(Debug)]
pub struct Transaction<'a> {
    client: &'a mut FortiClient,
    id: u64,
    consumed: bool,
}

impl<'a> Transaction<'a> {
    /// Start a transaction with the given server-side timeout.
    ///
    /// The firewall discards the transaction on its own once the timeout
    /// elapses without a commit.
    pub async fn begin(client: &'a mut FortiClient, timeout: Duration) -> Result<Self> {
        if let Some(id) = client.txid {
            return Err(ClientError::TransactionPending { id }.into());
        }

        let body = json!({ "timeout": timeout.as_secs() });
        let resp = client
            .request(
                Method::POST,
                Namespace::Cmdb,
                "",
                None,
                &Query::new().action("transaction-start"),
                Some(&body),
            )
            .await?;

        let id = extract_transaction_id(&resp).ok_or(ClientError::MissingTransactionId)?;
        debug!("transaction {} started", id);
        client.txid = Some(id);

        Ok(Self {
            client,
            id,
            consumed: false,
        })
    }

    /// Re-attach to a transaction left pending by [`detach`](Transaction::detach).
    pub async fn resume(client: &'a mut FortiClient) -> Result<Self> {
        let id = client.txid.ok_or(ClientError::NoTransaction)?;
        debug!("resuming transaction {}", id);
        Ok(Self {
            client,
            id,
            consumed: false,
        })
    }

    /// The transaction id assigned by the firewall.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Shared access to the underlying client. Every request issued
    /// through it carries the transaction id.
    pub fn client(&self) -> &FortiClient {
        self.client
    }

    /// Handle for the configuration database, scoped to this transaction.
    pub fn cmdb(&self) -> Cmdb<'_> {
        self.client.cmdb()
    }

    /// Fetch the pending state of this transaction (`transaction-show`).
    pub async fn show(&self) -> Result<Value> {
        let resp = self
            .client
            .request(
                Method::GET,
                Namespace::Cmdb,
                "",
                None,
                &Query::new().action("transaction-show"),
                None,
            )
            .await?;
        Ok(resp.results.unwrap_or(Value::Null))
    }

    /// Commit the transaction, applying all deferred writes as a unit.
    ///
    /// Consumes the guard. On failure the transaction stays bound to the
    /// client; [`resume`](Transaction::resume) it to retry or abort.
    pub async fn commit(mut self) -> Result<ApiResponse> {
        self.consumed = true;

        let body = json!({ "transaction-id": self.id });
        let result = self
            .client
            .request(
                Method::POST,
                Namespace::Cmdb,
                "",
                None,
                &Query::new().action("transaction-commit"),
                Some(&body),
            )
            .await;

        if result.is_ok() {
            debug!("transaction {} committed", self.id);
            self.client.txid = None;
        }
        result
    }

    /// Abort the transaction, discarding all deferred writes.
    ///
    /// Consumes the guard. On failure the transaction stays bound to the
    /// client, mirroring [`commit`](Transaction::commit).
    pub async fn abort(mut self) -> Result<ApiResponse> {
        self.consumed = true;

        let body = json!({ "transaction-id": self.id });
        let result = self
            .client
            .request(
                Method::POST,
                Namespace::Cmdb,
                "",
                None,
                &Query::new().action("transaction-abort"),
                Some(&body),
            )
            .await;

        if result.is_ok() {
            debug!("transaction {} aborted", self.id);
            self.client.txid = None;
        }
        result
    }

    /// Release the guard without ending the transaction.
    ///
    /// The transaction stays pending on the firewall (until its server-side
    /// timeout) and stays bound to the client; call
    /// [`resume`](Transaction::resume) to re-attach. Returns the id.
    pub fn detach(mut self) -> u64 {
        self.consumed = true;
        debug!("transaction {} detached", self.id);
        self.id
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.consumed {
            warn!(
                "transaction {} guard dropped without commit/abort/detach; \
                 the firewall will discard it at its timeout",
                self.id
            );
        }
    }
}

/// Pull the transaction id out of a `transaction-start` envelope.
/// Depending on the build it arrives as an integer or a string.
fn extract_transaction_id(resp: &ApiResponse) -> Option<u64> {
    let results = resp.results.as_ref()?;
    match results.get("transaction-id") {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    }
}
