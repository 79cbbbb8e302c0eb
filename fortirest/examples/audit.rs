//! Audit trail example
//!
//! Wires a fan-out of audit sinks (stderr + rotating file) into the
//! client and issues a few requests to show the events.
//!
//! # Usage
//!
//! ```bash
//! FGT_HOST=192.168.1.99 FGT_API_KEY=p3g1hn5jQw... cargo run --example audit
//! ```

use std::env;

use fortirest::{FanoutSink, FortiClient, Query, RotatingFileSink, StreamSink, TlsVerification};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let host = env::var("FGT_HOST").unwrap_or_else(|_| "192.168.1.99".to_string());
    let api_key = env::var("FGT_API_KEY")?;

    // One JSON line per API request: to stderr and to a size-rotated file
    let audit = FanoutSink::new()
        .with(StreamSink::stderr())
        .with(RotatingFileSink::new("fortirest-audit.log", 512 * 1024, 3));

    let mut client = FortiClient::builder(&host)
        .api_key(api_key)
        .vdom("root")
        .tls_verification(TlsVerification::Disabled)
        .audit(audit)
        .build()?;

    client.connect().await?;

    client.cmdb().list("firewall", "address", &Query::new()).await?;
    client.cmdb().exists("firewall", "address", "no-such-object").await?;
    client.monitor().get("system/status", &Query::new()).await?;

    println!("See fortirest-audit.log for the recorded events");

    client.close().await?;
    Ok(())
}
