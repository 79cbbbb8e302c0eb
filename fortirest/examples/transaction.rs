//! Transaction example
//!
//! Demonstrates RAII-guarded CMDB transactions: several writes applied
//! as a unit, with schema validation up front and abort on failure.
//!
//! # Usage
//!
//! ```bash
//! FGT_HOST=192.168.1.99 FGT_API_KEY=p3g1hn5jQw... cargo run --example transaction
//! ```

use std::env;
use std::time::Duration;

use serde_json::json;

use fortirest::{FortiClient, TlsVerification};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let host = env::var("FGT_HOST").unwrap_or_else(|_| "192.168.1.99".to_string());
    let api_key = env::var("FGT_API_KEY")?;

    let mut client = FortiClient::builder(&host)
        .api_key(api_key)
        .vdom("root")
        .tls_verification(TlsVerification::Disabled)
        .build()?;

    client.connect().await?;
    println!("Connected\n");

    let payload = json!({
        "name": "lab-segment",
        "type": "ipmask",
        "subnet": "10.99.0.0 255.255.0.0",
        "comment": "created by the fortirest transaction example",
    });

    // Validate against the live schema before touching the device
    let schema = client.cmdb().schema("firewall", "address").await?;
    let issues = schema.validate(&payload);
    if !issues.is_empty() {
        for issue in &issues {
            eprintln!("{}: {}", issue.field, issue.message);
        }
        return Err("payload does not match the device schema".into());
    }

    // All writes inside the guard are deferred until commit
    let tx = client.transaction(Duration::from_secs(60)).await?;
    println!("Transaction {} started", tx.id());

    tx.cmdb().create("firewall", "address", &payload).await?;
    tx.cmdb()
        .create(
            "firewall",
            "addrgrp",
            &json!({"name": "lab-groups", "member": [{"name": "lab-segment"}]}),
        )
        .await?;

    match tx.commit().await {
        Ok(_) => println!("Committed: address and group applied as a unit"),
        Err(e) => {
            eprintln!("Commit failed: {}", e);
            return Err(e.into());
        }
    }

    // Clean up (the group references the address, so it goes first)
    client.cmdb().delete("firewall", "addrgrp", "lab-groups").await?;
    client.cmdb().delete("firewall", "address", "lab-segment").await?;
    println!("Cleaned up");

    client.close().await?;
    Ok(())
}
