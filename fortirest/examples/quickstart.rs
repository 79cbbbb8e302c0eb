//! Quickstart example
//!
//! Connects to a FortiGate, prints its identity, and lists firewall
//! address objects.
//!
//! # Usage
//!
//! ```bash
//! FGT_HOST=192.168.1.99 FGT_API_KEY=p3g1hn5jQw... cargo run --example quickstart
//! ```

use std::env;

use fortirest::{Filter, FortiClient, Query, TlsVerification};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let host = env::var("FGT_HOST").unwrap_or_else(|_| "192.168.1.99".to_string());
    let api_key = env::var("FGT_API_KEY")?;

    println!("Connecting to {}...", host);

    let mut client = FortiClient::builder(&host)
        .api_key(api_key)
        .vdom("root")
        // Lab devices usually run self-signed certificates
        .tls_verification(TlsVerification::Disabled)
        .build()?;

    client.connect().await?;

    if let Some(device) = client.device_info() {
        println!(
            "Connected: {} (serial {})\n",
            device.version,
            device.serial.as_deref().unwrap_or("unknown")
        );
    }

    println!("--- Address objects ---");
    let addresses = client
        .cmdb()
        .list(
            "firewall",
            "address",
            &Query::new().format(["name", "subnet", "type"]),
        )
        .await?;
    for addr in &addresses {
        println!("{:<32} {}", addr["name"], addr["subnet"]);
    }

    println!("\n--- Subnet addresses only ---");
    let subnets = client
        .cmdb()
        .list(
            "firewall",
            "address",
            &Query::new().filter(Filter::eq("type", "ipmask")).count(10),
        )
        .await?;
    println!("{} of {} are ipmask", subnets.len(), addresses.len());

    client.close().await?;
    Ok(())
}
