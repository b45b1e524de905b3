//! Fetches every published resource version and prints a summary.
//!
//! The base URL comes from the first argument or `DEMO_API_BASE_URL`.
//!
//! Run with: `cargo run --example fetch_all -- http://localhost:8000`

use demo_api_client::{Client, Endpoint, Error};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("demo_api_client=debug,fetch_all=info")
            }),
        )
        .init();

    let base_url = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("DEMO_API_BASE_URL").ok())
        .unwrap_or_else(|| "http://localhost:8000".to_string());

    let client = Client::builder()
        .base_url(&base_url)?
        .timeout(Duration::from_secs(10))
        .default_header("User-Agent", "demo-api-client/fetch_all")?
        .build()?;

    println!("=== Users ===");
    for user in client.get_users_v4().await? {
        println!(
            "#{} {} {} <{}>: {} addresses, roles [{}]",
            user.id,
            user.first_name,
            user.last_name,
            user.email,
            user.addresses.len(),
            user.roles.iter().map(|r| r.name.as_str()).collect::<Vec<_>>().join(", ")
        );
    }
    println!();

    println!("=== Items (legacy format) ===");
    let legacy = client.fetch_legacy_items().await?;
    for item in legacy.iter() {
        println!("#{} {} at {:.2}", item.id, item.name, item.price);
    }
    println!("Legacy payload: {} bytes in {:?}", legacy.raw_body.len(), legacy.latency);
    println!();

    println!("=== All endpoints ===");
    for endpoint in Endpoint::ALL {
        let label = endpoint.to_string();
        match client.fetch_any(endpoint).await {
            Ok(records) => println!("{:<20} {} records", label, records.len()),
            Err(e) if e.is_decode() => println!("{:<20} bad payload: {}", label, e),
            Err(e) => println!("{:<20} failed: {}", label, e),
        }
    }

    Ok(())
}
