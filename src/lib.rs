//! # demo-api-client - typed access to the versioned DTO endpoints
//!
//! The demo API publishes several historical shapes of its two resources,
//! users and items. This crate maps each shape to a Rust type and each
//! endpoint to the decode strategy its body needs, on top of `reqwest`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use demo_api_client::Client;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), demo_api_client::Error> {
//!     let client = Client::builder()
//!         .base_url("https://api.example.com")?
//!         .timeout(Duration::from_secs(10))
//!         .default_header("User-Agent", "inventory-sync/1.0")?
//!         .build()?;
//!
//!     for user in client.get_users_v3().await? {
//!         println!("{} <{}> since {}", user.first_name, user.email, user.created_at);
//!     }
//!
//!     let items = client.get_items_v2().await?;
//!     println!("{} items, {} in stock", items.len(), items.iter().filter(|i| i.in_stock).count());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Endpoints
//!
//! | Method | Request | Decoding |
//! |--------|---------|----------|
//! | [`Client::get_users_v1`] | `GET /api/v1/users` | plain |
//! | [`Client::get_users_v2`] | `GET /api/v2/users` | plain |
//! | [`Client::get_users_v3`] | `GET /api/v3/users` | plain |
//! | [`Client::get_users_v4`] | `GET /api/v4/users` | collection-aware |
//! | [`Client::get_items_v1`] | `GET /api/v1/items?limit=0,5` | plain |
//! | [`Client::get_items_v1_php`] | same, `Accept: application/vnd.demo.dto` | legacy |
//! | [`Client::get_items_v2`] | `GET /api/v2/items?limit=0,10` | plain |
//!
//! The same table drives the generic accessors: [`Client::fetch`] picks the
//! endpoint from the DTO type, and [`Client::fetch_records`] from a
//! [`Resource`] and schema version known only at runtime.
//!
//! ## Error Handling
//!
//! Nothing is retried. Transport failures ([`Error::is_transport`]) and
//! decode failures ([`Error::is_decode`]) are both returned on first
//! occurrence, with the raw response preserved:
//!
//! ```no_run
//! use demo_api_client::{Client, Error, Resource};
//!
//! # async fn example() -> Result<(), Error> {
//! # let client = Client::builder().base_url("https://api.example.com")?.build()?;
//! match client.fetch_records(Resource::Users, 4).await {
//!     Ok(records) => println!("{} records", records.len()),
//!     Err(e) if e.is_decode() => eprintln!("Unexpected payload: {:?}", e.raw_response()),
//!     Err(e) => eprintln!("Request failed: {}", e),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Logging
//!
//! Requests and responses are reported through `tracing` events; install a
//! subscriber to see them.

mod client;
pub mod decode;
pub mod dto;
pub mod endpoint;
mod error;
pub mod legacy;
pub mod metadata;
mod response;

pub use client::{Client, ClientBuilder};
pub use decode::{DecodeError, DecodeStrategy};
pub use endpoint::{Endpoint, Resource};
pub use error::{Error, Result};
pub use response::Response;
