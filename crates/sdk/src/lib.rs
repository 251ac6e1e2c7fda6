//! # Ledgerlink SDK
//!
//! Authenticated HTTP client for the Ledgerlink accounting API. Handles
//! bearer-token acquisition and caching, retries transient failures with
//! exponential backoff, and normalizes upstream error payloads.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ledgerlink_sdk::{ApiRequest, LedgerClient, LedgerResult};
//!
//! #[tokio::main]
//! async fn main() -> LedgerResult<()> {
//!     let client = LedgerClient::builder()
//!         .base_url("https://api.ledgerlink.io/v1/")
//!         .credentials("my-account", "my-access-key")
//!         .build()?;
//!
//!     let products = client
//!         .execute(&ApiRequest::get("/products").query([("PageSize", "50")]))
//!         .await?;
//!     println!("{}", products);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Errors
//!
//! Every failed call surfaces as [`LedgerError::Api`] with a normalized
//! message plus the HTTP status, method and path:
//!
//! ```rust,no_run
//! # use ledgerlink_sdk::{ApiRequest, LedgerClient};
//! # async fn example(client: LedgerClient) {
//! match client.execute(&ApiRequest::get("/invoices/INV-0001")).await {
//!     Ok(invoice) => println!("{}", invoice),
//!     Err(err) if err.status() == Some(404) => println!("no such invoice"),
//!     Err(err) => eprintln!("{}", err),
//! }
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod request;
pub mod transport;

pub use auth::{SessionToken, TokenManager};
pub use client::{LedgerClient, LedgerClientBuilder};
pub use config::{ClientConfig, Credentials, RetryConfig, DEFAULT_AUTH_PATH, DEFAULT_BASE_URL};
pub use error::{format_error_message, LedgerError, LedgerResult};
pub use request::{ApiRequest, IDEMPOTENCY_KEY_HEADER};

// Re-export for callers building requests.
pub use reqwest::Method;
