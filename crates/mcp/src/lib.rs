//! # Ledgerlink MCP
//!
//! Exposes the Ledgerlink accounting API as Model Context Protocol tools.
//! Each tool validates its arguments against a typed schema, reshapes them
//! into the upstream request and runs it through [`ledgerlink_sdk`].
//!
//! ```rust,no_run
//! use ledgerlink_mcp::tools::{register_all, ToolRegistry};
//! use ledgerlink_mcp::McpServer;
//! use ledgerlink_sdk::LedgerClient;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let client = LedgerClient::builder()
//!     .base_url("https://api.ledgerlink.io/v1/")
//!     .credentials("my-account", "my-access-key")
//!     .build()?;
//!
//! let mut registry = ToolRegistry::new();
//! register_all(&mut registry, &client);
//! McpServer::new(registry).start().await
//! # }
//! ```

pub mod config;
pub mod protocol;
pub mod server;
pub mod tools;

pub use config::McpConfig;
pub use server::McpServer;
