//! Transport layer for the Ledgerlink SDK.

pub mod http;

pub use http::HttpTransport;
