//! Bank statement feed integration.
//!
//! This module provides the client and types for reading the PrivatBank interim statement API.
//! The feed is paginated; `fetch_all_pages` stitches pages together and only ever hands back a
//! complete transaction set.

/// HTTP client and pagination loop for the statement feed
mod client;
/// Transaction record and page types
mod types;

pub use client::{DEFAULT_STATEMENTS_URL, PrivatStatementClient, TransactionSource};
pub use types::*;
