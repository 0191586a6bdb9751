//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - Blocking reqwest client for the Transport port
//! - JSON file in the data directory for the TokenStore port
//! - In-memory token store for headless and test use

pub mod http;
pub mod token_store;

#[cfg(test)]
pub mod mock;

pub use http::ReqwestTransport;
pub use token_store::{FileTokenStore, MemoryTokenStore};
