//! # Log Shipper Repository
//!
//! This crate provides traits and implementations for interacting with the
//! index store. It includes definitions for errors, interfaces, and a
//! concrete implementation for OpenSearch.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod types;
pub mod utils;

pub use config::StoreConnectionConfig;
pub use errors::IndexStoreError;
pub use interfaces::IndexStoreProvider;
pub use opensearch::OpenSearchProvider;
pub use types::{EnsureIndexOutcome, WriteAck, WriteDocumentRequest};
pub use utils::validate_index_name;
