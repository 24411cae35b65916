//! OpenSearch implementation of the index store provider.
//!
//! This module provides a concrete implementation of `IndexStoreProvider`
//! using OpenSearch as the backend.

mod index_config;
mod provider;

pub use index_config::{IndexSettings, DEFAULT_DOCUMENT_TYPE};
pub use provider::OpenSearchProvider;
