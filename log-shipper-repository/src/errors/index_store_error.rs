//! Index store error types.
//!
//! This module defines the unified error type for all index store operations,
//! from connection set-up to individual document writes.

use thiserror::Error;

/// Unified errors from index store operations.
///
/// Used by the `IndexStoreProvider` trait for every call against the store.
/// None of these are fatal to a running pipeline on their own; the caller
/// decides whether to abort (connection errors at start-up) or to log and
/// continue (index creation and document writes).
#[derive(Debug, Clone, Error)]
pub enum IndexStoreError {
    /// Validation error (e.g., an index name the store would reject).
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Failed to reach the store.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Failed to check whether an index exists.
    #[error("Index check error: {0}")]
    IndexCheckError(String),

    /// Failed to create an index.
    #[error("Index creation error: {0}")]
    IndexCreationError(String),

    /// Failed to write a document.
    #[error("Write error: {0}")]
    WriteError(String),

    /// Failed to parse a response from the store.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Failed to serialize a request body.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl IndexStoreError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create an index check error.
    pub fn index_check(msg: impl Into<String>) -> Self {
        Self::IndexCheckError(msg.into())
    }

    /// Create an index creation error.
    pub fn index_creation(msg: impl Into<String>) -> Self {
        Self::IndexCreationError(msg.into())
    }

    /// Create a write error.
    pub fn write(msg: impl Into<String>) -> Self {
        Self::WriteError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }
}
