//! Error types for the log shipper pipeline.

use log_shipper_repository::IndexStoreError;
use thiserror::Error;

/// Errors that can occur while moving messages through the pipeline.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Error reported by the index store.
    #[error("Store error: {0}")]
    StoreError(#[from] IndexStoreError),

    /// Bus subscription error.
    #[error("Bus error: {0}")]
    BusError(String),

    /// Buffer communication error.
    #[error("Channel error: {0}")]
    ChannelError(String),
}

impl IngestError {
    /// Create a bus error.
    pub fn bus(msg: impl Into<String>) -> Self {
        Self::BusError(msg.into())
    }

    /// Create a channel error.
    pub fn channel(msg: impl Into<String>) -> Self {
        Self::ChannelError(msg.into())
    }
}
