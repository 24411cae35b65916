//! # Log Shipper
//!
//! Log shipper - consumes log messages from the host's broadcast bus and
//! indexes them into day-partitioned OpenSearch indices.
//!
//! ## Architecture
//!
//! The shipper follows the Consumer-Processor-Loader pattern:
//!
//! 1. **Consumer**: Subscribes to the bus and filters messages by source
//! 2. **Buffer**: Bounded FIFO between the subscriber and the indexing loop
//! 3. **Rotation**: Switches to a new index when the calendar day changes
//! 4. **Processor**: Maps messages to document field mappings
//! 5. **Loader**: Creates indices and writes documents into the store
//! 6. **Orchestrator**: Runs the subscriber and the indexing loop
//!
//! ## Modules
//!
//! - [`config`]: Handler configuration, context and dependency wiring
//! - [`consumer`]: Bus subscriber and stdin bridge
//! - [`filter`]: Source and success filtering rules
//! - [`buffer`]: Bounded message buffer
//! - [`rotation`]: Day-based index naming and rollover
//! - [`processor`]: Message to document mapping
//! - [`loader`]: Index store calls
//! - [`orchestrator`]: Pipeline runner
//! - [`errors`]: Error types for the pipeline

pub mod buffer;
pub mod config;
pub mod consumer;
pub mod errors;
pub mod filter;
pub mod loader;
pub mod orchestrator;
pub mod processor;
pub mod rotation;

pub use config::{Dependencies, HandlerConfig, HandlerContext};
pub use errors::IngestError;
pub use orchestrator::PipelineRunner;

use log_shipper_repository::IndexStoreError;
use thiserror::Error;

/// Errors that can stop the shipper during start-up or execution.
#[derive(Error, Debug)]
pub enum ShipperError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The index store could not be reached or set up.
    #[error("Store error: {0}")]
    StoreError(#[from] IndexStoreError),

    /// Ingest error.
    #[error("Ingest error: {0}")]
    IngestError(#[from] IngestError),
}

impl ShipperError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
