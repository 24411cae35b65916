//! # Log Shipper Shared
//!
//! This crate defines the data structures shared across the log shipper:
//! the log messages travelling over the bus and the field mappings written
//! to the search index.

pub mod types;

pub use types::field_mapping::{FieldMapping, FieldValue};
pub use types::log_message::{BusEvent, LogMessage};
