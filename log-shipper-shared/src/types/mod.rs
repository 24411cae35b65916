//! This module defines the core data structures used across the log shipper.
//! It re-exports the bus message types and the document field mapping.

pub mod field_mapping;
pub mod log_message;

pub use field_mapping::{FieldMapping, FieldValue};
pub use log_message::{BusEvent, LogMessage};
