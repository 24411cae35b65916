//! Processor module for the log shipper.
//!
//! Maps log messages into document field mappings.

mod document_mapper;

pub use document_mapper::{fields, format_timestamp, to_document};
