//! Configuration for the log shipper.
//!
//! Configuration is looked up per handler through a [`ConfigSource`], every
//! key falling back to a default. [`Dependencies`] wires the loaded
//! configuration into a ready-to-run pipeline.

mod dependencies;
mod handler;
mod source;

pub use dependencies::Dependencies;
pub use handler::{default_index_prefix, ConnectionMode, HandlerConfig, HandlerContext};
pub use source::{ConfigSource, EnvConfigSource, MapConfigSource};
