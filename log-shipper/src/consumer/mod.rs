//! Consumer module for the log shipper.
//!
//! Provides the bus subscriber feeding the buffer, and a bridge that
//! publishes JSON lines onto the bus.

mod bus_subscriber;
mod stdin_bridge;

pub use bus_subscriber::BusSubscriber;
pub use stdin_bridge::publish_lines;
