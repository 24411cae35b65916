//! Log message types carried on the shared bus.
//!
//! This module defines the message published by the host framework and the
//! envelope the bus uses to carry it next to unrelated traffic.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

fn default_success() -> bool {
    true
}

/// A structured log message as published on the bus.
///
/// # Fields
///
/// - `time`: When the message was produced, with its original UTC offset
/// - `msg`: Free-text body
/// - `source`: Identifier of the component that emitted the message
/// - `msg_type`: Type tag (e.g. "log", "event")
/// - `host`: Originating host
/// - `level`: Optional severity level
/// - `kv`: Key-value attributes; empty when the message carries none
/// - `source_path`: Hops the message travelled through, most recent last
/// - `version`: Optional message format version
/// - `source_success`: Whether the step that produced the message succeeded
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogMessage {
    pub time: DateTime<FixedOffset>,
    pub msg: String,
    pub source: String,
    #[serde(rename = "type", default)]
    pub msg_type: String,
    #[serde(default)]
    pub host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub kv: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_path: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default = "default_success")]
    pub source_success: bool,
}

impl LogMessage {
    /// Create a message with the required fields set.
    ///
    /// The type tag defaults to `"log"`, the message is marked successful and
    /// all optional fields are empty.
    ///
    /// # Example
    ///
    /// ```
    /// use chrono::DateTime;
    /// use log_shipper_shared::LogMessage;
    ///
    /// let time = DateTime::parse_from_rfc3339("2024-03-07T10:00:00+00:00").unwrap();
    /// let msg = LogMessage::new(time, "syslog", "disk almost full").with_host("web-1");
    /// assert_eq!(msg.last_hop(), "syslog");
    /// ```
    pub fn new(
        time: DateTime<FixedOffset>,
        source: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        Self {
            time,
            msg: msg.into(),
            source: source.into(),
            msg_type: "log".to_string(),
            host: String::new(),
            level: None,
            kv: HashMap::new(),
            source_path: Vec::new(),
            version: None,
            source_success: true,
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_type(mut self, msg_type: impl Into<String>) -> Self {
        self.msg_type = msg_type.into();
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_kv(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.kv.insert(key.into(), value.into());
        self
    }

    pub fn with_source_path<I, S>(mut self, hops: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.source_path = hops.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_success(mut self, success: bool) -> Self {
        self.source_success = success;
        self
    }

    /// The most recent hop recorded on the message.
    ///
    /// Falls back to `source` when no source path was recorded.
    pub fn last_hop(&self) -> &str {
        self.source_path
            .last()
            .map(String::as_str)
            .unwrap_or(&self.source)
    }

    /// Check the invariants a bus message must hold.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the message can be shipped
    /// * `Err(String)` - A description of the violated invariant
    pub fn validate(&self) -> Result<(), String> {
        if self.source.trim().is_empty() {
            return Err("message source must not be empty".to_string());
        }
        Ok(())
    }
}

/// A value published on the shared bus.
///
/// The bus is shared with other handlers, so it carries more than log
/// messages. Only `Message` is relevant to the shipper.
#[derive(Debug, Clone, PartialEq)]
pub enum BusEvent {
    /// A log message.
    Message(LogMessage),
    /// Any other traffic, identified by a free-form kind.
    Other { kind: String },
}

impl BusEvent {
    /// Borrow the log message, if this event carries one.
    pub fn as_message(&self) -> Option<&LogMessage> {
        match self {
            BusEvent::Message(msg) => Some(msg),
            BusEvent::Other { .. } => None,
        }
    }
}

impl From<LogMessage> for BusEvent {
    fn from(msg: LogMessage) -> Self {
        BusEvent::Message(msg)
    }
}
