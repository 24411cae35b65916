//! Document mapper implementation.
//!
//! Transforms log messages into the field mappings written to the store.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use log_shipper_shared::{FieldMapping, LogMessage};

/// Field names used in log documents.
pub mod fields {
    pub const TIMESTAMP: &str = "Timestamp";
    pub const MSG: &str = "msg";
    pub const SOURCE: &str = "source";
    pub const TYPE: &str = "type";
    pub const HOST: &str = "host";
    pub const LEVEL: &str = "Level";
    pub const SOURCE_PATH: &str = "source_path";
    pub const VERSION: &str = "_msg_version";
    /// Holds attributes of sources whose name clashes with another field.
    pub const KV: &str = "kv";

    /// Names that attributes may not be nested under.
    pub const RESERVED: &[&str] = &[
        TIMESTAMP,
        MSG,
        SOURCE,
        TYPE,
        HOST,
        LEVEL,
        SOURCE_PATH,
        VERSION,
    ];
}

/// Format a timestamp with microsecond precision and a numeric UTC offset,
/// e.g. `2024-03-07T10:00:00.123456+01:00`.
pub fn format_timestamp(time: &DateTime<FixedOffset>) -> String {
    time.format("%Y-%m-%dT%H:%M:%S%.6f%:z").to_string()
}

/// Build the document for a log message.
///
/// The required fields are always present. Level, source path and format
/// version are only added when the message carries them. Key-value
/// attributes are nested in a sub-object named after the message's source,
/// so attributes from different sources never collide at the top level; if
/// the source name is itself a document field, they go under `kv`.
pub fn to_document(msg: &LogMessage) -> FieldMapping {
    let mut doc = FieldMapping::new();
    doc.insert(fields::TIMESTAMP, format_timestamp(&msg.time));
    doc.insert(fields::MSG, msg.msg.as_str());
    doc.insert(fields::SOURCE, msg.source.as_str());
    doc.insert(fields::TYPE, msg.msg_type.as_str());
    doc.insert(fields::HOST, msg.host.as_str());

    if let Some(level) = msg.level {
        doc.insert(fields::LEVEL, level);
    }
    if !msg.source_path.is_empty() {
        doc.insert(fields::SOURCE_PATH, msg.source_path.join(","));
    }
    if let Some(ref version) = msg.version {
        doc.insert(fields::VERSION, version.as_str());
    }

    if !msg.kv.is_empty() {
        // Sorted so identical messages produce identical documents.
        let attributes: FieldMapping = msg
            .kv
            .iter()
            .collect::<BTreeMap<_, _>>()
            .into_iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        let key = if fields::RESERVED.contains(&msg.source.as_str()) {
            fields::KV
        } else {
            msg.source.as_str()
        };
        doc.insert(key, attributes);
    }

    doc
}
