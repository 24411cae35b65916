//! Request and response types for index store operations.

use log_shipper_shared::FieldMapping;
use serde::Deserialize;

/// Outcome of making sure an index exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureIndexOutcome {
    /// The index was missing and has been created.
    Created,
    /// The index was already present; nothing was changed.
    AlreadyExists,
}

/// Request to write one document into an index.
///
/// The document type is sent as part of the write path, next to the index
/// name. The fields are written as-is and become the document's source.
#[derive(Debug, Clone)]
pub struct WriteDocumentRequest {
    /// The index to write into.
    pub index: String,
    /// The document type (e.g. "log").
    pub doc_type: String,
    /// The document body.
    pub fields: FieldMapping,
}

impl WriteDocumentRequest {
    pub fn new(index: impl Into<String>, doc_type: impl Into<String>, fields: FieldMapping) -> Self {
        Self {
            index: index.into(),
            doc_type: doc_type.into(),
            fields,
        }
    }
}

/// Acknowledgement returned by the store for a written document.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct WriteAck {
    /// The index the document landed in.
    #[serde(rename = "_index")]
    pub index: String,
    /// The identifier assigned by the store.
    #[serde(rename = "_id")]
    pub id: String,
    /// The store's verdict (e.g. "created").
    #[serde(default)]
    pub result: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_ack_from_store_response() {
        let body = r#"{
            "_index": "logs-2024-03-07",
            "_type": "log",
            "_id": "AY4x",
            "_version": 1,
            "result": "created",
            "_shards": {"total": 1, "successful": 1, "failed": 0}
        }"#;

        let ack: WriteAck = serde_json::from_str(body).unwrap();
        assert_eq!(ack.index, "logs-2024-03-07");
        assert_eq!(ack.id, "AY4x");
        assert_eq!(ack.result, "created");
    }

    #[test]
    fn test_write_ack_without_result() {
        let body = r#"{"_index": "logs-2024-03-07", "_id": "1", "created": true}"#;

        let ack: WriteAck = serde_json::from_str(body).unwrap();
        assert_eq!(ack.result, "");
    }
}
