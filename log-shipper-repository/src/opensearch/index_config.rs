//! Index settings and mappings for the day-partitioned log indices.

use serde_json::{json, Value};

/// The document type every log document is written with.
pub const DEFAULT_DOCUMENT_TYPE: &str = "log";

/// Shard layout used when creating an index.
///
/// Log indices are small and short-lived (one per day), so the default is a
/// single primary shard with no replicas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSettings {
    pub shards: u32,
    pub replicas: u32,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            shards: 1,
            replicas: 0,
        }
    }
}

impl IndexSettings {
    pub fn new(shards: u32, replicas: u32) -> Self {
        Self { shards, replicas }
    }

    /// The body of the index creation request.
    ///
    /// The `_default_` mapping applies to every document type: the original
    /// document is kept in `_source`, and the catch-all `_all` field is
    /// disabled. Stores newer than Elasticsearch 6.x reject this mapping.
    pub fn to_body(&self) -> Value {
        json!({
            "settings": {
                "index.number_of_shards": self.shards,
                "index.number_of_replicas": self.replicas
            },
            "mappings": {
                "_default_": {
                    "_source": {
                        "enabled": true
                    },
                    "_all": {
                        "enabled": false
                    }
                }
            }
        })
    }
}
