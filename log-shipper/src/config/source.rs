//! Key/value configuration sources.

use std::collections::HashMap;
use std::env;

/// Named key/value lookups.
///
/// Keys are dotted paths such as `handler.es_logs.host`. A missing key is
/// not an error; callers fall back to their defaults.
pub trait ConfigSource: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads configuration from environment variables.
///
/// A key is turned into a variable name by upper-casing it and replacing
/// `.` and `-` with `_`, so `handler.es_logs.index-prefix` is read from
/// `HANDLER_ES_LOGS_INDEX_PREFIX`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvConfigSource;

impl EnvConfigSource {
    pub fn new() -> Self {
        Self
    }

    /// Environment variable name for a configuration key.
    pub fn var_name(key: &str) -> String {
        key.chars()
            .map(|c| match c {
                '.' | '-' => '_',
                c => c.to_ascii_uppercase(),
            })
            .collect()
    }
}

impl ConfigSource for EnvConfigSource {
    fn get(&self, key: &str) -> Option<String> {
        env::var(Self::var_name(key)).ok()
    }
}

/// In-memory configuration, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MapConfigSource {
    values: HashMap<String, String>,
}

impl MapConfigSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}

impl ConfigSource for MapConfigSource {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}
