//! Connection configuration for the index store.

/// Default store host.
pub const DEFAULT_HOST: &str = "localhost";

/// Default store port.
pub const DEFAULT_PORT: u16 = 9200;

/// Where to reach the index store.
///
/// The host may be a bare host name (`localhost`) or carry a scheme
/// (`https://search.internal`); bare hosts are reached over plain HTTP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConnectionConfig {
    pub host: String,
    pub port: u16,
}

impl Default for StoreConnectionConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl StoreConnectionConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// The base URL of the store.
    ///
    /// # Example
    ///
    /// ```
    /// use log_shipper_repository::StoreConnectionConfig;
    ///
    /// let config = StoreConnectionConfig::default();
    /// assert_eq!(config.url(), "http://localhost:9200");
    /// ```
    pub fn url(&self) -> String {
        let host = self.host.trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            format!("{}:{}", host, self.port)
        } else {
            format!("http://{}:{}", host, self.port)
        }
    }
}
