//! OpenSearch provider implementation.
//!
//! This module provides the concrete implementation of `IndexStoreProvider`
//! using the OpenSearch Rust crate.

use async_trait::async_trait;
use opensearch::{
    http::{
        headers::HeaderMap,
        request::JsonBody,
        transport::{SingleNodeConnectionPool, TransportBuilder},
        Method,
    },
    indices::{IndicesCreateParts, IndicesExistsParts},
    OpenSearch,
};
use tracing::{debug, error, info};
use url::Url;

use crate::errors::IndexStoreError;
use crate::interfaces::IndexStoreProvider;
use crate::opensearch::index_config::IndexSettings;
use crate::types::{WriteAck, WriteDocumentRequest};
use crate::utils;

/// OpenSearch provider implementation.
///
/// Manages day-partitioned log indices and writes log documents into them.
///
/// # Example
///
/// ```ignore
/// use log_shipper_repository::opensearch::IndexSettings;
/// use log_shipper_repository::{IndexStoreProvider, OpenSearchProvider, WriteDocumentRequest};
///
/// let provider = OpenSearchProvider::new("http://localhost:9200", IndexSettings::default())?;
/// provider.ping().await?;
/// provider.ensure_index("logs-2024-03-07").await?;
///
/// let request = WriteDocumentRequest::new("logs-2024-03-07", "log", fields);
/// provider.write_document(&request).await?;
/// ```
pub struct OpenSearchProvider {
    client: OpenSearch,
    settings: IndexSettings,
}

impl OpenSearchProvider {
    /// Create a new OpenSearch provider for the specified URL.
    ///
    /// No request is sent; call [`IndexStoreProvider::ping`] to check that the
    /// store is reachable.
    ///
    /// # Arguments
    ///
    /// * `url` - The store URL (e.g., "http://localhost:9200")
    /// * `settings` - Shard layout for indices created by this provider
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchProvider)` - A new provider instance
    /// * `Err(IndexStoreError)` - If the URL is invalid or the transport cannot be built
    pub fn new(url: &str, settings: IndexSettings) -> Result<Self, IndexStoreError> {
        let parsed_url = Url::parse(url).map_err(|e| IndexStoreError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| IndexStoreError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %url,
            shards = settings.shards,
            replicas = settings.replicas,
            "Created OpenSearch provider"
        );

        Ok(Self { client, settings })
    }

    /// Path used to write a document of the given type into an index.
    ///
    /// The store assigns the document id.
    fn document_path(index: &str, doc_type: &str) -> String {
        format!("/{}/{}", index, doc_type)
    }

    /// Validate the document type used in the write path.
    fn validate_doc_type(doc_type: &str) -> Result<(), IndexStoreError> {
        if doc_type.is_empty() {
            return Err(IndexStoreError::validation("Document type cannot be empty"));
        }

        if doc_type.starts_with('_') {
            return Err(IndexStoreError::validation(format!(
                "Document type '{}' must not start with '_'",
                doc_type
            )));
        }

        if !doc_type
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        {
            return Err(IndexStoreError::validation(format!(
                "Document type '{}' contains invalid characters. Only alphanumeric characters, '-' and '_' are allowed",
                doc_type
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl IndexStoreProvider for OpenSearchProvider {
    async fn ping(&self) -> Result<(), IndexStoreError> {
        let response = self
            .client
            .ping()
            .send()
            .await
            .map_err(|e| IndexStoreError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            return Err(IndexStoreError::connection(format!(
                "Ping failed with status {}",
                status
            )));
        }

        debug!("Store answered ping");
        Ok(())
    }

    async fn index_exists(&self, name: &str) -> Result<bool, IndexStoreError> {
        utils::validate_index_name(name)?;

        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[name]))
            .send()
            .await
            .map_err(|e| IndexStoreError::index_check(e.to_string()))?;

        match response.status_code().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            status => Err(IndexStoreError::index_check(format!(
                "Index existence check for '{}' returned status {}",
                name, status
            ))),
        }
    }

    async fn create_index(&self, name: &str) -> Result<(), IndexStoreError> {
        utils::validate_index_name(name)?;

        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(name))
            .body(self.settings.to_body())
            .send()
            .await
            .map_err(|e| IndexStoreError::index_creation(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(index = %name, status = %status, body = %error_body, "Create index request failed");
            return Err(IndexStoreError::index_creation(format!(
                "Creating index '{}' failed with status {}: {}",
                name, status, error_body
            )));
        }

        Ok(())
    }

    async fn write_document(
        &self,
        request: &WriteDocumentRequest,
    ) -> Result<WriteAck, IndexStoreError> {
        utils::validate_index_name(&request.index)?;
        Self::validate_doc_type(&request.doc_type)?;

        let body = serde_json::to_value(&request.fields)
            .map_err(|e| IndexStoreError::serialization(e.to_string()))?;
        let path = Self::document_path(&request.index, &request.doc_type);

        let response = self
            .client
            .send(
                Method::Post,
                &path,
                HeaderMap::new(),
                Option::<&()>::None,
                Some(JsonBody::new(body)),
                None,
            )
            .await
            .map_err(|e| IndexStoreError::write(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(IndexStoreError::write(format!(
                "Write to '{}' failed with status {}: {}",
                path, status, error_body
            )));
        }

        let ack = response
            .json::<WriteAck>()
            .await
            .map_err(|e| IndexStoreError::parse(e.to_string()))?;

        debug!(index = %ack.index, id = %ack.id, result = %ack.result, "Document written");
        Ok(ack)
    }
}
