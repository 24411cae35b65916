//! Loader module for the log shipper.
//!
//! Creates day indices and writes documents into the index store.

use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::errors::IngestError;
use log_shipper_repository::opensearch::DEFAULT_DOCUMENT_TYPE;
use log_shipper_repository::{
    EnsureIndexOutcome, IndexStoreProvider, WriteAck, WriteDocumentRequest,
};
use log_shipper_shared::FieldMapping;

/// Loader that writes documents into the index store.
///
/// The loader is responsible for:
/// - Making sure the active index exists
/// - Writing one document per message with the configured document type
pub struct DocumentLoader {
    provider: Arc<dyn IndexStoreProvider>,
    doc_type: String,
}

impl DocumentLoader {
    /// Create a new loader writing `log` documents.
    pub fn new(provider: Arc<dyn IndexStoreProvider>) -> Self {
        Self::with_doc_type(provider, DEFAULT_DOCUMENT_TYPE)
    }

    /// Create a new loader writing documents of a custom type.
    pub fn with_doc_type(provider: Arc<dyn IndexStoreProvider>, doc_type: impl Into<String>) -> Self {
        Self {
            provider,
            doc_type: doc_type.into(),
        }
    }

    pub fn doc_type(&self) -> &str {
        &self.doc_type
    }

    /// Check that the store is reachable.
    pub async fn check_ready(&self) -> Result<(), IngestError> {
        self.provider.ping().await?;
        Ok(())
    }

    /// Make sure `index` exists.
    ///
    /// Failures are logged and swallowed: the pipeline keeps writing to the
    /// index name, and the store decides what to do with those writes.
    #[instrument(skip(self))]
    pub async fn ensure_index(&self, index: &str) -> Option<EnsureIndexOutcome> {
        match self.provider.ensure_index(index).await {
            Ok(outcome) => {
                debug!(index = %index, outcome = ?outcome, "Index ready");
                Some(outcome)
            }
            Err(e) => {
                warn!(index = %index, error = %e, "Index could not be created");
                None
            }
        }
    }

    /// Write a document into `index`.
    pub async fn write(&self, index: &str, fields: FieldMapping) -> Result<WriteAck, IngestError> {
        let request = WriteDocumentRequest::new(index, self.doc_type.as_str(), fields);
        let ack = self.provider.write_document(&request).await?;
        Ok(ack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use log_shipper_repository::IndexStoreError;
    use std::sync::Mutex;

    /// Mock store for testing.
    struct MockStore {
        writes: Mutex<Vec<WriteDocumentRequest>>,
        fail_create: bool,
        fail_write: bool,
    }

    impl MockStore {
        fn new() -> Self {
            Self {
                writes: Mutex::new(Vec::new()),
                fail_create: false,
                fail_write: false,
            }
        }
    }

    #[async_trait]
    impl IndexStoreProvider for MockStore {
        async fn ping(&self) -> Result<(), IndexStoreError> {
            Err(IndexStoreError::connection("unreachable"))
        }

        async fn index_exists(&self, _name: &str) -> Result<bool, IndexStoreError> {
            Ok(false)
        }

        async fn create_index(&self, _name: &str) -> Result<(), IndexStoreError> {
            if self.fail_create {
                return Err(IndexStoreError::index_creation("rejected"));
            }
            Ok(())
        }

        async fn write_document(
            &self,
            request: &WriteDocumentRequest,
        ) -> Result<WriteAck, IndexStoreError> {
            if self.fail_write {
                return Err(IndexStoreError::write("rejected"));
            }
            self.writes.lock().unwrap().push(request.clone());
            Ok(WriteAck {
                index: request.index.clone(),
                id: "1".to_string(),
                result: "created".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_write_uses_log_type() {
        let store = Arc::new(MockStore::new());
        let loader = DocumentLoader::new(store.clone());

        let mut fields = FieldMapping::new();
        fields.insert("msg", "hello");
        let ack = loader.write("app-2024-03-07", fields).await.unwrap();

        assert_eq!(ack.index, "app-2024-03-07");
        let writes = store.writes.lock().unwrap();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].doc_type, "log");
        assert_eq!(writes[0].index, "app-2024-03-07");
    }

    #[tokio::test]
    async fn test_write_error_is_returned() {
        let store = Arc::new(MockStore {
            fail_write: true,
            ..MockStore::new()
        });
        let loader = DocumentLoader::new(store);

        let result = loader.write("app-2024-03-07", FieldMapping::new()).await;
        assert!(matches!(
            result,
            Err(IngestError::StoreError(IndexStoreError::WriteError(_)))
        ));
    }

    #[tokio::test]
    async fn test_ensure_index_failure_is_swallowed() {
        let store = Arc::new(MockStore {
            fail_create: true,
            ..MockStore::new()
        });
        let loader = DocumentLoader::new(store);

        assert_eq!(loader.ensure_index("app-2024-03-07").await, None);
    }

    #[tokio::test]
    async fn test_ensure_index_success() {
        let loader = DocumentLoader::new(Arc::new(MockStore::new()));
        assert_eq!(
            loader.ensure_index("app-2024-03-07").await,
            Some(EnsureIndexOutcome::Created)
        );
    }

    #[tokio::test]
    async fn test_check_ready_reports_unreachable_store() {
        let loader = DocumentLoader::new(Arc::new(MockStore::new()));
        assert!(matches!(
            loader.check_ready().await,
            Err(IngestError::StoreError(IndexStoreError::ConnectionError(_)))
        ));
    }

    #[test]
    fn test_custom_doc_type() {
        let loader = DocumentLoader::with_doc_type(Arc::new(MockStore::new()), "event");
        assert_eq!(loader.doc_type(), "event");
    }
}
