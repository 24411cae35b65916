//! Index store provider trait definition.
//!
//! This module defines the abstract interface for index store operations,
//! allowing for different backend implementations (OpenSearch, Elasticsearch, etc.).

use async_trait::async_trait;
use tracing::{debug, info};

use crate::errors::IndexStoreError;
use crate::types::{EnsureIndexOutcome, WriteAck, WriteDocumentRequest};

/// Abstracts the underlying index store implementation (OpenSearch, Elasticsearch, etc.).
///
/// This trait defines the thin call surface the pipeline needs: check that
/// the store is reachable, make sure an index exists, and write a document.
/// Implementations are injected into the pipeline as `Arc<dyn IndexStoreProvider>`
/// so tests can substitute a mock.
///
/// All methods return `Result<T, IndexStoreError>` for consistent error handling across
/// different backend implementations.
#[async_trait]
pub trait IndexStoreProvider: Send + Sync {
    /// Check that the store answers at the wire level.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the store responded
    /// * `Err(IndexStoreError)` - A connection error if it did not
    async fn ping(&self) -> Result<(), IndexStoreError>;

    /// Check whether an index exists.
    ///
    /// # Arguments
    ///
    /// * `name` - The index name
    ///
    /// # Returns
    ///
    /// * `Ok(true)` / `Ok(false)` - Whether the index exists
    /// * `Err(IndexStoreError)` - If the check itself failed
    async fn index_exists(&self, name: &str) -> Result<bool, IndexStoreError>;

    /// Create an index with the provider's fixed settings.
    ///
    /// Does not check for existence first; use [`IndexStoreProvider::ensure_index`]
    /// for the idempotent variant.
    async fn create_index(&self, name: &str) -> Result<(), IndexStoreError>;

    /// Write a single document.
    ///
    /// # Arguments
    ///
    /// * `request` - Target index, document type and fields
    ///
    /// # Returns
    ///
    /// * `Ok(WriteAck)` - The store's acknowledgement
    /// * `Err(IndexStoreError)` - If the write was rejected or never reached the store
    async fn write_document(
        &self,
        request: &WriteDocumentRequest,
    ) -> Result<WriteAck, IndexStoreError>;

    /// Make sure an index exists, creating it only if it is missing.
    ///
    /// Calling this repeatedly for the same name is safe: once the index
    /// exists every further call reports `AlreadyExists` without touching it.
    ///
    /// # Returns
    ///
    /// * `Ok(EnsureIndexOutcome)` - Whether the index was created or already there
    /// * `Err(IndexStoreError)` - If the check or the creation failed
    async fn ensure_index(&self, name: &str) -> Result<EnsureIndexOutcome, IndexStoreError> {
        if self.index_exists(name).await? {
            debug!(index = %name, "Index already exists");
            return Ok(EnsureIndexOutcome::AlreadyExists);
        }

        debug!(index = %name, "Index does not exist");
        self.create_index(name).await?;
        info!(index = %name, "Created index");
        Ok(EnsureIndexOutcome::Created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    use log_shipper_shared::FieldMapping;

    /// In-memory store that records which calls were made.
    struct MockStore {
        indices: Mutex<HashSet<String>>,
        create_calls: Mutex<Vec<String>>,
        fail_exists: bool,
        fail_create: bool,
    }

    impl MockStore {
        fn new() -> Self {
            Self {
                indices: Mutex::new(HashSet::new()),
                create_calls: Mutex::new(Vec::new()),
                fail_exists: false,
                fail_create: false,
            }
        }
    }

    #[async_trait]
    impl IndexStoreProvider for MockStore {
        async fn ping(&self) -> Result<(), IndexStoreError> {
            Ok(())
        }

        async fn index_exists(&self, name: &str) -> Result<bool, IndexStoreError> {
            if self.fail_exists {
                return Err(IndexStoreError::index_check("boom"));
            }
            Ok(self.indices.lock().unwrap().contains(name))
        }

        async fn create_index(&self, name: &str) -> Result<(), IndexStoreError> {
            self.create_calls.lock().unwrap().push(name.to_string());
            if self.fail_create {
                return Err(IndexStoreError::index_creation("boom"));
            }
            self.indices.lock().unwrap().insert(name.to_string());
            Ok(())
        }

        async fn write_document(
            &self,
            request: &WriteDocumentRequest,
        ) -> Result<WriteAck, IndexStoreError> {
            Ok(WriteAck {
                index: request.index.clone(),
                id: "1".to_string(),
                result: "created".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_ensure_index_creates_missing_index() {
        let store = MockStore::new();

        let outcome = store.ensure_index("logs-2024-03-07").await.unwrap();

        assert_eq!(outcome, EnsureIndexOutcome::Created);
        assert_eq!(store.create_calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_ensure_index_is_idempotent() {
        let store = MockStore::new();

        store.ensure_index("logs-2024-03-07").await.unwrap();
        let outcome = store.ensure_index("logs-2024-03-07").await.unwrap();

        assert_eq!(outcome, EnsureIndexOutcome::AlreadyExists);
        assert_eq!(store.create_calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_ensure_index_propagates_check_error() {
        let store = MockStore {
            fail_exists: true,
            ..MockStore::new()
        };

        let result = store.ensure_index("logs-2024-03-07").await;

        assert!(matches!(result, Err(IndexStoreError::IndexCheckError(_))));
        assert!(store.create_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ensure_index_propagates_create_error() {
        let store = MockStore {
            fail_create: true,
            ..MockStore::new()
        };

        let result = store.ensure_index("logs-2024-03-07").await;

        assert!(matches!(result, Err(IndexStoreError::IndexCreationError(_))));
    }

    #[tokio::test]
    async fn test_write_document_through_trait_object() {
        let store: Box<dyn IndexStoreProvider> = Box::new(MockStore::new());
        let request = WriteDocumentRequest::new("logs-2024-03-07", "log", FieldMapping::new());

        let ack = store.write_document(&request).await.unwrap();

        assert_eq!(ack.index, "logs-2024-03-07");
    }
}
