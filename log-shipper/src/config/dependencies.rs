//! Dependency initialization and wiring for the log shipper.

use std::sync::Arc;
use tracing::info;

use crate::config::handler::HandlerContext;
use crate::loader::DocumentLoader;
use crate::orchestrator::PipelineRunner;
use crate::ShipperError;
use log_shipper_repository::opensearch::IndexSettings;
use log_shipper_repository::OpenSearchProvider;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured pipeline ready to run.
    pub runner: PipelineRunner,
}

impl Dependencies {
    /// Initialize all dependencies for the handler described by `context`.
    ///
    /// Configuration keys are read through the context's config source, see
    /// [`HandlerConfig::load`](crate::config::HandlerConfig::load). No request
    /// is sent to the store here; the runner checks reachability when it
    /// starts, honouring the configured connection mode.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(ShipperError)` - If the store client cannot be built from the configured address
    pub async fn new(context: HandlerContext) -> Result<Self, ShipperError> {
        let config = context.handler_config();

        info!(
            handler = %config.name,
            store = %config.store.url(),
            index_prefix = %config.index_prefix,
            inputs = ?config.filter.inputs,
            connection_mode = %config.connection_mode,
            retry_interval_secs = config.retry_interval.as_secs(),
            "Initializing dependencies"
        );

        let provider = OpenSearchProvider::new(&config.store.url(), IndexSettings::default())?;

        let loader = DocumentLoader::new(Arc::new(provider));
        let runner = PipelineRunner::new(context, config, loader);

        Ok(Self { runner })
    }
}
