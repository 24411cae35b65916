//! Bus subscriber implementation for the log shipper.
//!
//! Receives events from the shared bus, keeps the log messages that pass the
//! filter and pushes them into the buffer.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use log_shipper_shared::{BusEvent, LogMessage};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, instrument, trace, warn};

use crate::buffer::BufferSender;
use crate::errors::IngestError;
use crate::filter::FilterConfig;
use crate::orchestrator::PipelineStats;

/// Subscriber task feeding the buffer from the bus.
pub struct BusSubscriber {
    bus: broadcast::Receiver<BusEvent>,
    filter: FilterConfig,
    buffer: BufferSender,
    stats: Arc<PipelineStats>,
}

impl BusSubscriber {
    /// Create a new subscriber.
    ///
    /// # Arguments
    ///
    /// * `bus` - Subscription to the shared bus
    /// * `filter` - Rules deciding which messages are shipped
    /// * `buffer` - Producer side of the buffer
    /// * `stats` - Counters shared with the pipeline runner
    pub fn new(
        bus: broadcast::Receiver<BusEvent>,
        filter: FilterConfig,
        buffer: BufferSender,
        stats: Arc<PipelineStats>,
    ) -> Self {
        Self {
            bus,
            filter,
            buffer,
            stats,
        }
    }

    /// Consume the bus until it closes, a shutdown signal arrives, or the
    /// indexing loop drops the buffer.
    ///
    /// Pushing waits while the buffer is full, which in turn makes this
    /// subscriber fall behind the bus; messages the bus drops because of that
    /// are counted as lagged.
    #[instrument(skip(self, shutdown))]
    pub async fn run(
        mut self,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), IngestError> {
        info!(
            inputs = ?self.filter.inputs,
            match_mode = %self.filter.match_mode,
            required_success = ?self.filter.required_success,
            "Subscribed to bus"
        );

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("Subscriber received shutdown signal");
                    break;
                }
                event = self.bus.recv() => {
                    match event {
                        Ok(BusEvent::Message(msg)) => {
                            // The buffer only closes when the indexing loop stops.
                            if let Err(e) = self.handle_message(msg).await {
                                info!(reason = %e, "Buffer closed, subscriber stopping");
                                break;
                            }
                        }
                        Ok(BusEvent::Other { kind }) => {
                            trace!(kind = %kind, "Ignoring non-message bus event");
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            self.stats.lagged.fetch_add(skipped, Ordering::Relaxed);
                            warn!(skipped = skipped, "Subscriber lagged behind the bus, messages dropped");
                        }
                        Err(RecvError::Closed) => {
                            info!("Bus closed");
                            break;
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Filter one message and push it into the buffer if it is accepted.
    async fn handle_message(&self, msg: LogMessage) -> Result<(), IngestError> {
        self.stats.received.fetch_add(1, Ordering::Relaxed);

        if let Err(reason) = msg.validate() {
            debug!(reason = %reason, "Ignoring malformed message");
            self.stats.filtered.fetch_add(1, Ordering::Relaxed);
            return Ok(());
        }

        if !self.filter.accept(&msg) {
            trace!(source = %msg.source, success = msg.source_success, "Message filtered out");
            self.stats.filtered.fetch_add(1, Ordering::Relaxed);
            return Ok(());
        }

        self.buffer.push(msg).await?;
        self.stats.accepted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
