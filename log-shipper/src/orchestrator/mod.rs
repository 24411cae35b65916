//! Orchestrator module for the log shipper.
//!
//! Coordinates the bus subscriber, the index rotation, the processor and the
//! loader.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::time::{interval, sleep, Duration, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};

use log_shipper_shared::{BusEvent, LogMessage};

use crate::buffer::{self, DEFAULT_BUFFER_CAPACITY};
use crate::config::{ConnectionMode, HandlerConfig, HandlerContext};
use crate::consumer::BusSubscriber;
use crate::errors::IngestError;
use crate::loader::DocumentLoader;
use crate::processor::to_document;
use crate::rotation::{Clock, IndexRotation, SystemClock};

/// Configuration for the pipeline runner.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Number of messages buffered between the subscriber and the indexing loop.
    pub buffer_capacity: usize,
    /// How often progress is logged.
    pub progress_interval: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            progress_interval: Duration::from_secs(10),
        }
    }
}

/// Lifecycle of a pipeline runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    /// Created, not started.
    Idle,
    /// Checking that the store is reachable.
    Connecting,
    /// Moving messages from the bus into the store.
    Indexing,
    /// Finished; a runner is not restarted.
    Stopped,
}

/// Counters shared by the subscriber and the indexing loop.
#[derive(Debug, Default)]
pub struct PipelineStats {
    /// Log messages seen on the bus.
    pub received: AtomicU64,
    /// Messages pushed into the buffer.
    pub accepted: AtomicU64,
    /// Messages rejected by the filter or as malformed.
    pub filtered: AtomicU64,
    /// Messages the bus dropped because the subscriber fell behind.
    pub lagged: AtomicU64,
    /// Documents the store acknowledged.
    pub written: AtomicU64,
    /// Documents the store rejected.
    pub failed: AtomicU64,
}

/// Point-in-time copy of [`PipelineStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub received: u64,
    pub accepted: u64,
    pub filtered: u64,
    pub lagged: u64,
    pub written: u64,
    pub failed: u64,
}

impl PipelineStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            filtered: self.filtered.load(Ordering::Relaxed),
            lagged: self.lagged.load(Ordering::Relaxed),
            written: self.written.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Handle to stop a running pipeline from another task.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: broadcast::Sender<()>,
}

impl ShutdownHandle {
    /// Trigger a graceful shutdown.
    ///
    /// Messages still in the buffer are not written.
    pub fn shutdown(&self) {
        let _ = self.tx.send(());
    }
}

/// Runs one handler instance from connection check to shutdown.
///
/// The runner:
/// - Checks that the store is reachable before subscribing anything
/// - Runs the bus subscriber as a background task
/// - Writes buffered messages one by one into the active day index
/// - Stops when the bus closes, on Ctrl-C, or through a [`ShutdownHandle`]
pub struct PipelineRunner {
    name: String,
    version: String,
    bus: Option<broadcast::Receiver<BusEvent>>,
    config: HandlerConfig,
    loader: DocumentLoader,
    clock: Arc<dyn Clock>,
    runner_config: RunnerConfig,
    state: RunnerState,
    stats: Arc<PipelineStats>,
    shutdown_tx: broadcast::Sender<()>,
}

impl PipelineRunner {
    /// Create a runner for `context`, writing through `loader`.
    pub fn new(context: HandlerContext, config: HandlerConfig, loader: DocumentLoader) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            name: context.name,
            version: context.version,
            bus: Some(context.bus),
            config,
            loader,
            clock: Arc::new(SystemClock),
            runner_config: RunnerConfig::default(),
            state: RunnerState::Idle,
            stats: Arc::new(PipelineStats::default()),
            shutdown_tx,
        }
    }

    /// Replace the clock used for index rotation.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_runner_config(mut self, runner_config: RunnerConfig) -> Self {
        self.runner_config = runner_config;
        self
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    pub fn stats(&self) -> Arc<PipelineStats> {
        Arc::clone(&self.stats)
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: self.shutdown_tx.clone(),
        }
    }

    /// Run the pipeline.
    ///
    /// Fails only if the store is unreachable at start-up in fail-fast mode,
    /// or the runner has already been run. In retry mode the store is pinged
    /// every retry interval until it answers. Write failures are logged and
    /// skipped.
    #[instrument(skip(self), fields(handler = %self.name))]
    pub async fn run(&mut self) -> Result<(), IngestError> {
        let bus = match self.bus.take() {
            Some(bus) => bus,
            None => {
                self.state = RunnerState::Stopped;
                return Err(IngestError::bus("pipeline has already been run"));
            }
        };

        info!(
            version = %self.version,
            store = %self.config.store.url(),
            index_prefix = %self.config.index_prefix,
            "Starting log shipper"
        );

        self.state = RunnerState::Connecting;
        if let Err(e) = self.wait_for_store().await {
            error!(error = %e, "Index store is not reachable");
            self.state = RunnerState::Stopped;
            return Err(e);
        }
        info!("Index store connection established");

        let mut rotation = IndexRotation::new(self.config.index_prefix.as_str(), self.clock.now());
        if let Some(index) = rotation.check(self.clock.now()) {
            self.loader.ensure_index(index).await;
        }

        let (buffer_tx, mut buffer_rx) = buffer::channel(self.runner_config.buffer_capacity);

        let subscriber = BusSubscriber::new(
            bus,
            self.config.filter.clone(),
            buffer_tx,
            Arc::clone(&self.stats),
        );
        let shutdown_rx = self.shutdown_tx.subscribe();
        let mut shutdown = self.shutdown_tx.subscribe();

        let subscriber_handle = tokio::spawn(async move {
            if let Err(e) = subscriber.run(shutdown_rx).await {
                error!(error = %e, "Subscriber error");
            }
        });

        self.state = RunnerState::Indexing;
        info!(index = %rotation.active_index(), "Ready to ship log messages");

        let mut progress_timer = interval(self.runner_config.progress_interval);
        progress_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut prev_written: u64 = 0;
        let mut prev_time = std::time::Instant::now();

        loop {
            tokio::select! {
                msg = buffer_rx.pop() => {
                    match msg {
                        Some(msg) => self.index_message(&mut rotation, msg).await,
                        None => {
                            info!("Bus closed, no more messages");
                            break;
                        }
                    }
                }
                _ = shutdown.recv() => {
                    info!("Received shutdown request");
                    break;
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    break;
                }
                _ = progress_timer.tick() => {
                    let snapshot = self.stats.snapshot();
                    let now = std::time::Instant::now();
                    let elapsed_secs = now.duration_since(prev_time).as_secs_f64();
                    let docs_per_sec = if elapsed_secs > 0.0 {
                        (snapshot.written.saturating_sub(prev_written) as f64) / elapsed_secs
                    } else {
                        0.0
                    };

                    info!(
                        received = snapshot.received,
                        written = snapshot.written,
                        failed = snapshot.failed,
                        filtered = snapshot.filtered,
                        buffered = snapshot.accepted.saturating_sub(snapshot.written + snapshot.failed),
                        documents_per_sec = format!("{:.2}", docs_per_sec),
                        index = %rotation.active_index(),
                        "Shipping progress"
                    );

                    prev_written = snapshot.written;
                    prev_time = now;
                }
            }
        }

        // Dropping the buffer unblocks a subscriber waiting on a full buffer.
        drop(buffer_rx);
        let _ = self.shutdown_tx.send(());
        let _ = subscriber_handle.await;

        let snapshot = self.stats.snapshot();
        info!(
            received = snapshot.received,
            written = snapshot.written,
            failed = snapshot.failed,
            filtered = snapshot.filtered,
            lagged = snapshot.lagged,
            "Log shipper stopped"
        );
        self.state = RunnerState::Stopped;
        Ok(())
    }

    /// Ping the store until it answers, or once in fail-fast mode.
    async fn wait_for_store(&self) -> Result<(), IngestError> {
        loop {
            match self.loader.check_ready().await {
                Ok(()) => return Ok(()),
                Err(e) => match self.config.connection_mode {
                    ConnectionMode::FailFast => return Err(e),
                    ConnectionMode::Retry => {
                        warn!(
                            store = %self.config.store.url(),
                            error = %e,
                            retry_interval_secs = self.config.retry_interval.as_secs(),
                            "Failed to connect to index store, retrying..."
                        );
                        sleep(self.config.retry_interval).await;
                    }
                },
            }
        }
    }

    /// Write one message into the active index, rolling over first if the
    /// day changed.
    async fn index_message(&self, rotation: &mut IndexRotation, msg: LogMessage) {
        if let Some(index) = rotation.check(self.clock.now()) {
            info!(index = %index, "Rolling over to new index");
            self.loader.ensure_index(index).await;
        }

        let document = to_document(&msg);
        match self.loader.write(rotation.active_index(), document).await {
            Ok(ack) => {
                debug!(index = %ack.index, id = %ack.id, result = %ack.result, "Document written");
                self.stats.written.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                error!(
                    index = %rotation.active_index(),
                    source = %msg.source,
                    msg = %msg.msg,
                    error = %e,
                    "Failed to write log message"
                );
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Trigger a graceful shutdown.
    pub fn shutdown(&self) {
        if self.shutdown_tx.send(()).is_err() {
            warn!("Shutdown requested but the pipeline is not running");
        }
    }
}
