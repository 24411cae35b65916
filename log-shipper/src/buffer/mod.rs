//! Buffer module for the log shipper.
//!
//! A bounded FIFO between the bus subscriber and the indexing loop. When the
//! buffer is full the subscriber waits, so store latency turns into
//! backpressure on the bus rather than unbounded memory.

use log_shipper_shared::LogMessage;
use tokio::sync::mpsc;

use crate::errors::IngestError;

/// Number of messages the buffer holds before the producer has to wait.
pub const DEFAULT_BUFFER_CAPACITY: usize = 1000;

/// Create a buffer holding up to `capacity` messages.
///
/// A capacity of zero is raised to one.
pub fn channel(capacity: usize) -> (BufferSender, BufferReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (BufferSender { tx }, BufferReceiver { rx })
}

/// Producer side of the buffer, owned by the bus subscriber.
#[derive(Debug)]
pub struct BufferSender {
    tx: mpsc::Sender<LogMessage>,
}

impl BufferSender {
    /// Append a message, waiting while the buffer is full.
    ///
    /// Fails only when the consumer side has been dropped.
    pub async fn push(&self, msg: LogMessage) -> Result<(), IngestError> {
        self.tx
            .send(msg)
            .await
            .map_err(|_| IngestError::channel("buffer consumer is gone"))
    }

    /// Free slots left in the buffer.
    pub fn available(&self) -> usize {
        self.tx.capacity()
    }
}

/// Consumer side of the buffer, owned by the indexing loop.
#[derive(Debug)]
pub struct BufferReceiver {
    rx: mpsc::Receiver<LogMessage>,
}

impl BufferReceiver {
    /// Take the oldest message, waiting while the buffer is empty.
    ///
    /// Returns `None` once the producer is gone and every buffered message
    /// has been taken.
    pub async fn pop(&mut self) -> Option<LogMessage> {
        self.rx.recv().await
    }
}
