//! Publishes JSON lines onto the bus.
//!
//! Lets the shipper run standalone: each line read is one JSON encoded
//! [`LogMessage`]. Lines that are not log messages still go on the bus as
//! non-message events so subscribers see the same mix a real host produces.

use std::time::Duration;

use log_shipper_shared::{BusEvent, LogMessage};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::broadcast;
use tokio::time::sleep;
use tracing::{debug, info};

/// Event kind used for lines that do not decode as a log message.
pub const RAW_LINE_KIND: &str = "raw-line";

/// Delay between checks while the bus is full.
const FULL_BUS_POLL: Duration = Duration::from_millis(5);

/// Read `reader` line by line and publish every line on `bus`.
///
/// `capacity` must be the capacity the bus was created with. Reading pauses
/// while that many events are still unread by the slowest subscriber, so a
/// slow pipeline slows the input down instead of losing lines.
///
/// Blank lines are skipped. Returns the number of events published, once the
/// reader is exhausted or nobody is subscribed to the bus any more.
pub async fn publish_lines<R>(
    reader: R,
    bus: &broadcast::Sender<BusEvent>,
    capacity: usize,
) -> std::io::Result<u64>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut published = 0u64;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let event = match serde_json::from_str::<LogMessage>(line) {
            Ok(msg) => BusEvent::Message(msg),
            Err(e) => {
                debug!(error = %e, "Line is not a log message");
                BusEvent::Other {
                    kind: RAW_LINE_KIND.to_string(),
                }
            }
        };

        while bus.len() >= capacity && bus.receiver_count() > 0 {
            sleep(FULL_BUS_POLL).await;
        }

        if bus.send(event).is_err() {
            info!("No bus subscribers left, stopping input");
            break;
        }
        published += 1;
    }

    Ok(published)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publishes_messages_and_raw_lines() {
        let (tx, mut rx) = broadcast::channel(16);
        let input: &[u8] = br#"{"time":"2024-03-07T10:00:00+01:00","msg":"hello","source":"a"}

not json
{"time":"2024-03-07T10:00:01+01:00","msg":"bye","source":"b","kv":{"pid":"7"}}
"#;

        let published = publish_lines(input, &tx, 16).await.unwrap();
        assert_eq!(published, 3);

        let first = rx.recv().await.unwrap();
        let first = first.as_message().unwrap();
        assert_eq!(first.msg, "hello");
        assert_eq!(first.source, "a");
        assert_eq!(first.msg_type, "");
        assert!(first.source_success);

        assert_eq!(
            rx.recv().await.unwrap(),
            BusEvent::Other {
                kind: RAW_LINE_KIND.to_string()
            }
        );

        let third = rx.recv().await.unwrap();
        let third = third.as_message().unwrap();
        assert_eq!(third.source, "b");
        assert_eq!(third.kv.get("pid").map(String::as_str), Some("7"));
    }

    #[tokio::test]
    async fn test_stops_without_subscribers() {
        let (tx, rx) = broadcast::channel::<BusEvent>(16);
        drop(rx);

        let input: &[u8] = b"one\ntwo\n";
        assert_eq!(publish_lines(input, &tx, 16).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_waits_for_slow_subscriber_instead_of_dropping() {
        let (tx, mut rx) = broadcast::channel::<BusEvent>(4);
        let input: String = (0..50)
            .map(|i| format!(r#"{{"time":"2024-03-07T10:00:00Z","msg":"{}","source":"a"}}"#, i) + "\n")
            .collect();

        let reader = tokio::spawn(async move {
            let mut bodies = Vec::new();
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        if let Some(msg) = event.as_message() {
                            bodies.push(msg.msg.clone());
                        }
                        tokio::time::sleep(Duration::from_millis(1)).await;
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => panic!("lagged by {}", n),
                    Err(broadcast::error::RecvError::Closed) => return bodies,
                }
            }
        });

        let published = publish_lines(input.as_bytes(), &tx, 4).await.unwrap();
        drop(tx);

        assert_eq!(published, 50);
        let bodies = tokio::time::timeout(Duration::from_secs(5), reader)
            .await
            .unwrap()
            .unwrap();
        let expected: Vec<String> = (0..50).map(|i| i.to_string()).collect();
        assert_eq!(bodies, expected);
    }
}
