//! Metric delivery to a line-oriented collector
//!
//! Delivery is fire-and-forget: one connection, one write, no retry. A sink
//! never fails the run; callers get a `DeliveryOutcome` for logging only.
//! An empty batch still sends the terminating blank line.

use async_trait::async_trait;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::debug;

/// Default collector host
pub const DEFAULT_SINK_HOST: &str = "localhost";

/// Default collector port
pub const DEFAULT_SINK_PORT: u16 = 2024;

/// What happened to one batch of lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The whole payload was written and the stream shut down
    Delivered { lines: usize, bytes: usize },
    /// Connection or write failed; the batch is dropped
    Failed(String),
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered { .. })
    }
}

/// Destination for formatted metric lines
#[async_trait]
pub trait MetricSink: Send + Sync {
    /// Deliver one batch at most once
    async fn deliver(&self, lines: &[String]) -> DeliveryOutcome;

    /// Where batches go, for log records
    fn address(&self) -> String;
}

/// Wire payload: lines joined by newlines, terminated by a blank line
pub fn encode_payload(lines: &[String]) -> String {
    format!("{}\n\n", lines.join("\n"))
}

/// Sink writing plaintext lines over a fresh TCP connection per batch
#[derive(Debug, Clone)]
pub struct PlaintextSink {
    host: String,
    port: u16,
    connect_timeout: Duration,
}

impl Default for PlaintextSink {
    fn default() -> Self {
        Self::new(DEFAULT_SINK_HOST, DEFAULT_SINK_PORT)
    }
}

impl PlaintextSink {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            connect_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    async fn send(&self, payload: &[u8]) -> std::io::Result<()> {
        let addr = self.address();
        let mut stream = tokio::time::timeout(self.connect_timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::TimedOut, "connect timed out"))??;

        stream.write_all(payload).await?;
        stream.shutdown().await?;
        Ok(())
    }
}

#[async_trait]
impl MetricSink for PlaintextSink {
    async fn deliver(&self, lines: &[String]) -> DeliveryOutcome {
        let payload = encode_payload(lines);
        match self.send(payload.as_bytes()).await {
            Ok(()) => DeliveryOutcome::Delivered {
                lines: lines.len(),
                bytes: payload.len(),
            },
            Err(e) => {
                debug!(addr = %self.address(), error = %e, "Metric delivery failed, dropping batch");
                DeliveryOutcome::Failed(e.to_string())
            }
        }
    }

    /// `host:port` of the collector
    fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    fn lines() -> Vec<String> {
        vec![
            "one_min.capi.rtc.sched1.number_of_jobs 1 1700000000".to_string(),
            "one_min.capi.rtc.hosts.READY 1 1700000000".to_string(),
        ]
    }

    #[test]
    fn test_encode_payload_ends_with_blank_line() {
        assert_eq!(
            encode_payload(&lines()),
            "one_min.capi.rtc.sched1.number_of_jobs 1 1700000000\none_min.capi.rtc.hosts.READY 1 1700000000\n\n"
        );
    }

    #[tokio::test]
    async fn test_deliver_writes_payload() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let reader = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = String::new();
            socket.read_to_string(&mut received).await.unwrap();
            received
        });

        let sink = PlaintextSink::new("127.0.0.1", port);
        let outcome = sink.deliver(&lines()).await;

        let received = reader.await.unwrap();
        assert_eq!(received, encode_payload(&lines()));
        assert_eq!(
            outcome,
            DeliveryOutcome::Delivered {
                lines: 2,
                bytes: received.len()
            }
        );
    }

    #[tokio::test]
    async fn test_deliver_without_listener_is_absorbed() {
        // Bind then drop to get a port with nothing listening on it.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };

        let sink = PlaintextSink::new("127.0.0.1", port);
        let outcome = sink.deliver(&lines()).await;
        assert!(matches!(outcome, DeliveryOutcome::Failed(_)));
        assert!(!outcome.is_delivered());
    }

    #[test]
    fn test_default_address() {
        assert_eq!(PlaintextSink::default().address(), "localhost:2024");
    }

    #[tokio::test]
    async fn test_empty_batch_still_sends_terminator() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let reader = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = String::new();
            socket.read_to_string(&mut received).await.unwrap();
            received
        });

        let sink = PlaintextSink::new("127.0.0.1", port);
        let outcome = sink.deliver(&[]).await;

        assert_eq!(reader.await.unwrap(), "\n\n");
        assert_eq!(outcome, DeliveryOutcome::Delivered { lines: 0, bytes: 2 });
    }
}
