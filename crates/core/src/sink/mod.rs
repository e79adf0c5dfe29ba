//! Content sinks: where a step's content is delivered.
//!
//! The executor only knows the [`ContentSink`] trait. Implementations:
//! - [`StdoutSink`]: writes each payload to standard output
//! - [`ClipboardSink`]: places each payload on the system clipboard (feature `clipboard`)
//! - [`MockSink`]: records deliveries and fails on demand, for tests

#[cfg(feature = "clipboard")]
pub mod clipboard;
pub mod mock;
pub mod stdout;

#[cfg(feature = "clipboard")]
pub use clipboard::ClipboardSink;
pub use mock::MockSink;
pub use stdout::StdoutSink;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    #[error("Sink not available: {0}")]
    Unavailable(String),
    #[error("Delivery failed: {0}")]
    Delivery(String),
    #[error("Sink closed")]
    Closed,
}

/// Delivers a step's content payload.
///
/// A delivery is treated as one opaque operation: the executor never
/// interrupts it, so cancellation takes effect only after it returns.
#[async_trait]
pub trait ContentSink: Send + Sync {
    async fn deliver(&self, content: &str) -> Result<(), SinkError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct RejectingSink;

    #[async_trait]
    impl ContentSink for RejectingSink {
        async fn deliver(&self, _content: &str) -> Result<(), SinkError> {
            Err(SinkError::Unavailable("no display".to_string()))
        }
    }

    #[tokio::test]
    async fn test_sink_as_trait_object() {
        let sink: Arc<dyn ContentSink> = Arc::new(RejectingSink);
        let err = sink.deliver("payload").await.unwrap_err();
        assert_eq!(err.to_string(), "Sink not available: no display");
    }
}
