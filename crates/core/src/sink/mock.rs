//! Mock sink implementation for testing.

use crate::sink::{ContentSink, SinkError};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

/// Records every payload it receives and fails on selected payloads.
#[derive(Default)]
pub struct MockSink {
    delivered: Mutex<Vec<String>>,
    failing: HashSet<String>,
}

impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that rejects any payload equal to one of `contents`.
    pub fn failing_on<I, S>(contents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            delivered: Mutex::new(Vec::new()),
            failing: contents.into_iter().map(Into::into).collect(),
        }
    }

    /// Payloads delivered successfully, in order.
    pub fn delivered(&self) -> Vec<String> {
        self.delivered
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ContentSink for MockSink {
    async fn deliver(&self, content: &str) -> Result<(), SinkError> {
        if self.failing.contains(content) {
            return Err(SinkError::Delivery(format!("mock rejected '{content}'")));
        }
        self.delivered
            .lock()
            .map_err(|_| SinkError::Closed)?
            .push(content.to_string());
        Ok(())
    }
}
