//! Sinks with controllable timing for deterministic executor tests.

use async_trait::async_trait;
use cf_core::sink::{ContentSink, SinkError};
use std::sync::Mutex;
use tokio::sync::{Notify, Semaphore};

/// Blocks each delivery until the test releases it.
///
/// `entered` is notified when a delivery starts, so the test knows the
/// executor is inside a step.
#[allow(dead_code)]
pub struct GatedSink {
    entered: Notify,
    release: Semaphore,
    delivered: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl GatedSink {
    pub fn new() -> Self {
        Self {
            entered: Notify::new(),
            release: Semaphore::new(0),
            delivered: Mutex::new(Vec::new()),
        }
    }

    /// Wait until a delivery is in progress.
    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    /// Let one blocked delivery finish.
    pub fn release_one(&self) {
        self.release.add_permits(1);
    }

    pub fn delivered(&self) -> Vec<String> {
        self.delivered.lock().expect("lock").clone()
    }
}

#[async_trait]
impl ContentSink for GatedSink {
    async fn deliver(&self, content: &str) -> Result<(), SinkError> {
        self.entered.notify_one();
        let permit = self.release.acquire().await.map_err(|_| SinkError::Closed)?;
        permit.forget();
        self.delivered.lock().expect("lock").push(content.to_string());
        Ok(())
    }
}
