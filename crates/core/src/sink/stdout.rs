use crate::sink::{ContentSink, SinkError};
use async_trait::async_trait;
use tokio::io::{AsyncWriteExt, Stdout};
use tokio::sync::Mutex;

/// Writes each payload to standard output, one per line.
pub struct StdoutSink {
    out: Mutex<Stdout>,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self {
            out: Mutex::new(tokio::io::stdout()),
        }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentSink for StdoutSink {
    async fn deliver(&self, content: &str) -> Result<(), SinkError> {
        let mut out = self.out.lock().await;
        let mut line = content.to_string();
        if !line.ends_with('\n') {
            line.push('\n');
        }
        out.write_all(line.as_bytes())
            .await
            .map_err(|e| SinkError::Delivery(e.to_string()))?;
        out.flush()
            .await
            .map_err(|e| SinkError::Delivery(e.to_string()))
    }
}
