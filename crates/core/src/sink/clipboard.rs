//! System clipboard sink.
//!
//! The clipboard handle lives on a dedicated thread for the lifetime of the
//! sink. On X11 and Wayland the contents disappear when the owning handle is
//! dropped, so one handle is kept rather than one per delivery.

use crate::sink::{ContentSink, SinkError};
use async_trait::async_trait;
use std::sync::mpsc as std_mpsc;
use tokio::sync::oneshot;
use tracing::{debug, warn};

type Request = (String, oneshot::Sender<Result<(), SinkError>>);

pub struct ClipboardSink {
    requests: std_mpsc::Sender<Request>,
}

impl ClipboardSink {
    /// Start the clipboard thread.
    ///
    /// Fails if the platform clipboard cannot be opened (for example, no
    /// display server).
    pub fn new() -> Result<Self, SinkError> {
        let (tx, rx) = std_mpsc::channel::<Request>();
        let (ready_tx, ready_rx) = std_mpsc::channel::<Result<(), SinkError>>();

        std::thread::Builder::new()
            .name("clipflow-clipboard".to_string())
            .spawn(move || {
                let mut clipboard = match arboard::Clipboard::new() {
                    Ok(clipboard) => {
                        let _ = ready_tx.send(Ok(()));
                        clipboard
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(SinkError::Unavailable(e.to_string())));
                        return;
                    }
                };

                for (text, reply) in rx {
                    let result = clipboard
                        .set_text(text)
                        .map_err(|e| SinkError::Delivery(e.to_string()));
                    if let Err(e) = &result {
                        warn!("clipboard write failed: {}", e);
                    }
                    let _ = reply.send(result);
                }
                debug!("clipboard thread exiting");
            })
            .map_err(|e| SinkError::Unavailable(e.to_string()))?;

        ready_rx.recv().map_err(|_| SinkError::Closed)??;

        Ok(Self { requests: tx })
    }
}

#[async_trait]
impl ContentSink for ClipboardSink {
    async fn deliver(&self, content: &str) -> Result<(), SinkError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.requests
            .send((content.to_string(), reply_tx))
            .map_err(|_| SinkError::Closed)?;
        reply_rx.await.map_err(|_| SinkError::Closed)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shareable<T: Send + Sync + 'static>() {}

    #[test]
    fn test_sink_is_shareable_across_tasks() {
        shareable::<ClipboardSink>();
    }
}
