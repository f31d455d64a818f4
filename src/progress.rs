// Progress reporting for long-running drain operations

use serde::Serialize;
use tokio::sync::mpsc;

use crate::pagination::PageResult;

/// Sink for human-readable progress events. The synchronous JSON path and
/// the streaming path consume the engines through this same interface.
pub trait ProgressSink: Send + Sync {
    /// Called after each remote page with a status line and the number of
    /// records collected so far.
    fn notify(&self, status: &str, count: usize);
}

/// Progress goes to the log only; used by the plain JSON response path.
pub struct LogSink;

impl ProgressSink for LogSink {
    fn notify(&self, status: &str, count: usize) {
        log::debug!("[Drain] {} ({} records)", status, count);
    }
}

/// Events pushed to a streaming client: zero or more `Progress`, then
/// exactly one `Complete` or `Error`.
#[derive(Debug, Clone, Serialize)]
pub enum StreamEvent {
    Progress { status: String, count: usize },
    Complete(PageResult),
    Error { error: String },
}

/// Forwards progress onto a channel feeding an open event stream.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<StreamEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<StreamEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelSink {
    fn notify(&self, status: &str, count: usize) {
        // A client that disconnected mid-stream drops the receiver; the
        // drain itself keeps going.
        let _ = self.tx.send(StreamEvent::Progress {
            status: status.to_string(),
            count,
        });
    }
}
