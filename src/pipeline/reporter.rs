use super::messages::{PipelineEvent, Severity, StatusMessage};
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// Ordered sink for everything a run reports.
///
/// Sends wait for channel capacity so no message is dropped while a consumer
/// is attached; once the consumer is gone events are discarded.
#[derive(Debug, Clone)]
pub struct Reporter {
    sender: mpsc::Sender<PipelineEvent>,
}

impl Reporter {
    pub fn new(sender: mpsc::Sender<PipelineEvent>) -> Self {
        Self { sender }
    }

    pub async fn send(&self, event: PipelineEvent) {
        if self.sender.send(event).await.is_err() {
            trace!("Event receiver dropped, discarding event");
        }
    }

    pub async fn status(&self, severity: Severity, text: impl Into<String>) {
        let message = StatusMessage::new(severity, text);
        debug!("[{}] {}", severity.as_str(), message.text);
        self.send(PipelineEvent::Status(message)).await;
    }

    pub async fn info(&self, text: impl Into<String>) {
        self.status(Severity::Info, text).await;
    }

    pub async fn warn(&self, text: impl Into<String>) {
        self.status(Severity::Warning, text).await;
    }

    pub async fn error(&self, text: impl Into<String>) {
        self.status(Severity::Error, text).await;
    }
}
