use std::path::PathBuf;

use tracing::info;

use super::{NotificationSink, NotifyError};
use crate::reporting::Notification;

/// Logs the subject and attachments.
#[derive(Debug, Clone)]
pub struct LogSink {
    recipient: Option<String>,
}

impl LogSink {
    pub fn new(recipient: Option<String>) -> Self {
        Self { recipient }
    }
}

impl NotificationSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    fn deliver(&self, notification: &Notification) -> Result<Option<PathBuf>, NotifyError> {
        info!(
            subject = %notification.subject,
            recipient = self.recipient.as_deref().unwrap_or("-"),
            attachments = notification.attachments.len(),
            html_bytes = notification.html.len(),
            "notification"
        );
        Ok(None)
    }
}
