//! Notification delivery.
//!
//! Scans hand a rendered `Notification` to a `NotificationSink`. The outbox
//! sink writes it to disk for whatever mailer picks it up; the log sink only
//! records it.

mod log;
mod outbox;

pub use self::log::LogSink;
pub use self::outbox::OutboxSink;

use std::path::PathBuf;

use thiserror::Error;

use crate::reporting::Notification;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("attachment {0} does not exist")]
    MissingAttachment(PathBuf),
}

/// Where finished reports go.
pub trait NotificationSink: Send + Sync {
    fn name(&self) -> &str;

    /// Deliver one notification. Returns where it ended up, if anywhere.
    fn deliver(&self, notification: &Notification) -> Result<Option<PathBuf>, NotifyError>;
}

/// Fan out to several sinks; the first failure stops delivery.
pub struct MultiSink {
    sinks: Vec<Box<dyn NotificationSink>>,
}

impl MultiSink {
    pub fn new(sinks: Vec<Box<dyn NotificationSink>>) -> Self {
        Self { sinks }
    }
}

impl NotificationSink for MultiSink {
    fn name(&self) -> &str {
        "multi"
    }

    fn deliver(&self, notification: &Notification) -> Result<Option<PathBuf>, NotifyError> {
        let mut delivered = None;
        for sink in &self.sinks {
            if let Some(path) = sink.deliver(notification)? {
                delivered.get_or_insert(path);
            }
        }
        Ok(delivered)
    }
}
