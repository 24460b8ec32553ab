//! Outbox directory sink.
//!
//! Each notification becomes `<outbox>/<stamp>_<slug>/` holding `message.html`,
//! `subject.txt`, an optional `to.txt` and copies of the attachments.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::info;

use super::{NotificationSink, NotifyError};
use crate::reporting::Notification;

#[derive(Debug, Clone)]
pub struct OutboxSink {
    dir: PathBuf,
    recipient: Option<String>,
}

fn write_err(path: &Path) -> impl FnOnce(std::io::Error) -> NotifyError + '_ {
    move |source| NotifyError::Write {
        path: path.to_path_buf(),
        source,
    }
}

/// Lowercase ASCII slug of the subject, at most 48 characters.
fn slug(subject: &str) -> String {
    let mut out = String::new();
    for c in subject.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    out.truncate(48);
    out.trim_end_matches('-').to_string()
}

impl OutboxSink {
    pub fn new(dir: impl Into<PathBuf>, recipient: Option<String>) -> Self {
        Self {
            dir: dir.into(),
            recipient,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl NotificationSink for OutboxSink {
    fn name(&self) -> &str {
        "outbox"
    }

    fn deliver(&self, notification: &Notification) -> Result<Option<PathBuf>, NotifyError> {
        for attachment in &notification.attachments {
            if !attachment.is_file() {
                return Err(NotifyError::MissingAttachment(attachment.clone()));
            }
        }

        let stamp = Utc::now().format("%Y%m%d_%H%M%S_%3f");
        let dir = self.dir.join(format!("{stamp}_{}", slug(&notification.subject)));
        std::fs::create_dir_all(&dir).map_err(write_err(&dir))?;

        let subject_path = dir.join("subject.txt");
        std::fs::write(&subject_path, &notification.subject).map_err(write_err(&subject_path))?;
        if let Some(recipient) = &self.recipient {
            let to_path = dir.join("to.txt");
            std::fs::write(&to_path, recipient).map_err(write_err(&to_path))?;
        }
        for attachment in &notification.attachments {
            // is_file() above guarantees a file name.
            if let Some(name) = attachment.file_name() {
                let target = dir.join(name);
                std::fs::copy(attachment, &target).map_err(write_err(&target))?;
            }
        }
        let html_path = dir.join("message.html");
        std::fs::write(&html_path, &notification.html).map_err(write_err(&html_path))?;

        info!(
            subject = %notification.subject,
            dir = %dir.display(),
            "notification written to outbox"
        );
        Ok(Some(dir))
    }
}
