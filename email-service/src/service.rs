// Email senders
use async_trait::async_trait;
use logger_redacted::PiiRedactor;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{EmailError, EmailResult};
use crate::{EmailMessage, EmailSender};

/// Writes messages to the log instead of delivering them. Recipients are redacted.
#[derive(Debug, Default, Clone)]
pub struct LoggingEmailSender {
    redactor: PiiRedactor,
}

impl LoggingEmailSender {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EmailSender for LoggingEmailSender {
    async fn send(&self, message: &EmailMessage) -> EmailResult<String> {
        tracing::info!(
            message_id = %message.id,
            to = %self.redactor.redact(&message.to),
            subject = %message.subject,
            "Email queued for delivery"
        );
        Ok(message.id.to_string())
    }
}

/// Keeps every message in memory. `set_failing(true)` simulates a transport outage.
#[derive(Debug, Default)]
pub struct OutboxEmailSender {
    outbox: Mutex<Vec<EmailMessage>>,
    failing: AtomicBool,
}

impl OutboxEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.outbox.lock().clone()
    }

    pub fn sent_to(&self, recipient: &str) -> Vec<EmailMessage> {
        self.outbox
            .lock()
            .iter()
            .filter(|m| m.to.eq_ignore_ascii_case(recipient))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl EmailSender for OutboxEmailSender {
    async fn send(&self, message: &EmailMessage) -> EmailResult<String> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(EmailError::SendFailed("transport unavailable".into()));
        }
        self.outbox.lock().push(message.clone());
        Ok(message.id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_outbox_collects_messages() {
        let sender = OutboxEmailSender::new();
        let msg = EmailMessage::new("Ada@Example.com", "hi", "body");
        let id = sender.send(&msg).await.unwrap();
        assert_eq!(id, msg.id.to_string());
        assert_eq!(sender.sent_to("ada@example.com").len(), 1);
    }

    #[tokio::test]
    async fn test_outbox_failure_mode() {
        let sender = OutboxEmailSender::new();
        sender.set_failing(true);
        let msg = EmailMessage::new("ada@example.com", "hi", "body");
        assert!(matches!(sender.send(&msg).await, Err(EmailError::SendFailed(_))));
        assert!(sender.sent().is_empty());
    }

    #[tokio::test]
    async fn test_logging_sender_returns_id() {
        let msg = EmailMessage::new("ada@example.com", "hi", "body");
        assert_eq!(LoggingEmailSender::new().send(&msg).await.unwrap(), msg.id.to_string());
    }
}
