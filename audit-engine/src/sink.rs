use async_trait::async_trait;
use logger_redacted::PiiRedactor;
use parking_lot::RwLock;

use crate::entry::{FailureReason, LoginAttemptRecord};
use crate::error::Result;
use crate::event::{SecurityEvent, SecurityEventKind};

/// Append-only destination for audit records
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn append_attempt(&self, record: &LoginAttemptRecord) -> Result<()>;

    async fn append_event(&self, event: &SecurityEvent) -> Result<()>;
}

/// Process-local sink, used by tests and the admin CLI
#[derive(Debug, Default)]
pub struct InMemoryAuditSink {
    attempts: RwLock<Vec<LoginAttemptRecord>>,
    events: RwLock<Vec<SecurityEvent>>,
}

impl InMemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> Vec<LoginAttemptRecord> {
        self.attempts.read().clone()
    }

    pub fn events(&self) -> Vec<SecurityEvent> {
        self.events.read().clone()
    }

    pub fn attempts_with_reason(&self, reason: FailureReason) -> usize {
        self.attempts
            .read()
            .iter()
            .filter(|r| r.failure_reason() == Some(reason))
            .count()
    }

    pub fn events_of(&self, kind: SecurityEventKind) -> Vec<SecurityEvent> {
        self.events.read().iter().filter(|e| e.kind == kind).cloned().collect()
    }
}

#[async_trait]
impl AuditSink for InMemoryAuditSink {
    async fn append_attempt(&self, record: &LoginAttemptRecord) -> Result<()> {
        self.attempts.write().push(record.clone());
        Ok(())
    }

    async fn append_event(&self, event: &SecurityEvent) -> Result<()> {
        self.events.write().push(event.clone());
        Ok(())
    }
}

/// Writes records as JSON lines on the `audit` tracing target.
/// Emails and IP addresses go through a `PiiRedactor` first.
#[derive(Debug, Default, Clone)]
pub struct TracingAuditSink {
    redactor: PiiRedactor,
}

impl TracingAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_redactor(redactor: PiiRedactor) -> Self {
        Self { redactor }
    }

    /// The line written for a login attempt
    pub fn render_attempt(&self, record: &LoginAttemptRecord) -> Result<String> {
        Ok(self.redactor.redact(&serde_json::to_string(record)?))
    }

    /// The line written for a security event
    pub fn render_event(&self, event: &SecurityEvent) -> Result<String> {
        Ok(self.redactor.redact(&serde_json::to_string(event)?))
    }
}

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn append_attempt(&self, record: &LoginAttemptRecord) -> Result<()> {
        let line = self.render_attempt(record)?;
        tracing::info!(target: "audit", record = %line, "login_attempt");
        Ok(())
    }

    async fn append_event(&self, event: &SecurityEvent) -> Result<()> {
        let line = self.render_event(event)?;
        tracing::info!(target: "audit", event = %line, "security_event");
        Ok(())
    }
}
