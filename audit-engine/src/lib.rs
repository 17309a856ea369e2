//! Login-attempt auditing for Gatehouse.
//!
//! Every gate decision produces one [`LoginAttemptRecord`]; session and
//! account events produce a [`SecurityEvent`]. Recording never fails the
//! caller: sink errors are logged and swallowed so an audit outage cannot
//! block an authentication decision.

pub mod entry;
pub mod error;
pub mod event;
pub mod sink;
pub mod user_agent;

pub use entry::{AttemptOutcome, FailureReason, LoginAttemptRecord};
pub use error::{AuditError, Result};
pub use event::{SecurityEvent, SecurityEventKind};
pub use sink::{AuditSink, InMemoryAuditSink, TracingAuditSink};
pub use user_agent::ClientMetadata;

use error_common::Severity;
use logger_redacted::{security_error, security_warn, PiiRedactor};
use std::sync::Arc;

#[derive(Clone)]
pub struct LoginAttemptAuditor {
    sink: Arc<dyn AuditSink>,
    redactor: PiiRedactor,
}

impl LoginAttemptAuditor {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self {
            sink,
            redactor: PiiRedactor::default(),
        }
    }

    pub fn with_redactor(mut self, redactor: PiiRedactor) -> Self {
        self.redactor = redactor;
        self
    }

    /// Append a login attempt. Never fails.
    pub async fn record(&self, record: LoginAttemptRecord) {
        let email = record.email.as_deref().map(|e| self.redactor.redact(e));
        let ip = self.redactor.redact(&record.ip);

        match record.failure_reason() {
            None => tracing::info!(
                account_id = ?record.account_id,
                ip = %ip,
                browser = %record.client.browser,
                os = %record.client.os,
                "Login succeeded"
            ),
            Some(reason) => tracing::info!(
                account_id = ?record.account_id,
                email = ?email,
                ip = %ip,
                reason = %reason,
                "Login attempt refused"
            ),
        }

        if let Err(e) = self.sink.append_attempt(&record).await {
            tracing::error!(error = %e, record_id = %record.id, "Failed to persist login attempt");
        }
    }

    /// Append a security event, logging it at a level matching its severity. Never fails.
    pub async fn security_event(&self, event: SecurityEvent) {
        let ip = event.ip.as_deref().map(|ip| self.redactor.redact(ip));

        match event.severity {
            Severity::Critical | Severity::Error => security_error!(
                kind = event.kind.as_str(),
                account_id = ?event.account_id,
                ip = ?ip,
                detail = ?event.detail,
                "Security event"
            ),
            Severity::Warning => security_warn!(
                kind = event.kind.as_str(),
                account_id = ?event.account_id,
                ip = ?ip,
                "Security event"
            ),
            Severity::Info | Severity::Notice => tracing::info!(
                kind = event.kind.as_str(),
                account_id = ?event.account_id,
                "Security event"
            ),
        }

        if let Err(e) = self.sink.append_event(&event).await {
            tracing::error!(error = %e, event_id = %event.id, "Failed to persist security event");
        }
    }
}

impl std::fmt::Debug for LoginAttemptAuditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginAttemptAuditor").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;

    struct BrokenSink;

    #[async_trait]
    impl AuditSink for BrokenSink {
        async fn append_attempt(&self, _record: &LoginAttemptRecord) -> Result<()> {
            Err(AuditError::StorageError("disk full".into()))
        }

        async fn append_event(&self, _event: &SecurityEvent) -> Result<()> {
            Err(AuditError::StorageError("disk full".into()))
        }
    }

    #[tokio::test]
    async fn test_records_reach_sink() {
        let sink = Arc::new(InMemoryAuditSink::new());
        let auditor = LoginAttemptAuditor::new(sink.clone());

        auditor
            .record(LoginAttemptRecord::failure(FailureReason::UserNotFound, "10.0.0.9", "curl/8", Utc::now()))
            .await;
        auditor
            .security_event(SecurityEvent::new(SecurityEventKind::FingerprintMismatch, Utc::now()))
            .await;

        assert_eq!(sink.attempts_with_reason(FailureReason::UserNotFound), 1);
        let events = sink.events_of(SecurityEventKind::FingerprintMismatch);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].severity, Severity::Critical);
    }

    #[tokio::test]
    async fn test_sink_failure_is_swallowed() {
        let auditor = LoginAttemptAuditor::new(Arc::new(BrokenSink));
        auditor.record(LoginAttemptRecord::success("10.0.0.1", "", Utc::now())).await;
        auditor
            .security_event(SecurityEvent::new(SecurityEventKind::Logout, Utc::now()))
            .await;
    }

    #[tokio::test]
    async fn test_tracing_sink_accepts_records() {
        let sink = TracingAuditSink::new();
        let record = LoginAttemptRecord::success("10.0.0.1", "", Utc::now());
        assert!(sink.append_attempt(&record).await.is_ok());
    }

    #[test]
    fn test_tracing_sink_lines_are_redacted() {
        let sink = TracingAuditSink::new();
        let record = LoginAttemptRecord::failure(FailureReason::InvalidPassword, "203.0.113.7", "curl/8", Utc::now())
            .with_email("ada@example.com");
        let line = sink.render_attempt(&record).unwrap();
        assert!(!line.contains("ada@example.com"));
        assert!(!line.contains("203.0.113.7"));
        assert!(line.contains("invalid_password"));

        let event = SecurityEvent::new(SecurityEventKind::IpBlacklisted, Utc::now()).with_ip("203.0.113.7");
        assert!(!sink.render_event(&event).unwrap().contains("203.0.113.7"));
    }
}
