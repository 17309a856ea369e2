// Security events outside the login-attempt stream
use chrono::{DateTime, Utc};
use error_common::Severity;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityEventKind {
    Logout,
    SessionRevoked,
    SessionExpired,
    FingerprintMismatch,
    IpBlacklisted,
    PasswordChanged,
    PasswordResetRequested,
    TemporaryPasswordIssued,
    TermsAccepted,
    PolicyUpdated,
}

impl SecurityEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Logout => "logout",
            Self::SessionRevoked => "session_revoked",
            Self::SessionExpired => "session_expired",
            Self::FingerprintMismatch => "fingerprint_mismatch",
            Self::IpBlacklisted => "ip_blacklisted",
            Self::PasswordChanged => "password_changed",
            Self::PasswordResetRequested => "password_reset_requested",
            Self::TemporaryPasswordIssued => "temporary_password_issued",
            Self::TermsAccepted => "terms_accepted",
            Self::PolicyUpdated => "policy_updated",
        }
    }

    /// Default severity; a fingerprint mismatch outranks an ordinary timeout
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::FingerprintMismatch => Severity::Critical,
            Self::IpBlacklisted => Severity::Warning,
            Self::PasswordChanged
            | Self::PasswordResetRequested
            | Self::TemporaryPasswordIssued
            | Self::PolicyUpdated
            | Self::SessionRevoked => Severity::Notice,
            Self::Logout | Self::SessionExpired | Self::TermsAccepted => Severity::Info,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityEvent {
    pub id: Uuid,
    pub kind: SecurityEventKind,
    pub severity: Severity,
    pub account_id: Option<Uuid>,
    pub ip: Option<String>,
    pub detail: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl SecurityEvent {
    pub fn new(kind: SecurityEventKind, occurred_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            severity: kind.default_severity(),
            account_id: None,
            ip: None,
            detail: None,
            occurred_at,
        }
    }

    pub fn with_account(mut self, account_id: Uuid) -> Self {
        self.account_id = Some(account_id);
        self
    }

    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}
