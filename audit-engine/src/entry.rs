// Login attempt records and the failure-reason taxonomy
use chrono::{DateTime, Utc};
use error_common::ErrorCategory;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::user_agent::ClientMetadata;

/// Why a login attempt (or an authenticated request) was refused.
///
/// Variants are mutually exclusive; the first failing gate decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    IpBlacklisted,
    RateLimited,
    InvalidInput,
    UserNotFound,
    AccountLocked,
    AccountSuspended,
    InvalidPassword,
    SessionExpired,
    FingerprintMismatch,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IpBlacklisted => "ip_blacklisted",
            Self::RateLimited => "rate_limited",
            Self::InvalidInput => "invalid_input",
            Self::UserNotFound => "user_not_found",
            Self::AccountLocked => "account_locked",
            Self::AccountSuspended => "account_suspended",
            Self::InvalidPassword => "invalid_password",
            Self::SessionExpired => "session_expired",
            Self::FingerprintMismatch => "fingerprint_mismatch",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::IpBlacklisted | Self::RateLimited | Self::AccountLocked | Self::AccountSuspended => {
                ErrorCategory::PolicyDenial
            }
            Self::UserNotFound | Self::InvalidPassword | Self::SessionExpired => {
                ErrorCategory::CredentialFailure
            }
            Self::InvalidInput => ErrorCategory::ValidationError,
            Self::FingerprintMismatch => ErrorCategory::SecurityViolation,
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Success, or failure with exactly one reason
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", content = "reason", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success,
    Failure(FailureReason),
}

/// Immutable, append-only record of one login attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginAttemptRecord {
    pub id: Uuid,
    /// None when the email did not resolve to an account
    pub account_id: Option<Uuid>,
    pub email: Option<String>,
    pub ip: String,
    pub user_agent: String,
    pub outcome: AttemptOutcome,
    /// Internal detail kept for forensics, never shown to the client
    pub detail: Option<String>,
    pub client: ClientMetadata,
    pub occurred_at: DateTime<Utc>,
}

impl LoginAttemptRecord {
    fn new(outcome: AttemptOutcome, ip: &str, user_agent: &str, occurred_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id: None,
            email: None,
            ip: ip.to_string(),
            user_agent: user_agent.to_string(),
            outcome,
            detail: None,
            client: ClientMetadata::from_user_agent(user_agent),
            occurred_at,
        }
    }

    pub fn success(ip: &str, user_agent: &str, occurred_at: DateTime<Utc>) -> Self {
        Self::new(AttemptOutcome::Success, ip, user_agent, occurred_at)
    }

    pub fn failure(reason: FailureReason, ip: &str, user_agent: &str, occurred_at: DateTime<Utc>) -> Self {
        Self::new(AttemptOutcome::Failure(reason), ip, user_agent, occurred_at)
    }

    pub fn with_account(mut self, account_id: Uuid) -> Self {
        self.account_id = Some(account_id);
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, AttemptOutcome::Success)
    }

    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self.outcome {
            AttemptOutcome::Success => None,
            AttemptOutcome::Failure(reason) => Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_has_no_reason() {
        let record = LoginAttemptRecord::success("10.0.0.1", "curl/8.0", Utc::now());
        assert!(record.is_success());
        assert_eq!(record.failure_reason(), None);
        assert_eq!(record.client.browser, "curl");
    }

    #[test]
    fn test_failure_carries_reason() {
        let id = Uuid::new_v4();
        let record = LoginAttemptRecord::failure(FailureReason::InvalidPassword, "10.0.0.1", "", Utc::now())
            .with_account(id)
            .with_email("a@example.com");
        assert!(!record.is_success());
        assert_eq!(record.failure_reason(), Some(FailureReason::InvalidPassword));
        assert_eq!(record.account_id, Some(id));
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(AttemptOutcome::Failure(FailureReason::RateLimited)).unwrap();
        assert_eq!(json, serde_json::json!({"result": "failure", "reason": "rate_limited"}));
        let json = serde_json::to_value(AttemptOutcome::Success).unwrap();
        assert_eq!(json, serde_json::json!({"result": "success"}));
    }

    #[test]
    fn test_reason_categories() {
        assert_eq!(FailureReason::FingerprintMismatch.category(), ErrorCategory::SecurityViolation);
        assert_eq!(FailureReason::UserNotFound.category(), ErrorCategory::CredentialFailure);
        assert_eq!(FailureReason::IpBlacklisted.category(), ErrorCategory::PolicyDenial);
        assert_eq!(FailureReason::InvalidInput.category(), ErrorCategory::ValidationError);
    }
}
