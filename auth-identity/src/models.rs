use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Active,
    Suspended,
    Pending,
    Expired,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Pending => "pending",
            Self::Expired => "expired",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermsAcceptance {
    pub version: String,
    pub accepted_at: DateTime<Utc>,
}

/// A user account. Created externally; never deleted by the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub status: AccountStatus,
    #[serde(default)]
    pub failed_attempts: u32,
    #[serde(default)]
    pub locked: bool,
    /// None on a locked account means locked until an administrator intervenes
    #[serde(default)]
    pub locked_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub first_login: bool,
    #[serde(default)]
    pub terms: Option<TermsAcceptance>,
    #[serde(default)]
    pub password_changed_at: Option<DateTime<Utc>>,
    /// Overrides the configured default when set
    #[serde(default)]
    pub password_expiry_days: Option<i64>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub last_login_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_login_ip: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// New active account that still has to complete first-login setup
    pub fn new(email: &str, password_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: normalize_email(email),
            password_hash,
            status: AccountStatus::Active,
            failed_attempts: 0,
            locked: false,
            locked_until: None,
            first_login: true,
            terms: None,
            password_changed_at: Some(now),
            password_expiry_days: None,
            roles: vec!["user".to_string()],
            last_login_at: None,
            last_login_ip: None,
            created_at: now,
        }
    }

    /// Locked and the lock has not run out
    pub fn is_lock_active(&self, now: DateTime<Utc>) -> bool {
        self.locked && self.locked_until.map_or(true, |until| until > now)
    }

    pub fn accepted_terms_version(&self) -> Option<&str> {
        self.terms.as_ref().map(|t| t.version.as_str())
    }
}

/// Field-level patch for [`Account`]. `None` leaves a field untouched;
/// nullable fields take `Some(None)` to clear them.
#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    pub password_hash: Option<String>,
    pub status: Option<AccountStatus>,
    pub locked: Option<bool>,
    pub locked_until: Option<Option<DateTime<Utc>>>,
    pub first_login: Option<bool>,
    pub terms: Option<Option<TermsAcceptance>>,
    pub password_changed_at: Option<Option<DateTime<Utc>>>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub last_login_ip: Option<String>,
}

impl AccountChanges {
    pub fn apply(self, account: &mut Account) {
        if let Some(hash) = self.password_hash {
            account.password_hash = hash;
        }
        if let Some(status) = self.status {
            account.status = status;
        }
        if let Some(locked) = self.locked {
            account.locked = locked;
        }
        if let Some(until) = self.locked_until {
            account.locked_until = until;
        }
        if let Some(first_login) = self.first_login {
            account.first_login = first_login;
        }
        if let Some(terms) = self.terms {
            account.terms = terms;
        }
        if let Some(changed_at) = self.password_changed_at {
            account.password_changed_at = changed_at;
        }
        if let Some(at) = self.last_login_at {
            account.last_login_at = Some(at);
        }
        if let Some(ip) = self.last_login_ip {
            account.last_login_ip = Some(ip);
        }
    }
}

/// Request attributes that identify the client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub ip: String,
    pub user_agent: String,
    #[serde(default)]
    pub accept_language: String,
    #[serde(default)]
    pub accept_encoding: String,
}

impl RequestContext {
    pub fn new(ip: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            user_agent: user_agent.into(),
            ..Self::default()
        }
    }

    pub fn with_accept_language(mut self, value: impl Into<String>) -> Self {
        self.accept_language = value.into();
        self
    }

    pub fn with_accept_encoding(mut self, value: impl Into<String>) -> Self {
        self.accept_encoding = value.into();
        self
    }
}

/// Time-bounded denial for an IP. Never mutated; superseded or expired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlacklistEntry {
    pub id: Uuid,
    pub ip: String,
    pub account_id: Option<Uuid>,
    pub reason: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    /// None means permanent
    pub expires_at: Option<DateTime<Utc>>,
}

impl BlacklistEntry {
    pub fn is_in_force(&self, now: DateTime<Utc>) -> bool {
        self.active && self.expires_at.map_or(true, |at| at > now)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub account_id: Uuid,
    pub fingerprint: String,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Bumped on every write; guards compare-and-swap
    pub version: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordHistoryEntry {
    pub account_id: Uuid,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitBucket {
    pub key: String,
    pub count: u32,
    pub window_start: DateTime<Utc>,
}

impl RateLimitBucket {
    pub fn window_open(&self, window: Duration, now: DateTime<Utc>) -> bool {
        now < self.window_start + window
    }
}

/// A password-reset token, stored by digest only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetTokenRecord {
    pub token_hash: String,
    pub account_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
