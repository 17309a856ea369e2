//! Post-login routing gates.
//!
//! The predicates here are the single source of truth for "who still has to
//! do something": the login flow, per-request authorization and the admin
//! triggers all select accounts through them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Account, AccountStatus};
use crate::password::password_expired;

pub const FIRST_LOGIN_PATH: &str = "/account/setup";
pub const TERMS_PATH: &str = "/terms";
pub const PASSWORD_CHANGE_PATH: &str = "/account/password";
pub const LOGOUT_PATH: &str = "/logout";
pub const DEFAULT_TARGET: &str = "/";

/// Where an authenticated user goes next, in fixed priority order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "route", content = "path", rename_all = "snake_case")]
pub enum PostLoginRoute {
    FirstLoginSetup,
    TermsAcceptance,
    PasswordChange,
    Target(String),
}

impl PostLoginRoute {
    pub fn path(&self) -> &str {
        match self {
            Self::FirstLoginSetup => FIRST_LOGIN_PATH,
            Self::TermsAcceptance => TERMS_PATH,
            Self::PasswordChange => PASSWORD_CHANGE_PATH,
            Self::Target(path) => path,
        }
    }

    /// Whether a pending gate still lets `route` through
    pub fn permits(&self, route: &str) -> bool {
        match self {
            Self::Target(_) => true,
            gate => route == LOGOUT_PATH || is_within(route, gate.path()),
        }
    }
}

fn is_within(route: &str, prefix: &str) -> bool {
    route == prefix
        || route
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/') || rest.starts_with('?'))
}

pub fn needs_first_login_setup(account: &Account) -> bool {
    account.first_login
}

/// Not accepted, or accepted at a version other than `current_version`
pub fn needs_terms_acceptance(account: &Account, current_version: &str) -> bool {
    account.accepted_terms_version() != Some(current_version)
}

/// Accounts the admin reminder and policy-update triggers may contact
pub fn is_reachable(account: &Account) -> bool {
    account.status == AccountStatus::Active
}

/// The first unmet gate, if any
pub fn pending_gate(
    account: &Account,
    current_version: &str,
    default_expiry_days: i64,
    now: DateTime<Utc>,
) -> Option<PostLoginRoute> {
    if needs_first_login_setup(account) {
        Some(PostLoginRoute::FirstLoginSetup)
    } else if needs_terms_acceptance(account, current_version) {
        Some(PostLoginRoute::TermsAcceptance)
    } else if password_expired(account, default_expiry_days, now) {
        Some(PostLoginRoute::PasswordChange)
    } else {
        None
    }
}

pub fn route_after_login(
    account: &Account,
    current_version: &str,
    default_expiry_days: i64,
    now: DateTime<Utc>,
    target: Option<&str>,
) -> PostLoginRoute {
    pending_gate(account, current_version, default_expiry_days, now)
        .unwrap_or_else(|| PostLoginRoute::Target(target.unwrap_or(DEFAULT_TARGET).to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TermsAcceptance;
    use chrono::Duration;

    fn settled_account(now: DateTime<Utc>) -> Account {
        let mut account = Account::new("a@example.com", String::new(), now);
        account.first_login = false;
        account.terms = Some(TermsAcceptance {
            version: "2".to_string(),
            accepted_at: now,
        });
        account
    }

    #[test]
    fn test_priority_order() {
        let now = Utc::now();
        let mut account = settled_account(now);
        account.first_login = true;
        account.terms = None;
        account.password_changed_at = None;
        assert_eq!(route_after_login(&account, "2", 90, now, None), PostLoginRoute::FirstLoginSetup);

        account.first_login = false;
        assert_eq!(route_after_login(&account, "2", 90, now, None), PostLoginRoute::TermsAcceptance);

        account.terms = Some(TermsAcceptance {
            version: "2".to_string(),
            accepted_at: now,
        });
        assert_eq!(route_after_login(&account, "2", 90, now, None), PostLoginRoute::PasswordChange);

        account.password_changed_at = Some(now);
        assert_eq!(
            route_after_login(&account, "2", 90, now, Some("/reports")),
            PostLoginRoute::Target("/reports".to_string())
        );
    }

    #[test]
    fn test_stale_terms_version() {
        let now = Utc::now();
        let account = settled_account(now);
        assert!(!needs_terms_acceptance(&account, "2"));
        assert!(needs_terms_acceptance(&account, "3"));
        assert_eq!(
            route_after_login(&account, "3", 90, now + Duration::days(1), None),
            PostLoginRoute::TermsAcceptance
        );
    }

    #[test]
    fn test_gate_permits_its_own_flow() {
        let gate = PostLoginRoute::TermsAcceptance;
        assert!(gate.permits("/terms"));
        assert!(gate.permits("/terms/accept"));
        assert!(gate.permits("/logout"));
        assert!(!gate.permits("/termsheet"));
        assert!(!gate.permits("/reports"));
        assert!(PostLoginRoute::Target("/".into()).permits("/anything"));
    }
}
