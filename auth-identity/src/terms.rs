//! Terms-of-service acceptance and the administrative triggers around it.
//!
//! Account selection goes through the predicates in [`crate::gates`] so the
//! admin tooling and the login routing can never disagree about who still
//! has to accept, finish setup or change a password.

use audit_engine::{LoginAttemptAuditor, SecurityEvent, SecurityEventKind};
use email_service::{EmailSender, EmailTemplate, TemplateEngine};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::IdentityConfig;
use crate::error::{IdentityError, Result};
use crate::gates;
use crate::models::{Account, AccountChanges, TermsAcceptance};
use crate::password::password_expired;
use crate::repository::{AccountStore, PolicyVersionStore, Stores};

/// Acceptance snapshot for the current policy version
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcceptanceStats {
    pub current_version: String,
    pub total_accounts: usize,
    /// Active accounts; the only ones notifications go to
    pub reachable_accounts: usize,
    pub accepted_current: usize,
    pub pending_acceptance: usize,
    pub pending_first_login: usize,
    pub password_expired: usize,
}

impl AcceptanceStats {
    /// Share of reachable accounts that accepted the current version, 0..=100
    pub fn acceptance_rate(&self) -> f64 {
        if self.reachable_accounts == 0 {
            return 100.0;
        }
        self.accepted_current as f64 * 100.0 / self.reachable_accounts as f64
    }
}

/// Outcome of a notification batch. Send failures are counted, not raised.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    pub sent: usize,
    pub failed: usize,
    /// Eligible accounts left out because of the batch limit
    pub remaining: usize,
}

pub struct TermsService {
    accounts: Arc<dyn AccountStore>,
    policy_versions: Arc<dyn PolicyVersionStore>,
    clock: Arc<dyn Clock>,
    auditor: LoginAttemptAuditor,
    mailer: Arc<dyn EmailSender>,
    templates: TemplateEngine,
    password_expiry_days: i64,
    batch_size: usize,
}

impl TermsService {
    pub fn new(
        config: &IdentityConfig,
        stores: &Stores,
        clock: Arc<dyn Clock>,
        auditor: LoginAttemptAuditor,
        mailer: Arc<dyn EmailSender>,
    ) -> Result<Self> {
        Ok(Self {
            accounts: stores.accounts.clone(),
            policy_versions: stores.policy_versions.clone(),
            clock,
            auditor,
            mailer,
            templates: TemplateEngine::new()?,
            password_expiry_days: config.password.expiry_days,
            batch_size: config.terms.reminder_batch_size,
        })
    }

    pub async fn current_version(&self) -> Result<String> {
        Ok(self.policy_versions.current().await?)
    }

    /// Record acceptance of `version`, which must be the current one
    pub async fn accept(&self, account_id: Uuid, version: &str) -> Result<Account> {
        let current = self.policy_versions.current().await?;
        if version != current {
            return Err(IdentityError::InvalidInput(format!(
                "accepted version {} is not the current version {}",
                version, current
            )));
        }

        let now = self.clock.now();
        let account = self
            .accounts
            .update(
                account_id,
                AccountChanges {
                    terms: Some(Some(TermsAcceptance {
                        version: current.clone(),
                        accepted_at: now,
                    })),
                    ..AccountChanges::default()
                },
            )
            .await?;

        self.auditor
            .security_event(
                SecurityEvent::new(SecurityEventKind::TermsAccepted, now)
                    .with_account(account_id)
                    .with_detail(format!("version {}", current)),
            )
            .await;
        Ok(account)
    }

    pub async fn acceptance_stats(&self) -> Result<AcceptanceStats> {
        let current = self.policy_versions.current().await?;
        let accounts = self.accounts.list().await?;
        let now = self.clock.now();

        let reachable: Vec<&Account> = accounts.iter().filter(|a| gates::is_reachable(a)).collect();
        let pending_acceptance = reachable
            .iter()
            .filter(|a| gates::needs_terms_acceptance(a, &current))
            .count();

        Ok(AcceptanceStats {
            total_accounts: accounts.len(),
            reachable_accounts: reachable.len(),
            accepted_current: reachable.len() - pending_acceptance,
            pending_acceptance,
            pending_first_login: reachable
                .iter()
                .filter(|a| gates::needs_first_login_setup(a))
                .count(),
            password_expired: reachable
                .iter()
                .filter(|a| password_expired(a, self.password_expiry_days, now))
                .count(),
            current_version: current,
        })
    }

    /// Publish a new policy version. Every account must accept it again;
    /// with `notify` each reachable account is told by e-mail.
    pub async fn force_policy_update(&self, version: &str, notify: bool) -> Result<DeliveryReport> {
        let version = version.trim();
        if version.is_empty() {
            return Err(IdentityError::InvalidInput("policy version must not be empty".to_string()));
        }
        let previous = self.policy_versions.current().await?;
        if version == previous {
            return Err(IdentityError::InvalidInput(format!("version {} is already current", version)));
        }

        self.policy_versions.set(version).await?;
        tracing::info!(previous = %previous, version = %version, "Policy version updated");

        self.auditor
            .security_event(
                SecurityEvent::new(SecurityEventKind::PolicyUpdated, self.clock.now())
                    .with_detail(format!("{} -> {}", previous, version)),
            )
            .await;

        if !notify {
            return Ok(DeliveryReport::default());
        }

        let recipients: Vec<Account> = self
            .accounts
            .list()
            .await?
            .into_iter()
            .filter(gates::is_reachable)
            .collect();
        Ok(self.deliver(EmailTemplate::PolicyUpdate, version, &recipients).await)
    }

    /// Remind reachable accounts that have not accepted the current version.
    /// At most `limit` (or the configured batch size) are contacted.
    pub async fn send_reminder_batch(&self, limit: Option<usize>) -> Result<DeliveryReport> {
        let current = self.policy_versions.current().await?;
        let limit = limit.unwrap_or(self.batch_size);

        let pending: Vec<Account> = self
            .accounts
            .list()
            .await?
            .into_iter()
            .filter(|a| gates::is_reachable(a) && gates::needs_terms_acceptance(a, &current))
            .collect();

        let batch_len = pending.len().min(limit);
        let mut report = self.deliver(EmailTemplate::TermsReminder, &current, &pending[..batch_len]).await;
        report.remaining = pending.len() - batch_len;
        Ok(report)
    }

    async fn deliver(&self, template: EmailTemplate, version: &str, recipients: &[Account]) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        let data = json!({ "version": version });

        for account in recipients {
            let outcome = match self.templates.compose(template, &account.email, &data) {
                Ok(message) => self.mailer.send(&message).await.map(|_| ()),
                Err(e) => Err(e),
            };
            match outcome {
                Ok(()) => report.sent += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        account_id = %account.id,
                        template = template.name(),
                        error = %e,
                        "Notification not delivered"
                    );
                }
            }
        }

        tracing::info!(
            template = template.name(),
            sent = report.sent,
            failed = report.failed,
            "Notification batch finished"
        );
        report
    }
}
