//! The authentication state machine.
//!
//! Login runs an ordered sequence of gates and stops at the first one that
//! fails. Every refusal produces exactly one audit record and one coarse
//! client message; only a rate-limit refusal tells the caller anything
//! specific (the retry-after seconds).
//!
//! 1. IP blacklist
//! 2. Login rate limit (per IP)
//! 3. Input validation
//! 4. Account lookup
//! 5. Account status (lock, suspension)
//! 6. Password verification
//! 7. Session issue
//! 8. Post-login routing (first login, terms, password expiry)

use audit_engine::{FailureReason, LoginAttemptAuditor, LoginAttemptRecord, SecurityEvent, SecurityEventKind};
use chrono::Duration;
use crypto::digest::sha256_hex;
use crypto::random::token_hex;
use email_service::{EmailSender, EmailTemplate, TemplateEngine};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;
use validator::ValidateEmail;

use crate::capabilities::{CapabilitySet, PermissionResolver, RoleCapabilityResolver};
use crate::clock::Clock;
use crate::config::IdentityConfig;
use crate::error::{AuthFailure, IdentityError, Result};
use crate::gates::{self, PostLoginRoute};
use crate::ip_guard::IpReputationGuard;
use crate::models::*;
use crate::password::PasswordPolicy;
use crate::rate_limit::RateLimiter;
use crate::repository::{AccountStore, PolicyVersionStore, ResetTokenStore, Stores};
use crate::session::{SessionCheck, SessionSecurityManager};

const RESET_TOKEN_BYTES: usize = 32;

pub struct LoginRequest {
    pub email: String,
    pub password: SecretString,
    /// Where to go once every gate is satisfied; only local paths are honoured
    pub target: Option<String>,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::new(password.into()),
            target: None,
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct LoginSuccess {
    pub account_id: Uuid,
    pub session: SessionRecord,
    pub route: PostLoginRoute,
}

#[derive(Debug, Clone)]
pub struct AuthorizedRequest {
    pub account: Account,
    pub session: SessionRecord,
    pub capabilities: CapabilitySet,
}

#[derive(Debug, Clone)]
pub enum RequestDecision {
    Granted(AuthorizedRequest),
    /// Session is valid but a post-login gate is still pending
    Redirect { session: SessionRecord, to: PostLoginRoute },
}

/// Who a refused attempt concerned
#[derive(Default)]
struct Subject<'a> {
    account_id: Option<Uuid>,
    email: Option<&'a str>,
    detail: Option<String>,
}

impl<'a> Subject<'a> {
    fn email(email: &'a str) -> Self {
        Self {
            email: Some(email),
            ..Self::default()
        }
    }

    fn account(account: &'a Account) -> Self {
        Self {
            account_id: Some(account.id),
            email: Some(&account.email),
            detail: None,
        }
    }

    fn session(record: Option<&SessionRecord>) -> Self {
        Self {
            account_id: record.map(|r| r.account_id),
            ..Self::default()
        }
    }

    fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

pub struct AuthenticationStateMachine {
    config: IdentityConfig,
    clock: Arc<dyn Clock>,
    accounts: Arc<dyn AccountStore>,
    policy_versions: Arc<dyn PolicyVersionStore>,
    reset_tokens: Arc<dyn ResetTokenStore>,
    passwords: PasswordPolicy,
    ip_guard: IpReputationGuard,
    login_limiter: RateLimiter,
    reset_limiter: RateLimiter,
    sessions: SessionSecurityManager,
    auditor: LoginAttemptAuditor,
    mailer: Arc<dyn EmailSender>,
    templates: TemplateEngine,
    permissions: Arc<dyn PermissionResolver>,
}

impl AuthenticationStateMachine {
    pub fn new(
        config: IdentityConfig,
        stores: &Stores,
        clock: Arc<dyn Clock>,
        auditor: LoginAttemptAuditor,
        mailer: Arc<dyn EmailSender>,
    ) -> Result<Self> {
        config.validate()?;

        let passwords = PasswordPolicy::new(
            config.password.clone(),
            &config.hashing,
            stores.password_history.clone(),
            clock.clone(),
        )?;
        let ip_guard = IpReputationGuard::new(stores.blacklist.clone(), clock.clone(), config.lockout.clone());
        let login_limiter = RateLimiter::new(
            "login",
            stores.rate_limits.clone(),
            clock.clone(),
            config.rate_limit.login_max_attempts,
            Duration::seconds(config.rate_limit.login_window_seconds),
        );
        let reset_limiter = RateLimiter::new(
            "password_reset",
            stores.rate_limits.clone(),
            clock.clone(),
            config.rate_limit.reset_max_attempts,
            Duration::seconds(config.rate_limit.reset_window_seconds),
        );
        let sessions = SessionSecurityManager::new(stores.sessions.clone(), clock.clone(), config.session.clone());
        let permissions = Arc::new(RoleCapabilityResolver::new(config.roles.capabilities.clone()));

        Ok(Self {
            clock,
            accounts: stores.accounts.clone(),
            policy_versions: stores.policy_versions.clone(),
            reset_tokens: stores.reset_tokens.clone(),
            passwords,
            ip_guard,
            login_limiter,
            reset_limiter,
            sessions,
            auditor,
            mailer,
            templates: TemplateEngine::new()?,
            permissions,
            config,
        })
    }

    pub fn with_permission_resolver(mut self, resolver: Arc<dyn PermissionResolver>) -> Self {
        self.permissions = resolver;
        self
    }

    pub fn config(&self) -> &IdentityConfig {
        &self.config
    }

    pub fn password_policy(&self) -> &PasswordPolicy {
        &self.passwords
    }

    pub fn sessions(&self) -> &SessionSecurityManager {
        &self.sessions
    }

    pub fn ip_guard(&self) -> &IpReputationGuard {
        &self.ip_guard
    }

    pub fn login_limiter(&self) -> &RateLimiter {
        &self.login_limiter
    }

    pub fn reset_limiter(&self) -> &RateLimiter {
        &self.reset_limiter
    }

    /// Run the login gates
    pub async fn login(&self, request: &LoginRequest, ctx: &RequestContext) -> std::result::Result<LoginSuccess, AuthFailure> {
        // Gate 1: IP reputation
        if self.ip_guard.is_blocked(&ctx.ip).await? {
            return Err(self.deny(FailureReason::IpBlacklisted, ctx, Subject::email(&request.email)).await);
        }

        // Gate 2: rate limit
        if self.login_limiter.exhausted(&ctx.ip).await? {
            let retry_after = self.login_limiter.available_in(&ctx.ip).await?;
            let subject = Subject::email(&request.email).detail(format!("retry after {}s", retry_after));
            self.deny(FailureReason::RateLimited, ctx, subject).await;
            return Err(AuthFailure::rate_limited(retry_after));
        }

        // Gate 3: input
        let email = normalize_email(&request.email);
        if !email.validate_email() || request.password.expose_secret().is_empty() {
            self.login_limiter.hit(&ctx.ip).await?;
            return Err(self.deny(FailureReason::InvalidInput, ctx, Subject::email(&request.email)).await);
        }

        // Gate 4: lookup, without revealing whether the account exists
        let Some(account) = self.accounts.find_by_email(&email).await? else {
            self.login_limiter.hit(&ctx.ip).await?;
            return Err(self.deny(FailureReason::UserNotFound, ctx, Subject::email(&email)).await);
        };

        // Gate 5: status. Specific messages are acceptable past this point.
        let account = self.check_status(account, ctx).await?;

        // Gate 6: credentials
        if !self.passwords.verify(&request.password, &account.password_hash).await? {
            return Err(self.record_bad_password(&account, ctx).await?);
        }

        // Gate 7: success
        let now = self.clock.now();
        self.accounts.reset_failed_attempts(account.id).await?;
        let account = self
            .accounts
            .update(
                account.id,
                AccountChanges {
                    last_login_at: Some(now),
                    last_login_ip: Some(ctx.ip.clone()),
                    ..AccountChanges::default()
                },
            )
            .await?;
        let session = self.sessions.issue(account.id, ctx).await?;
        self.login_limiter.clear(&ctx.ip).await?;
        self.auditor
            .record(
                LoginAttemptRecord::success(&ctx.ip, &ctx.user_agent, now)
                    .with_account(account.id)
                    .with_email(&account.email),
            )
            .await;

        // Gate 8: routing
        let current_version = self.policy_versions.current().await?;
        let route = gates::route_after_login(
            &account,
            &current_version,
            self.config.password.expiry_days,
            now,
            safe_target(request.target.as_deref()),
        );

        tracing::info!(account_id = %account.id, route = route.path(), "Login completed");
        Ok(LoginSuccess {
            account_id: account.id,
            session,
            route,
        })
    }

    async fn check_status(&self, account: Account, ctx: &RequestContext) -> std::result::Result<Account, AuthFailure> {
        let now = self.clock.now();
        let mut account = account;

        if account.locked {
            if account.is_lock_active(now) {
                self.login_limiter.hit(&ctx.ip).await?;
                return Err(self.deny(FailureReason::AccountLocked, ctx, Subject::account(&account)).await);
            }
            account = self
                .accounts
                .update(
                    account.id,
                    AccountChanges {
                        locked: Some(false),
                        locked_until: Some(None),
                        ..AccountChanges::default()
                    },
                )
                .await?;
            tracing::info!(account_id = %account.id, "Expired account lock lifted");
        }

        if account.status != AccountStatus::Active {
            self.login_limiter.hit(&ctx.ip).await?;
            let subject = Subject::account(&account).detail(format!("status {}", account.status.as_str()));
            return Err(self.deny(FailureReason::AccountSuspended, ctx, subject).await);
        }

        Ok(account)
    }

    /// Count the failure and apply its consequences
    async fn record_bad_password(&self, account: &Account, ctx: &RequestContext) -> Result<AuthFailure> {
        let now = self.clock.now();
        let failures = self.accounts.increment_failed_attempts(account.id).await?;
        self.login_limiter.hit(&ctx.ip).await?;

        // The attempt after the ceiling was reached blacklists whoever made it
        if failures.saturating_sub(1) >= self.config.lockout.blacklist_ceiling {
            match self
                .ip_guard
                .blacklist(&ctx.ip, Some(account.id), "failed login ceiling reached for account")
                .await
            {
                Ok(entry) => {
                    self.auditor
                        .security_event(
                            SecurityEvent::new(SecurityEventKind::IpBlacklisted, now)
                                .with_account(account.id)
                                .with_ip(&ctx.ip)
                                .with_detail(format!("{} failed attempts, entry {}", failures, entry.id)),
                        )
                        .await;
                }
                Err(e) => tracing::error!(error = %e, account_id = %account.id, "Failed to blacklist IP"),
            }
        }

        // Locks at every `lock_after`-th consecutive failure, so an expired
        // lock gives the account a fresh budget
        if let Some(lock_after) = self.config.lockout.lock_after {
            if failures.checked_rem(lock_after) == Some(0) && !account.is_lock_active(now) {
                self.accounts
                    .update(
                        account.id,
                        AccountChanges {
                            locked: Some(true),
                            locked_until: Some(Some(now + Duration::minutes(self.config.lockout.lock_minutes))),
                            ..AccountChanges::default()
                        },
                    )
                    .await?;
                tracing::warn!(account_id = %account.id, failures, "Account locked after repeated failures");
            }
        }

        let subject = Subject::account(account).detail(format!("failed attempt {}", failures));
        Ok(self.deny(FailureReason::InvalidPassword, ctx, subject).await)
    }

    /// Revoke the session and audit the logout. Succeeds for unknown sessions.
    pub async fn logout(&self, session_id: &str, ctx: &RequestContext) -> std::result::Result<(), AuthFailure> {
        let record = self.sessions.get(session_id).await?;
        self.sessions.revoke(session_id).await?;

        let mut event = SecurityEvent::new(SecurityEventKind::Logout, self.clock.now()).with_ip(&ctx.ip);
        if let Some(record) = &record {
            event = event.with_account(record.account_id);
        }
        self.auditor.security_event(event).await;
        Ok(())
    }

    /// Gate an authenticated request: IP reputation, session revalidation,
    /// account status, then the post-login gates for `route`.
    pub async fn authorize_request(
        &self,
        session_id: &str,
        ctx: &RequestContext,
        route: &str,
    ) -> std::result::Result<RequestDecision, AuthFailure> {
        if self.ip_guard.is_blocked(&ctx.ip).await? {
            let record = self.sessions.get(session_id).await?;
            return Err(self.deny(FailureReason::IpBlacklisted, ctx, Subject::session(record.as_ref())).await);
        }

        let session = match self.sessions.revalidate(session_id, ctx).await? {
            SessionCheck::Valid(session) => session,
            SessionCheck::Rejected { reason, record } => {
                return Err(self.session_rejected(reason, record.as_ref(), ctx).await);
            }
        };

        let Some(account) = self.accounts.find_by_id(session.account_id).await? else {
            self.sessions.revoke(&session.id).await?;
            let subject = Subject::session(Some(&session)).detail("account no longer exists");
            return Err(self.deny(FailureReason::SessionExpired, ctx, subject).await);
        };

        let now = self.clock.now();
        if account.is_lock_active(now) || account.status != AccountStatus::Active {
            self.sessions.revoke(&session.id).await?;
            let reason = if account.is_lock_active(now) {
                FailureReason::AccountLocked
            } else {
                FailureReason::AccountSuspended
            };
            return Err(self.deny(reason, ctx, Subject::account(&account)).await);
        }

        let current_version = self.policy_versions.current().await?;
        if let Some(gate) = gates::pending_gate(&account, &current_version, self.config.password.expiry_days, now) {
            if !gate.permits(route) {
                return Ok(RequestDecision::Redirect { session, to: gate });
            }
        }

        let capabilities = self.permissions.resolve(&account).await?;
        Ok(RequestDecision::Granted(AuthorizedRequest {
            account,
            session,
            capabilities,
        }))
    }

    async fn session_rejected(
        &self,
        reason: FailureReason,
        record: Option<&SessionRecord>,
        ctx: &RequestContext,
    ) -> AuthFailure {
        let kind = match reason {
            FailureReason::FingerprintMismatch => SecurityEventKind::FingerprintMismatch,
            _ => SecurityEventKind::SessionExpired,
        };
        let mut event = SecurityEvent::new(kind, self.clock.now()).with_ip(&ctx.ip);
        if let Some(record) = record {
            event = event.with_account(record.account_id);
        }
        self.auditor.security_event(event).await;

        self.deny(reason, ctx, Subject::session(record)).await
    }

    /// Change a password after proving knowledge of the current one.
    /// Every other session of the account is revoked.
    ///
    /// Wrong current passwords count against the login limiter, keyed by
    /// account, so a stolen session cannot guess the password freely.
    pub async fn change_password(
        &self,
        account_id: Uuid,
        current: &SecretString,
        new_password: &SecretString,
        keep_session: Option<&str>,
    ) -> std::result::Result<(), AuthFailure> {
        let throttle_key = format!("password-change:{}", account_id);
        if self.login_limiter.exhausted(&throttle_key).await? {
            let retry_after = self.login_limiter.available_in(&throttle_key).await?;
            return Err(AuthFailure::rate_limited(retry_after));
        }

        let account = self.load_account(account_id).await?;
        if !self.passwords.verify(current, &account.password_hash).await? {
            self.login_limiter.hit(&throttle_key).await?;
            tracing::warn!(account_id = %account_id, "Password change refused: current password did not match");
            return Err(IdentityError::InvalidCredentials.into());
        }

        self.set_password(&account, new_password, keep_session).await?;
        self.login_limiter.clear(&throttle_key).await?;
        Ok(())
    }

    /// Replace the temporary password of an account still in first-login setup
    pub async fn complete_first_login(
        &self,
        account_id: Uuid,
        new_password: &SecretString,
        keep_session: Option<&str>,
    ) -> std::result::Result<(), AuthFailure> {
        let account = self.load_account(account_id).await?;
        if !gates::needs_first_login_setup(&account) {
            return Err(IdentityError::InvalidInput("first-login setup already completed".to_string()).into());
        }

        self.set_password(&account, new_password, keep_session).await?;
        Ok(())
    }

    /// E-mail a single-use reset link. Unknown or inactive accounts get the
    /// same answer as known ones; a failed send is reported.
    pub async fn request_password_reset(&self, email: &str, ctx: &RequestContext) -> std::result::Result<(), AuthFailure> {
        // Throttle before lookup so volume reveals nothing about existence
        if self.reset_limiter.exhausted(&ctx.ip).await? {
            let retry_after = self.reset_limiter.available_in(&ctx.ip).await?;
            tracing::info!(retry_after, "Password reset request throttled");
            return Err(AuthFailure::rate_limited(retry_after));
        }
        self.reset_limiter.hit(&ctx.ip).await?;

        let email = normalize_email(email);
        if !email.validate_email() {
            return Err(AuthFailure::validation("Please enter a valid email address."));
        }

        let account = match self.accounts.find_by_email(&email).await? {
            Some(account) if gates::is_reachable(&account) => account,
            _ => {
                tracing::debug!("Password reset requested for unknown or inactive account");
                return Ok(());
            }
        };

        let now = self.clock.now();
        let ttl_minutes = self.config.reset.token_ttl_minutes;
        let token = SecretString::new(token_hex(RESET_TOKEN_BYTES));
        let token_hash = sha256_hex(token.expose_secret().as_bytes());

        self.reset_tokens.delete_for_account(account.id).await?;
        self.reset_tokens
            .insert(ResetTokenRecord {
                token_hash: token_hash.clone(),
                account_id: account.id,
                created_at: now,
                expires_at: now + Duration::minutes(ttl_minutes),
            })
            .await?;

        let link = format!("{}?token={}", self.config.reset.link_base_url, token.expose_secret());
        let message = self
            .templates
            .compose(
                EmailTemplate::PasswordReset,
                &account.email,
                &json!({ "reset_link": link, "expires_minutes": ttl_minutes }),
            )
            .map_err(IdentityError::from)?;

        if let Err(e) = self.mailer.send(&message).await {
            self.reset_tokens.take(&token_hash).await?;
            tracing::error!(error = %e, account_id = %account.id, "Password reset email could not be sent");
            return Err(AuthFailure::delivery_failed());
        }

        self.auditor
            .security_event(
                SecurityEvent::new(SecurityEventKind::PasswordResetRequested, now)
                    .with_account(account.id)
                    .with_ip(&ctx.ip),
            )
            .await;
        Ok(())
    }

    /// Consume a reset token and set the new password
    pub async fn reset_password(&self, token: &SecretString, new_password: &SecretString) -> std::result::Result<(), AuthFailure> {
        let token_hash = sha256_hex(token.expose_secret().as_bytes());

        let Some(record) = self.reset_tokens.find(&token_hash).await? else {
            return Err(IdentityError::InvalidResetToken.into());
        };
        if record.expires_at <= self.clock.now() {
            self.reset_tokens.take(&token_hash).await?;
            return Err(IdentityError::InvalidResetToken.into());
        }

        let account = self.load_account(record.account_id).await?;
        // Validate before consuming so a rejected password does not burn the link
        self.ensure_acceptable(&account, new_password).await?;

        if self.reset_tokens.take(&token_hash).await?.is_none() {
            return Err(IdentityError::InvalidResetToken.into());
        }

        self.store_password(&account, new_password, None).await?;
        Ok(())
    }

    /// Administrative: set a random password, force first-login setup and
    /// e-mail the password to the account holder.
    ///
    /// If the mail cannot be sent the previous password is restored. The
    /// temporary password is returned for operators without a mail transport.
    pub async fn provision_temporary_password(&self, email: &str) -> Result<SecretString> {
        let account = self
            .accounts
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(IdentityError::AccountNotFound)?;

        let temporary = self.passwords.generate_temporary_password();
        let message = self.templates.compose(
            EmailTemplate::TemporaryPassword,
            &account.email,
            &json!({ "temporary_password": temporary.expose_secret() }),
        )?;
        let hash = self.passwords.hash(&temporary).await?;
        let now = self.clock.now();

        self.accounts
            .update(
                account.id,
                AccountChanges {
                    password_hash: Some(hash.clone()),
                    first_login: Some(true),
                    password_changed_at: Some(Some(now)),
                    ..AccountChanges::default()
                },
            )
            .await?;

        if let Err(e) = self.mailer.send(&message).await {
            tracing::error!(error = %e, account_id = %account.id, "Temporary password could not be sent, restoring previous password");
            self.accounts
                .update(
                    account.id,
                    AccountChanges {
                        password_hash: Some(account.password_hash.clone()),
                        first_login: Some(account.first_login),
                        password_changed_at: Some(account.password_changed_at),
                        ..AccountChanges::default()
                    },
                )
                .await?;
            return Err(e.into());
        }

        self.passwords.record_history(account.id, hash).await?;
        self.sessions.revoke_all(account.id, None).await?;

        self.auditor
            .security_event(SecurityEvent::new(SecurityEventKind::TemporaryPasswordIssued, now).with_account(account.id))
            .await;
        Ok(temporary)
    }

    pub async fn current_policy_version(&self) -> Result<String> {
        Ok(self.policy_versions.current().await?)
    }

    async fn load_account(&self, account_id: Uuid) -> Result<Account> {
        self.accounts
            .find_by_id(account_id)
            .await?
            .ok_or(IdentityError::AccountNotFound)
    }

    async fn ensure_acceptable(&self, account: &Account, password: &SecretString) -> Result<()> {
        let validation = self.passwords.validate(password, Some(account)).await?;
        if validation.valid {
            Ok(())
        } else {
            Err(IdentityError::PasswordRejected(validation.violations))
        }
    }

    async fn set_password(&self, account: &Account, password: &SecretString, keep_session: Option<&str>) -> Result<()> {
        self.ensure_acceptable(account, password).await?;
        self.store_password(account, password, keep_session).await
    }

    async fn store_password(&self, account: &Account, password: &SecretString, keep_session: Option<&str>) -> Result<()> {
        let hash = self.passwords.hash(password).await?;
        let now = self.clock.now();

        self.accounts
            .update(
                account.id,
                AccountChanges {
                    password_hash: Some(hash.clone()),
                    password_changed_at: Some(Some(now)),
                    first_login: Some(false),
                    ..AccountChanges::default()
                },
            )
            .await?;
        self.passwords.record_history(account.id, hash).await?;
        let revoked = self.sessions.revoke_all(account.id, keep_session).await?;

        self.auditor
            .security_event(
                SecurityEvent::new(SecurityEventKind::PasswordChanged, now)
                    .with_account(account.id)
                    .with_detail(format!("{} other sessions revoked", revoked)),
            )
            .await;
        Ok(())
    }

    async fn deny(&self, reason: FailureReason, ctx: &RequestContext, subject: Subject<'_>) -> AuthFailure {
        let mut record = LoginAttemptRecord::failure(reason, &ctx.ip, &ctx.user_agent, self.clock.now());
        if let Some(account_id) = subject.account_id {
            record = record.with_account(account_id);
        }
        if let Some(email) = subject.email {
            record = record.with_email(email);
        }
        if let Some(detail) = subject.detail {
            record = record.with_detail(detail);
        }
        self.auditor.record(record).await;

        AuthFailure::from_reason(reason)
    }
}

impl std::fmt::Debug for AuthenticationStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticationStateMachine").finish_non_exhaustive()
    }
}

/// Local absolute paths only; anything else falls back to the default target
fn safe_target(target: Option<&str>) -> Option<&str> {
    target.filter(|t| t.starts_with('/') && !t.starts_with("//"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_target() {
        assert_eq!(safe_target(Some("/reports")), Some("/reports"));
        assert_eq!(safe_target(Some("//evil.example")), None);
        assert_eq!(safe_target(Some("https://evil.example")), None);
        assert_eq!(safe_target(None), None);
    }

    #[test]
    fn test_login_request_debug_hides_password() {
        let request = LoginRequest::new("a@example.com", "hunter2-Secret!");
        assert!(!format!("{:?}", request).contains("hunter2"));
    }
}
