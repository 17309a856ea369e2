//! Shared harness: the engine on in-memory stores with a manual clock,
//! cheap hashing, an in-memory outbox and an in-memory audit sink.
#![allow(dead_code)]

use audit_engine::{InMemoryAuditSink, LoginAttemptAuditor};
use auth_identity::*;
pub use auth_identity::repository::{AccountStore, InMemorySessionStore, BlacklistStore, PolicyVersionStore, ResetTokenStore, SessionStore};
use chrono::{TimeZone, Utc};
use crypto::Argon2Params;
use email_service::{EmailSender, OutboxEmailSender};
use secrecy::SecretString;
use std::sync::Arc;

pub const PASSWORD: &str = "Corr3ct-Horse!";
pub const POLICY_VERSION: &str = "1";

pub struct Harness {
    pub engine: Arc<AuthenticationStateMachine>,
    pub terms: Arc<TermsService>,
    pub stores: Stores,
    /// Concrete handle on the session store for counting live sessions
    pub sessions: Arc<InMemorySessionStore>,
    pub clock: Arc<ManualClock>,
    pub sink: Arc<InMemoryAuditSink>,
    pub outbox: Arc<OutboxEmailSender>,
}

pub fn test_config() -> IdentityConfig {
    let mut config = IdentityConfig::default();
    config.terms.initial_version = POLICY_VERSION.to_string();
    config.hashing = Argon2Params {
        memory_cost: 1024,
        time_cost: 1,
        parallelism: 1,
    };
    config
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: IdentityConfig) -> Self {
        let outbox = Arc::new(OutboxEmailSender::new());
        Self::with_mailer(config, outbox.clone(), outbox)
    }

    /// `outbox` is kept for assertions even when `mailer` is something else
    pub fn with_mailer(config: IdentityConfig, mailer: Arc<dyn EmailSender>, outbox: Arc<OutboxEmailSender>) -> Self {
        let sessions = Arc::new(InMemorySessionStore::new());
        let mut stores = Stores::in_memory(&config.terms.initial_version);
        stores.sessions = sessions.clone();
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()));
        let sink = Arc::new(InMemoryAuditSink::new());

        let terms = TermsService::new(
            &config,
            &stores,
            clock.clone(),
            LoginAttemptAuditor::new(sink.clone()),
            mailer.clone(),
        )
        .unwrap();
        let engine = AuthenticationStateMachine::new(
            config,
            &stores,
            clock.clone(),
            LoginAttemptAuditor::new(sink.clone()),
            mailer,
        )
        .unwrap();

        Self {
            engine: Arc::new(engine),
            terms: Arc::new(terms),
            stores,
            sessions,
            clock,
            sink,
            outbox,
        }
    }

    /// Account that has to finish first-login setup
    pub async fn new_account(&self, email: &str) -> Account {
        let hash = self
            .engine
            .password_policy()
            .hash(&SecretString::new(PASSWORD.to_string()))
            .await
            .unwrap();
        let account = Account::new(email, hash.clone(), self.clock.now());
        self.stores.accounts.insert(account.clone()).await.unwrap();
        self.engine
            .password_policy()
            .record_history(account.id, hash)
            .await
            .unwrap();
        account
    }

    /// Account past every post-login gate
    pub async fn settled_account(&self, email: &str) -> Account {
        let account = self.new_account(email).await;
        self.stores
            .accounts
            .update(
                account.id,
                AccountChanges {
                    first_login: Some(false),
                    terms: Some(Some(TermsAcceptance {
                        version: POLICY_VERSION.to_string(),
                        accepted_at: self.clock.now(),
                    })),
                    ..AccountChanges::default()
                },
            )
            .await
            .unwrap()
    }

    pub async fn account(&self, email: &str) -> Account {
        self.stores.accounts.find_by_email(email).await.unwrap().unwrap()
    }

    pub async fn login(&self, email: &str, password: &str, ctx: &RequestContext) -> std::result::Result<LoginSuccess, AuthFailure> {
        self.engine.login(&LoginRequest::new(email, password), ctx).await
    }
}

pub fn browser(ip: &str) -> RequestContext {
    RequestContext::new(
        ip,
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36",
    )
    .with_accept_language("en-US,en;q=0.9")
    .with_accept_encoding("gzip, deflate, br")
}

pub fn secret(value: &str) -> SecretString {
    SecretString::new(value.to_string())
}
