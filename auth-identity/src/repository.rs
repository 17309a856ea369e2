//! Store boundary.
//!
//! Persistence is an external collaborator; the core only relies on these
//! traits. Implementations must make every single-key operation atomic: a
//! failed-attempt increment, a rate-limit hit and a session compare-and-swap
//! may race other requests and must not lose updates.

mod memory;

pub use memory::{
    InMemoryAccountStore, InMemoryBlacklistStore, InMemoryPasswordHistoryStore,
    InMemoryPolicyVersionStore, InMemoryRateLimitStore, InMemoryResetTokenStore,
    InMemorySessionStore,
};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::StoreResult;
use crate::models::*;

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Lookup is case-insensitive
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Account>>;
    /// Fails with `Conflict` when the email is taken
    async fn insert(&self, account: Account) -> StoreResult<()>;
    async fn update(&self, id: Uuid, changes: AccountChanges) -> StoreResult<Account>;
    /// Atomic; returns the count after the increment
    async fn increment_failed_attempts(&self, id: Uuid) -> StoreResult<u32>;
    async fn reset_failed_attempts(&self, id: Uuid) -> StoreResult<()>;
    async fn list(&self) -> StoreResult<Vec<Account>>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn put(&self, record: SessionRecord) -> StoreResult<()>;
    async fn get(&self, id: &str) -> StoreResult<Option<SessionRecord>>;
    /// Returns whether a record was removed
    async fn delete(&self, id: &str) -> StoreResult<bool>;
    /// Replace the record only while its stored version still equals
    /// `expected_version`. Returns false when the record changed or vanished.
    async fn compare_and_swap(&self, record: SessionRecord, expected_version: u64) -> StoreResult<bool>;
    /// Store `record` and drop every other session of the same account with
    /// the same fingerprint, as one step. Returns how many were dropped.
    async fn replace_for_fingerprint(&self, record: SessionRecord) -> StoreResult<usize>;
    async fn delete_for_account(&self, account_id: Uuid, except: Option<&str>) -> StoreResult<usize>;
}

#[async_trait]
pub trait PasswordHistoryStore: Send + Sync {
    async fn append(&self, entry: PasswordHistoryEntry) -> StoreResult<()>;
    /// Newest first
    async fn recent(&self, account_id: Uuid, limit: usize) -> StoreResult<Vec<PasswordHistoryEntry>>;
    /// Keep the `keep` newest entries, returning how many were evicted
    async fn prune(&self, account_id: Uuid, keep: usize) -> StoreResult<usize>;
}

#[async_trait]
pub trait BlacklistStore: Send + Sync {
    async fn insert(&self, entry: BlacklistEntry) -> StoreResult<()>;
    async fn entries_for(&self, ip: &str) -> StoreResult<Vec<BlacklistEntry>>;
}

#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Count one attempt. Starts a new window at `now` when none is open.
    async fn hit(&self, key: &str, window: Duration, now: DateTime<Utc>) -> StoreResult<RateLimitBucket>;
    async fn get(&self, key: &str) -> StoreResult<Option<RateLimitBucket>>;
    async fn clear(&self, key: &str) -> StoreResult<()>;
}

#[async_trait]
pub trait ResetTokenStore: Send + Sync {
    async fn insert(&self, record: ResetTokenRecord) -> StoreResult<()>;
    async fn find(&self, token_hash: &str) -> StoreResult<Option<ResetTokenRecord>>;
    /// Remove and return; at most one caller ever receives a given token
    async fn take(&self, token_hash: &str) -> StoreResult<Option<ResetTokenRecord>>;
    async fn delete_for_account(&self, account_id: Uuid) -> StoreResult<usize>;
}

/// The terms-of-service version currently in force
#[async_trait]
pub trait PolicyVersionStore: Send + Sync {
    async fn current(&self) -> StoreResult<String>;
    async fn set(&self, version: &str) -> StoreResult<()>;
}

/// Every store the engine talks to
#[derive(Clone)]
pub struct Stores {
    pub accounts: Arc<dyn AccountStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub password_history: Arc<dyn PasswordHistoryStore>,
    pub blacklist: Arc<dyn BlacklistStore>,
    pub rate_limits: Arc<dyn RateLimitStore>,
    pub reset_tokens: Arc<dyn ResetTokenStore>,
    pub policy_versions: Arc<dyn PolicyVersionStore>,
}

impl Stores {
    pub fn in_memory(initial_policy_version: &str) -> Self {
        Self {
            accounts: Arc::new(InMemoryAccountStore::new()),
            sessions: Arc::new(InMemorySessionStore::new()),
            password_history: Arc::new(InMemoryPasswordHistoryStore::new()),
            blacklist: Arc::new(InMemoryBlacklistStore::new()),
            rate_limits: Arc::new(InMemoryRateLimitStore::new()),
            reset_tokens: Arc::new(InMemoryResetTokenStore::new()),
            policy_versions: Arc::new(InMemoryPolicyVersionStore::new(initial_policy_version)),
        }
    }
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}
