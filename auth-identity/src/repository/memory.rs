// DashMap-backed stores. Each operation touches one shard entry under its lock.
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use uuid::Uuid;

use super::*;
use crate::error::StoreError;

pub struct InMemoryAccountStore {
    accounts: Arc<DashMap<Uuid, Account>>,
    by_email: Arc<DashMap<String, Uuid>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self {
            accounts: Arc::new(DashMap::new()),
            by_email: Arc::new(DashMap::new()),
        }
    }
}

impl Default for InMemoryAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let id = match self.by_email.get(&normalize_email(email)) {
            Some(id) => *id,
            None => return Ok(None),
        };
        Ok(self.accounts.get(&id).map(|a| a.clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Account>> {
        Ok(self.accounts.get(&id).map(|a| a.clone()))
    }

    async fn insert(&self, mut account: Account) -> StoreResult<()> {
        account.email = normalize_email(&account.email);
        match self.by_email.entry(account.email.clone()) {
            Entry::Occupied(_) => Err(StoreError::Conflict(format!("email {} already registered", account.email))),
            Entry::Vacant(slot) => {
                slot.insert(account.id);
                self.accounts.insert(account.id, account);
                Ok(())
            }
        }
    }

    async fn update(&self, id: Uuid, changes: AccountChanges) -> StoreResult<Account> {
        let mut account = self
            .accounts
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("account {}", id)))?;
        changes.apply(&mut account);
        Ok(account.clone())
    }

    async fn increment_failed_attempts(&self, id: Uuid) -> StoreResult<u32> {
        let mut account = self
            .accounts
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("account {}", id)))?;
        account.failed_attempts = account.failed_attempts.saturating_add(1);
        Ok(account.failed_attempts)
    }

    async fn reset_failed_attempts(&self, id: Uuid) -> StoreResult<()> {
        let mut account = self
            .accounts
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("account {}", id)))?;
        account.failed_attempts = 0;
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<Account>> {
        let mut accounts: Vec<Account> = self.accounts.iter().map(|a| a.value().clone()).collect();
        accounts.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(accounts)
    }
}

pub struct InMemorySessionStore {
    sessions: Arc<DashMap<String, SessionRecord>>,
    // Serializes issuance so two logins cannot both leave a live session
    issuing: Arc<Mutex<()>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            issuing: Arc::new(Mutex::new(())),
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn remove_where(&self, keep: impl Fn(&SessionRecord) -> bool) -> usize {
        let doomed: Vec<String> = self
            .sessions
            .iter()
            .filter(|entry| !keep(entry.value()))
            .map(|entry| entry.key().clone())
            .collect();
        doomed.iter().filter(|id| self.sessions.remove(*id).is_some()).count()
    }

    fn replace_locked(&self, record: SessionRecord) -> usize {
        let _guard = self.issuing.lock();
        let replaced = self.remove_where(|r| {
            !(r.account_id == record.account_id && r.fingerprint == record.fingerprint && r.id != record.id)
        });
        self.sessions.insert(record.id.clone(), record);
        replaced
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn put(&self, record: SessionRecord) -> StoreResult<()> {
        self.sessions.insert(record.id.clone(), record);
        Ok(())
    }

    async fn get(&self, id: &str) -> StoreResult<Option<SessionRecord>> {
        Ok(self.sessions.get(id).map(|r| r.clone()))
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        Ok(self.sessions.remove(id).is_some())
    }

    async fn compare_and_swap(&self, record: SessionRecord, expected_version: u64) -> StoreResult<bool> {
        match self.sessions.get_mut(&record.id) {
            Some(mut current) if current.version == expected_version => {
                *current = record;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn replace_for_fingerprint(&self, record: SessionRecord) -> StoreResult<usize> {
        Ok(self.replace_locked(record))
    }

    async fn delete_for_account(&self, account_id: Uuid, except: Option<&str>) -> StoreResult<usize> {
        Ok(self.remove_where(|r| r.account_id != account_id || Some(r.id.as_str()) == except))
    }
}

pub struct InMemoryPasswordHistoryStore {
    entries: Arc<DashMap<Uuid, Vec<PasswordHistoryEntry>>>,
}

impl InMemoryPasswordHistoryStore {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
        }
    }
}

impl Default for InMemoryPasswordHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PasswordHistoryStore for InMemoryPasswordHistoryStore {
    async fn append(&self, entry: PasswordHistoryEntry) -> StoreResult<()> {
        self.entries.entry(entry.account_id).or_default().push(entry);
        Ok(())
    }

    async fn recent(&self, account_id: Uuid, limit: usize) -> StoreResult<Vec<PasswordHistoryEntry>> {
        let mut entries = self
            .entries
            .get(&account_id)
            .map(|e| e.clone())
            .unwrap_or_default();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        entries.truncate(limit);
        Ok(entries)
    }

    async fn prune(&self, account_id: Uuid, keep: usize) -> StoreResult<usize> {
        let Some(mut entries) = self.entries.get_mut(&account_id) else {
            return Ok(0);
        };
        // Stable sort keeps insertion order among equal timestamps
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let evicted = entries.len().saturating_sub(keep);
        entries.truncate(keep);
        Ok(evicted)
    }
}

pub struct InMemoryBlacklistStore {
    entries: Arc<DashMap<String, Vec<BlacklistEntry>>>,
}

impl InMemoryBlacklistStore {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
        }
    }
}

impl Default for InMemoryBlacklistStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlacklistStore for InMemoryBlacklistStore {
    async fn insert(&self, entry: BlacklistEntry) -> StoreResult<()> {
        self.entries.entry(entry.ip.clone()).or_default().push(entry);
        Ok(())
    }

    async fn entries_for(&self, ip: &str) -> StoreResult<Vec<BlacklistEntry>> {
        Ok(self.entries.get(ip).map(|e| e.clone()).unwrap_or_default())
    }
}

pub struct InMemoryRateLimitStore {
    buckets: Arc<DashMap<String, RateLimitBucket>>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self {
            buckets: Arc::new(DashMap::new()),
        }
    }
}

impl Default for InMemoryRateLimitStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn hit(&self, key: &str, window: Duration, now: DateTime<Utc>) -> StoreResult<RateLimitBucket> {
        let bucket = self
            .buckets
            .entry(key.to_string())
            .and_modify(|bucket| {
                if bucket.window_open(window, now) {
                    bucket.count = bucket.count.saturating_add(1);
                } else {
                    bucket.count = 1;
                    bucket.window_start = now;
                }
            })
            .or_insert_with(|| RateLimitBucket {
                key: key.to_string(),
                count: 1,
                window_start: now,
            });
        Ok(bucket.clone())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<RateLimitBucket>> {
        Ok(self.buckets.get(key).map(|b| b.clone()))
    }

    async fn clear(&self, key: &str) -> StoreResult<()> {
        self.buckets.remove(key);
        Ok(())
    }
}

pub struct InMemoryResetTokenStore {
    tokens: Arc<DashMap<String, ResetTokenRecord>>,
}

impl InMemoryResetTokenStore {
    pub fn new() -> Self {
        Self {
            tokens: Arc::new(DashMap::new()),
        }
    }
}

impl Default for InMemoryResetTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResetTokenStore for InMemoryResetTokenStore {
    async fn insert(&self, record: ResetTokenRecord) -> StoreResult<()> {
        self.tokens.insert(record.token_hash.clone(), record);
        Ok(())
    }

    async fn find(&self, token_hash: &str) -> StoreResult<Option<ResetTokenRecord>> {
        Ok(self.tokens.get(token_hash).map(|r| r.clone()))
    }

    async fn take(&self, token_hash: &str) -> StoreResult<Option<ResetTokenRecord>> {
        Ok(self.tokens.remove(token_hash).map(|(_, record)| record))
    }

    async fn delete_for_account(&self, account_id: Uuid) -> StoreResult<usize> {
        let before = self.tokens.len();
        self.tokens.retain(|_, record| record.account_id != account_id);
        Ok(before.saturating_sub(self.tokens.len()))
    }
}

pub struct InMemoryPolicyVersionStore {
    current: RwLock<String>,
}

impl InMemoryPolicyVersionStore {
    pub fn new(initial: &str) -> Self {
        Self {
            current: RwLock::new(initial.to_string()),
        }
    }
}

#[async_trait]
impl PolicyVersionStore for InMemoryPolicyVersionStore {
    async fn current(&self) -> StoreResult<String> {
        Ok(self.current.read().clone())
    }

    async fn set(&self, version: &str) -> StoreResult<()> {
        *self.current.write() = version.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(id: &str, account_id: Uuid, fingerprint: &str) -> SessionRecord {
        let now = Utc::now();
        SessionRecord {
            id: id.to_string(),
            account_id,
            fingerprint: fingerprint.to_string(),
            created_at: now,
            last_activity: now,
            expires_at: now + Duration::minutes(30),
            version: 0,
        }
    }

    #[tokio::test]
    async fn test_account_email_uniqueness_and_case() {
        let store = InMemoryAccountStore::new();
        let account = Account::new("Ada@Example.com", "h".into(), Utc::now());
        store.insert(account.clone()).await.unwrap();

        let dup = Account::new("ada@example.com", "h".into(), Utc::now());
        assert!(matches!(store.insert(dup).await, Err(StoreError::Conflict(_))));

        let found = store.find_by_email("ADA@EXAMPLE.COM").await.unwrap().unwrap();
        assert_eq!(found.id, account.id);
    }

    #[tokio::test]
    async fn test_concurrent_increments_are_not_lost() {
        let store = Arc::new(InMemoryAccountStore::new());
        let account = Account::new("a@example.com", "h".into(), Utc::now());
        let id = account.id;
        store.insert(account).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..50 {
            let store = store.clone();
            handles.push(tokio::spawn(async move { store.increment_failed_attempts(id).await.unwrap() }));
        }
        let mut seen = Vec::new();
        for handle in handles {
            seen.push(handle.await.unwrap());
        }
        seen.sort_unstable();

        assert_eq!(seen, (1..=50).collect::<Vec<u32>>());
        assert_eq!(store.find_by_id(id).await.unwrap().unwrap().failed_attempts, 50);
    }

    #[tokio::test]
    async fn test_compare_and_swap_loses_to_delete() {
        let store = InMemorySessionStore::new();
        let account_id = Uuid::new_v4();
        let record = session("s1", account_id, "fp");
        store.put(record.clone()).await.unwrap();

        let mut refreshed = record.clone();
        refreshed.version = 1;
        assert!(store.compare_and_swap(refreshed.clone(), 0).await.unwrap());
        // Stale version
        assert!(!store.compare_and_swap(refreshed.clone(), 0).await.unwrap());

        store.delete("s1").await.unwrap();
        let mut again = refreshed.clone();
        again.version = 2;
        assert!(!store.compare_and_swap(again, 1).await.unwrap());
        assert!(store.get("s1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_session_bulk_deletes() {
        let store = InMemorySessionStore::new();
        let account_id = Uuid::new_v4();
        store.put(session("a", account_id, "fp1")).await.unwrap();
        store.put(session("b", account_id, "fp2")).await.unwrap();
        store.put(session("c", account_id, "fp2")).await.unwrap();
        store.put(session("d", Uuid::new_v4(), "fp2")).await.unwrap();

        assert_eq!(store.replace_for_fingerprint(session("e", account_id, "fp2")).await.unwrap(), 2);
        assert_eq!(store.delete_for_account(account_id, Some("a")).await.unwrap(), 1);
        assert_eq!(store.delete_for_account(account_id, None).await.unwrap(), 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_issuance_leaves_one_session_per_fingerprint() {
        let store = Arc::new(InMemorySessionStore::new());
        let account_id = Uuid::new_v4();

        let mut handles = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .replace_for_fingerprint(session(&format!("s{}", i), account_id, "fp"))
                    .await
                    .unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_window_rolls_over() {
        let store = InMemoryRateLimitStore::new();
        let start = Utc::now();
        let window = Duration::seconds(60);

        assert_eq!(store.hit("login:ip", window, start).await.unwrap().count, 1);
        assert_eq!(store.hit("login:ip", window, start + Duration::seconds(59)).await.unwrap().count, 2);

        let rolled = store.hit("login:ip", window, start + Duration::seconds(60)).await.unwrap();
        assert_eq!(rolled.count, 1);
        assert_eq!(rolled.window_start, start + Duration::seconds(60));
    }

    #[tokio::test]
    async fn test_history_prune_keeps_newest() {
        let store = InMemoryPasswordHistoryStore::new();
        let account_id = Uuid::new_v4();
        let start = Utc::now();
        for i in 0..7 {
            store
                .append(PasswordHistoryEntry {
                    account_id,
                    password_hash: format!("h{}", i),
                    created_at: start + Duration::seconds(i),
                })
                .await
                .unwrap();
        }

        assert_eq!(store.prune(account_id, 5).await.unwrap(), 2);
        let recent = store.recent(account_id, 10).await.unwrap();
        let hashes: Vec<&str> = recent.iter().map(|e| e.password_hash.as_str()).collect();
        assert_eq!(hashes, vec!["h6", "h5", "h4", "h3", "h2"]);
    }

    #[tokio::test]
    async fn test_reset_token_single_use() {
        let store = InMemoryResetTokenStore::new();
        let now = Utc::now();
        store
            .insert(ResetTokenRecord {
                token_hash: "digest".into(),
                account_id: Uuid::new_v4(),
                created_at: now,
                expires_at: now + Duration::minutes(60),
            })
            .await
            .unwrap();

        assert!(store.find("digest").await.unwrap().is_some());
        assert!(store.take("digest").await.unwrap().is_some());
        assert!(store.take("digest").await.unwrap().is_none());
    }
}
