// IP reputation: time-bounded blacklist entries, expiry evaluated at check time
use chrono::Duration;
use std::sync::Arc;
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::LockoutConfig;
use crate::error::Result;
use crate::models::BlacklistEntry;
use crate::repository::BlacklistStore;

pub struct IpReputationGuard {
    store: Arc<dyn BlacklistStore>,
    clock: Arc<dyn Clock>,
    config: LockoutConfig,
}

impl IpReputationGuard {
    pub fn new(store: Arc<dyn BlacklistStore>, clock: Arc<dyn Clock>, config: LockoutConfig) -> Self {
        Self { store, clock, config }
    }

    /// True while any active entry for `ip` has not expired
    pub async fn is_blocked(&self, ip: &str) -> Result<bool> {
        let now = self.clock.now();
        let entries = self.store.entries_for(ip).await?;
        Ok(entries.iter().any(|entry| entry.is_in_force(now)))
    }

    /// New active entry with the configured fixed expiry (24 hours by default)
    pub async fn blacklist(&self, ip: &str, account_id: Option<Uuid>, reason: &str) -> Result<BlacklistEntry> {
        let now = self.clock.now();
        self.insert(ip, account_id, reason, Some(now + Duration::hours(self.config.blacklist_hours)))
            .await
    }

    /// Administrative permanent ban; never triggered by the login flow
    pub async fn ban_permanently(&self, ip: &str, reason: &str) -> Result<BlacklistEntry> {
        self.insert(ip, None, reason, None).await
    }

    async fn insert(
        &self,
        ip: &str,
        account_id: Option<Uuid>,
        reason: &str,
        expires_at: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Result<BlacklistEntry> {
        let entry = BlacklistEntry {
            id: Uuid::new_v4(),
            ip: ip.to_string(),
            account_id,
            reason: reason.to_string(),
            active: true,
            created_at: self.clock.now(),
            expires_at,
        };
        self.store.insert(entry.clone()).await?;
        Ok(entry)
    }

    /// Entries for `ip`, including expired ones
    pub async fn history(&self, ip: &str) -> Result<Vec<BlacklistEntry>> {
        Ok(self.store.entries_for(ip).await?)
    }
}
