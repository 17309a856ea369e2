/// Session lifecycle: issue, fingerprint, idle timeout and revalidation.
///
/// A session moves Unauthenticated -> Active -> {Expired, Revoked}. Every
/// failed revalidation deletes the record, so both terminal states look the
/// same from the store's point of view.

use audit_engine::FailureReason;
use chrono::Duration;
use crypto::constant_time::ct_eq_str;
use crypto::digest::sha256_hex_joined;
use crypto::random::token_hex;
use std::sync::Arc;
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::SessionConfig;
use crate::error::Result;
use crate::models::{RequestContext, SessionRecord};
use crate::repository::SessionStore;

/// Bytes of entropy in a session identifier
const SESSION_ID_BYTES: usize = 32;

const FINGERPRINT_DELIMITER: &str = "|";

/// SHA-256 over IP, user agent, Accept-Language and Accept-Encoding.
/// Empty components are dropped before hashing.
pub fn fingerprint(ctx: &RequestContext) -> String {
    sha256_hex_joined(
        &[
            ctx.ip.as_str(),
            ctx.user_agent.as_str(),
            ctx.accept_language.as_str(),
            ctx.accept_encoding.as_str(),
        ],
        FINGERPRINT_DELIMITER,
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCheck {
    /// Refreshed record
    Valid(SessionRecord),
    /// The record (if there was one) has been destroyed
    Rejected {
        reason: FailureReason,
        record: Option<SessionRecord>,
    },
}

pub struct SessionSecurityManager {
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    config: SessionConfig,
}

impl SessionSecurityManager {
    pub fn new(store: Arc<dyn SessionStore>, clock: Arc<dyn Clock>, config: SessionConfig) -> Self {
        Self { store, clock, config }
    }

    /// Issue a fresh session. Any live session of the same account with the
    /// same fingerprint is replaced.
    pub async fn issue(&self, account_id: Uuid, ctx: &RequestContext) -> Result<SessionRecord> {
        let now = self.clock.now();
        let fingerprint = fingerprint(ctx);

        let record = SessionRecord {
            id: token_hex(SESSION_ID_BYTES),
            account_id,
            fingerprint,
            created_at: now,
            last_activity: now,
            expires_at: now + Duration::minutes(self.config.lifetime_minutes),
            version: 0,
        };
        let replaced = self.store.replace_for_fingerprint(record.clone()).await?;
        if replaced > 0 {
            tracing::debug!(account_id = %account_id, replaced, "Replaced sessions with matching fingerprint");
        }

        tracing::info!(account_id = %account_id, expires_at = %record.expires_at, "Session issued");
        Ok(record)
    }

    /// Check a session against the current request and slide its window.
    ///
    /// A fingerprint mismatch is reported even for a session that has also
    /// timed out. Expiry slides with activity; there is no absolute cap.
    pub async fn revalidate(&self, session_id: &str, ctx: &RequestContext) -> Result<SessionCheck> {
        let now = self.clock.now();

        let Some(record) = self.store.get(session_id).await? else {
            return Ok(SessionCheck::Rejected {
                reason: FailureReason::SessionExpired,
                record: None,
            });
        };

        let reason = if !ct_eq_str(&record.fingerprint, &fingerprint(ctx)) {
            Some(FailureReason::FingerprintMismatch)
        } else if now > record.expires_at
            || now - record.last_activity > Duration::minutes(self.config.idle_timeout_minutes)
        {
            Some(FailureReason::SessionExpired)
        } else {
            None
        };

        if let Some(reason) = reason {
            self.store.delete(session_id).await?;
            return Ok(SessionCheck::Rejected {
                reason,
                record: Some(record),
            });
        }

        let expected_version = record.version;
        let refreshed = SessionRecord {
            last_activity: now,
            expires_at: now + Duration::minutes(self.config.lifetime_minutes),
            version: expected_version.wrapping_add(1),
            ..record
        };

        if self.store.compare_and_swap(refreshed.clone(), expected_version).await? {
            Ok(SessionCheck::Valid(refreshed))
        } else {
            // Revoked or refreshed concurrently; never resurrect it
            tracing::debug!(account_id = %refreshed.account_id, "Session changed during revalidation");
            Ok(SessionCheck::Rejected {
                reason: FailureReason::SessionExpired,
                record: Some(refreshed),
            })
        }
    }

    pub async fn get(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        Ok(self.store.get(session_id).await?)
    }

    /// Unconditional. Returns whether a live session was removed.
    pub async fn revoke(&self, session_id: &str) -> Result<bool> {
        Ok(self.store.delete(session_id).await?)
    }

    pub async fn revoke_all(&self, account_id: Uuid, except: Option<&str>) -> Result<usize> {
        Ok(self.store.delete_for_account(account_id, except).await?)
    }
}

impl std::fmt::Debug for SessionSecurityManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSecurityManager").field("config", &self.config).finish_non_exhaustive()
    }
}
