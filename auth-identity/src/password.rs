use chrono::{DateTime, Duration, Utc};
use crypto::{random, Argon2Hasher, Argon2Params};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::clock::Clock;
use crate::config::PasswordConfig;
use crate::error::Result;
use crate::models::{Account, PasswordHistoryEntry};
use crate::repository::PasswordHistoryStore;

/// Characters that satisfy the special-character rule
pub const SPECIAL_CHARACTERS: &str = "!@#$%^&*()-_=+[]{}|;:'\",.<>/?`~\\";

/// Compared case-insensitively
const COMMON_PASSWORDS: &[&str] = &[
    "123456", "12345678", "123456789", "1234567890", "111111", "000000",
    "password", "password1", "password12", "password123", "password1!", "passw0rd",
    "p@ssw0rd", "p@ssword1", "qwerty", "qwerty123", "qwertyuiop", "1q2w3e4r",
    "zaq12wsx", "abc123", "letmein", "letmein1!", "welcome", "welcome1",
    "welcome1!", "admin", "admin123", "administrator", "changeme", "iloveyou",
    "monkey", "dragon", "football", "baseball", "sunshine", "princess",
    "trustno1", "master", "secret", "summer2024!",
];

const LOWER: &[u8] = b"abcdefghijkmnopqrstuvwxyz";
const UPPER: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";
const DIGITS: &[u8] = b"23456789";
const TEMP_SPECIALS: &[u8] = b"!@#$%^&*-_=+";

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum PasswordViolation {
    #[error("Password must be at least {min_length} characters long")]
    TooShort { min_length: usize },

    #[error("Password must contain at least one lowercase letter")]
    MissingLowercase,

    #[error("Password must contain at least one uppercase letter")]
    MissingUppercase,

    #[error("Password must contain at least one digit")]
    MissingDigit,

    #[error("Password must contain at least one special character")]
    MissingSpecial,

    #[error("Password is in the list of commonly used passwords")]
    CommonPassword,

    #[error("Password matches one of the recently used passwords")]
    RecentlyUsed,
}

/// Result of [`PasswordPolicy::validate`]. Every violated rule is listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasswordValidation {
    pub valid: bool,
    pub violations: Vec<PasswordViolation>,
    /// Advisory, 0..=100
    pub strength: u8,
}

fn is_special(c: char) -> bool {
    SPECIAL_CHARACTERS.contains(c)
}

fn is_common(password: &str) -> bool {
    let lowered = password.to_lowercase();
    COMMON_PASSWORDS.iter().any(|common| *common == lowered)
}

/// Deterministic weighted score, capped at 100
pub fn strength(password: &str) -> u8 {
    let length = password.chars().count();
    let specials = password.chars().filter(|c| is_special(*c)).count();

    let mut score = length.saturating_mul(2).min(25);
    if password.chars().any(char::is_lowercase) {
        score += 10;
    }
    if password.chars().any(char::is_uppercase) {
        score += 10;
    }
    if password.chars().any(|c| c.is_ascii_digit()) {
        score += 10;
    }
    if specials >= 1 {
        score += 15;
    }
    if specials >= 2 {
        score += 10;
    }
    if length >= 12 {
        score += 10;
    }
    if length >= 16 {
        score += 10;
    }

    u8::try_from(score.min(100)).unwrap_or(100)
}

/// Shared expiry predicate. No recorded change counts as expired; a period
/// too large to represent never expires.
pub fn password_expired(account: &Account, default_expiry_days: i64, now: DateTime<Utc>) -> bool {
    match account.password_changed_at {
        None => true,
        Some(changed_at) => {
            let days = account.password_expiry_days.unwrap_or(default_expiry_days);
            match Duration::try_days(days).and_then(|period| changed_at.checked_add_signed(period)) {
                Some(expires_at) => now > expires_at,
                None => false,
            }
        }
    }
}

pub struct PasswordPolicy {
    config: PasswordConfig,
    hasher: Argon2Hasher,
    history: Arc<dyn PasswordHistoryStore>,
    clock: Arc<dyn Clock>,
}

impl PasswordPolicy {
    pub fn new(
        config: PasswordConfig,
        hashing: &Argon2Params,
        history: Arc<dyn PasswordHistoryStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        Ok(Self {
            config,
            hasher: Argon2Hasher::new(hashing)?,
            history,
            clock,
        })
    }

    pub fn config(&self) -> &PasswordConfig {
        &self.config
    }

    /// Complexity and denylist rules, in a fixed order
    pub fn check_rules(&self, password: &str) -> Vec<PasswordViolation> {
        let mut violations = Vec::new();

        if password.chars().count() < self.config.min_length {
            violations.push(PasswordViolation::TooShort {
                min_length: self.config.min_length,
            });
        }
        if !password.chars().any(char::is_lowercase) {
            violations.push(PasswordViolation::MissingLowercase);
        }
        if !password.chars().any(char::is_uppercase) {
            violations.push(PasswordViolation::MissingUppercase);
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            violations.push(PasswordViolation::MissingDigit);
        }
        if !password.chars().any(is_special) {
            violations.push(PasswordViolation::MissingSpecial);
        }
        if is_common(password) {
            violations.push(PasswordViolation::CommonPassword);
        }

        violations
    }

    /// Full validation. With an account, the password is also checked against
    /// its current hash and its recent history.
    pub async fn validate(&self, password: &SecretString, account: Option<&Account>) -> Result<PasswordValidation> {
        let exposed = password.expose_secret();
        let mut violations = self.check_rules(exposed);

        if let Some(account) = account {
            if self.recently_used(password, account).await? {
                violations.push(PasswordViolation::RecentlyUsed);
            }
        }

        Ok(PasswordValidation {
            valid: violations.is_empty(),
            violations,
            strength: strength(exposed),
        })
    }

    async fn recently_used(&self, password: &SecretString, account: &Account) -> Result<bool> {
        let mut hashes: Vec<String> = self
            .history
            .recent(account.id, self.config.history_size)
            .await?
            .into_iter()
            .map(|entry| entry.password_hash)
            .collect();
        if !hashes.contains(&account.password_hash) {
            hashes.push(account.password_hash.clone());
        }

        let hasher = self.hasher.clone();
        let candidate = Zeroizing::new(password.expose_secret().clone());

        let reused = tokio::task::spawn_blocking(move || {
            hashes.iter().any(|phc| match hasher.verify(candidate.as_bytes(), phc) {
                Ok(matched) => matched,
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable password history hash");
                    false
                }
            })
        })
        .await?;

        Ok(reused)
    }

    /// Argon2id hash, computed off the async runtime
    pub async fn hash(&self, password: &SecretString) -> Result<String> {
        let hasher = self.hasher.clone();
        let password = Zeroizing::new(password.expose_secret().clone());

        let hash = tokio::task::spawn_blocking(move || hasher.hash(password.as_bytes())).await??;
        Ok(hash)
    }

    pub async fn verify(&self, password: &SecretString, phc: &str) -> Result<bool> {
        let hasher = self.hasher.clone();
        let password = Zeroizing::new(password.expose_secret().clone());
        let phc = phc.to_string();

        let matched = tokio::task::spawn_blocking(move || hasher.verify(password.as_bytes(), &phc)).await??;
        Ok(matched)
    }

    /// Append, then evict everything beyond the newest `history_size` entries
    pub async fn record_history(&self, account_id: Uuid, password_hash: String) -> Result<()> {
        self.history
            .append(PasswordHistoryEntry {
                account_id,
                password_hash,
                created_at: self.clock.now(),
            })
            .await?;

        let evicted = self.history.prune(account_id, self.config.history_size).await?;
        if evicted > 0 {
            tracing::debug!(account_id = %account_id, evicted, "Pruned password history");
        }
        Ok(())
    }

    pub fn is_expired(&self, account: &Account) -> bool {
        password_expired(account, self.config.expiry_days, self.clock.now())
    }

    /// Random password with one character from every class, so it always
    /// passes the complexity rules.
    pub fn generate_temporary_password(&self) -> SecretString {
        let length = self.config.temporary_length.max(self.config.min_length).max(4);

        let mut chars: Vec<char> = [LOWER, UPPER, DIGITS, TEMP_SPECIALS]
            .iter()
            .filter_map(|class| random::pick(class))
            .collect();

        let all: Vec<u8> = [LOWER, UPPER, DIGITS, TEMP_SPECIALS].concat();
        chars.extend(random::string_from(&all, length.saturating_sub(chars.len())).chars());
        random::shuffle(&mut chars);

        SecretString::new(chars.into_iter().collect())
    }
}

impl std::fmt::Debug for PasswordPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordPolicy").field("config", &self.config).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::repository::InMemoryPasswordHistoryStore;

    fn fast_params() -> Argon2Params {
        Argon2Params {
            memory_cost: 1024,
            time_cost: 1,
            parallelism: 1,
        }
    }

    fn policy() -> (PasswordPolicy, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let policy = PasswordPolicy::new(
            PasswordConfig::default(),
            &fast_params(),
            Arc::new(InMemoryPasswordHistoryStore::new()),
            clock.clone(),
        )
        .unwrap();
        (policy, clock)
    }

    fn secret(s: &str) -> SecretString {
        SecretString::new(s.to_string())
    }

    #[test]
    fn test_reference_strength_scores() {
        assert_eq!(strength("Password1!"), 65);
        assert_eq!(strength("P@ssw0rd123456!!"), 100);
        assert!(strength("P@ssw0rd123456!!") > strength("Password1!"));
        assert_eq!(strength(""), 0);
    }

    #[test]
    fn test_all_violations_reported_at_once() {
        let (policy, _) = policy();
        let violations = policy.check_rules("abc");
        assert_eq!(
            violations,
            vec![
                PasswordViolation::TooShort { min_length: 8 },
                PasswordViolation::MissingUppercase,
                PasswordViolation::MissingDigit,
                PasswordViolation::MissingSpecial,
            ]
        );
    }

    #[test]
    fn test_common_password_case_insensitive() {
        let (policy, _) = policy();
        let violations = policy.check_rules("PASSWORD1!");
        assert!(violations.contains(&PasswordViolation::CommonPassword));
        assert!(policy.check_rules("Tr1cky-Gl4ss!").is_empty());
    }

    #[test]
    fn test_every_special_character_counts() {
        let (policy, _) = policy();
        for c in SPECIAL_CHARACTERS.chars() {
            let candidate = format!("Abcdefg1{}", c);
            assert!(policy.check_rules(&candidate).is_empty(), "rejected {:?}", c);
        }
    }

    #[tokio::test]
    async fn test_history_blocks_last_five_only() {
        let (policy, clock) = policy();
        let mut account = Account::new("a@example.com", String::new(), clock.now());

        let passwords: Vec<String> = (0..6).map(|i| format!("Rotating-Pass{}!", i)).collect();
        for password in &passwords {
            let hash = policy.hash(&secret(password)).await.unwrap();
            policy.record_history(account.id, hash.clone()).await.unwrap();
            account.password_hash = hash;
            clock.advance(Duration::seconds(1));
        }

        // The oldest fell out of the window
        let oldest = policy.validate(&secret(&passwords[0]), Some(&account)).await.unwrap();
        assert!(oldest.valid, "{:?}", oldest.violations);

        for password in &passwords[1..] {
            let result = policy.validate(&secret(password), Some(&account)).await.unwrap();
            assert_eq!(result.violations, vec![PasswordViolation::RecentlyUsed]);
        }
    }

    #[tokio::test]
    async fn test_hash_and_verify_roundtrip() {
        let (policy, _) = policy();
        let hash = policy.hash(&secret("Str0ng-Enough")).await.unwrap();
        assert!(policy.verify(&secret("Str0ng-Enough"), &hash).await.unwrap());
        assert!(!policy.verify(&secret("str0ng-enough"), &hash).await.unwrap());
    }

    #[test]
    fn test_expiry() {
        let now = Utc::now();
        let mut account = Account::new("a@example.com", String::new(), now);
        assert!(!password_expired(&account, 90, now + Duration::days(90)));
        assert!(password_expired(&account, 90, now + Duration::days(91)));

        account.password_expiry_days = Some(7);
        assert!(password_expired(&account, 90, now + Duration::days(8)));

        account.password_changed_at = None;
        assert!(password_expired(&account, 90, now));
    }

    #[test]
    fn test_unrepresentable_expiry_never_expires() {
        let now = Utc::now();
        let mut account = Account::new("a@example.com", String::new(), now);
        account.password_expiry_days = Some(i64::MAX / 2);
        assert!(!password_expired(&account, 90, now + Duration::days(3650)));

        account.password_expiry_days = Some(i64::MIN);
        assert!(!password_expired(&account, 90, now));
    }

    #[test]
    fn test_temporary_passwords_pass_rules() {
        let (policy, _) = policy();
        for _ in 0..50 {
            let temp = policy.generate_temporary_password();
            assert_eq!(temp.expose_secret().chars().count(), 12);
            assert!(policy.check_rules(temp.expose_secret()).is_empty());
        }
    }
}
