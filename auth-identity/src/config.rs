use config::{Config, Environment, File, FileFormat};
use crypto::Argon2Params;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{IdentityError, Result};

/// Environment variable prefix, e.g. `GATEHOUSE__SESSION__IDLE_TIMEOUT_MINUTES=15`
pub const ENV_PREFIX: &str = "GATEHOUSE";

/// Main identity configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub password: PasswordConfig,
    pub lockout: LockoutConfig,
    pub rate_limit: RateLimitConfig,
    pub session: SessionConfig,
    pub terms: TermsConfig,
    pub hashing: Argon2Params,
    pub reset: ResetConfig,
    pub roles: RolesConfig,
}

/// Password rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordConfig {
    pub min_length: usize,
    /// Number of previous passwords that may not be reused
    pub history_size: usize,
    /// Applied when an account carries no expiry of its own
    pub expiry_days: i64,
    pub temporary_length: usize,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            min_length: 8,
            history_size: 5,
            expiry_days: 90,
            temporary_length: 12,
        }
    }
}

/// Failed-attempt consequences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LockoutConfig {
    /// Failed attempts on one account after which the requesting IP is blacklisted
    pub blacklist_ceiling: u32,
    pub blacklist_hours: i64,
    /// Lock the account itself after this many failures. Disabled when unset.
    pub lock_after: Option<u32>,
    pub lock_minutes: i64,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            blacklist_ceiling: 30,
            blacklist_hours: 24,
            lock_after: None,
            lock_minutes: 30,
        }
    }
}

/// Fixed-window limiter settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub login_max_attempts: u32,
    pub login_window_seconds: i64,
    pub reset_max_attempts: u32,
    pub reset_window_seconds: i64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            login_max_attempts: 5,
            login_window_seconds: 60,
            reset_max_attempts: 1,
            reset_window_seconds: 30,
        }
    }
}

/// Session management configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Idle timeout in minutes (default: 30 minutes)
    #[serde(default = "default_session_minutes")]
    pub idle_timeout_minutes: i64,

    /// Window granted at issue and on every refresh (default: 30 minutes)
    #[serde(default = "default_session_minutes")]
    pub lifetime_minutes: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_minutes: default_session_minutes(),
            lifetime_minutes: default_session_minutes(),
        }
    }
}

fn default_session_minutes() -> i64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TermsConfig {
    /// Version in force before any administrator publishes one
    pub initial_version: String,
    pub reminder_batch_size: usize,
}

impl Default for TermsConfig {
    fn default() -> Self {
        Self {
            initial_version: "1".to_string(),
            reminder_batch_size: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResetConfig {
    pub token_ttl_minutes: i64,
    /// The token is appended as `?token=...`
    pub link_base_url: String,
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self {
            token_ttl_minutes: 60,
            link_base_url: "http://localhost:8080/password/reset".to_string(),
        }
    }
}

/// Role name -> capabilities. `*` grants everything.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RolesConfig {
    pub capabilities: HashMap<String, Vec<String>>,
}

impl Default for RolesConfig {
    fn default() -> Self {
        let mut capabilities = HashMap::new();
        capabilities.insert("admin".to_string(), vec!["*".to_string()]);
        capabilities.insert(
            "user".to_string(),
            vec!["profile:read".to_string(), "profile:write".to_string()],
        );
        Self { capabilities }
    }
}

impl IdentityConfig {
    /// Defaults, then the optional file (format from its extension), then
    /// `GATEHOUSE__SECTION__KEY` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let config: Self = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let checks = [
            (self.password.min_length >= 1, "password.min_length must be at least 1"),
            (
                self.password.temporary_length >= self.password.min_length.max(4),
                "password.temporary_length must cover min_length and every character class",
            ),
            (self.lockout.blacklist_ceiling > 0, "lockout.blacklist_ceiling must be positive"),
            (self.lockout.blacklist_hours > 0, "lockout.blacklist_hours must be positive"),
            (self.lockout.lock_after != Some(0), "lockout.lock_after must be positive when set"),
            (self.rate_limit.login_max_attempts > 0, "rate_limit.login_max_attempts must be positive"),
            (self.rate_limit.login_window_seconds > 0, "rate_limit.login_window_seconds must be positive"),
            (self.rate_limit.reset_max_attempts > 0, "rate_limit.reset_max_attempts must be positive"),
            (self.rate_limit.reset_window_seconds > 0, "rate_limit.reset_window_seconds must be positive"),
            (self.session.idle_timeout_minutes > 0, "session.idle_timeout_minutes must be positive"),
            (self.session.lifetime_minutes > 0, "session.lifetime_minutes must be positive"),
            (self.reset.token_ttl_minutes > 0, "reset.token_ttl_minutes must be positive"),
            (!self.terms.initial_version.trim().is_empty(), "terms.initial_version must not be empty"),
        ];

        match checks.iter().find(|(ok, _)| !ok) {
            Some((_, message)) => Err(IdentityError::Config((*message).to_string())),
            None => Ok(()),
        }
    }
}
