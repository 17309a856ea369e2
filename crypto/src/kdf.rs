use crate::error::{CryptoError, CryptoResult};
use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Algorithm, Argon2, Params, PasswordHash, PasswordVerifier, Version,
};
use serde::{Deserialize, Serialize};

/// Argon2 parameters for password hashing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Argon2Params {
    /// Memory cost in KiB (minimum 19456 for Argon2id in production)
    pub memory_cost: u32,
    /// Time cost (iterations)
    pub time_cost: u32,
    /// Parallelism factor
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            memory_cost: 19456,  // 19 MiB
            time_cost: 2,
            parallelism: 1,
        }
    }
}

/// Argon2id hasher producing PHC strings
///
/// Verification reads the parameters embedded in the stored hash, so hashes
/// written under older parameters keep verifying after a cost change.
#[derive(Clone)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    pub fn new(params: &Argon2Params) -> CryptoResult<Self> {
        let params = Params::new(params.memory_cost, params.time_cost, params.parallelism, Some(32))
            .map_err(|e| CryptoError::Configuration(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a password with a fresh random salt
    pub fn hash(&self, password: &[u8]) -> CryptoResult<String> {
        let salt = SaltString::generate(&mut rand::thread_rng());
        self.argon2
            .hash_password(password, &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| CryptoError::HashFailed(e.to_string()))
    }

    /// Verify a password against a stored PHC string.
    ///
    /// `Ok(false)` means the password is wrong; `Err` means the stored hash is
    /// unusable.
    pub fn verify(&self, password: &[u8], phc: &str) -> CryptoResult<bool> {
        let parsed = PasswordHash::new(phc).map_err(|e| CryptoError::InvalidFormat(e.to_string()))?;

        match self.argon2.verify_password(password, &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(CryptoError::HashFailed(e.to_string())),
        }
    }
}

impl std::fmt::Debug for Argon2Hasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Argon2Hasher").finish_non_exhaustive()
    }
}
