pub mod constant_time;
pub mod digest;
pub mod kdf;
pub mod random;
pub mod error;

pub use error::*;
pub use kdf::{Argon2Hasher, Argon2Params};

/// Cryptographic primitives used by the Gatehouse authentication core
///
/// - Argon2id password hashing and verification (PHC strings)
/// - SHA-256 digests for session fingerprints and reset-token storage
/// - OS-random session identifiers and temporary-password material
/// - Constant-time comparison for every secret-derived value
///
/// # Example
///
/// ```rust
/// use crypto::{Argon2Hasher, Argon2Params, constant_time::ct_eq_str, digest::sha256_hex};
///
/// let hasher = Argon2Hasher::new(&Argon2Params::default()).unwrap();
/// let phc = hasher.hash(b"Correct-Horse-9").unwrap();
/// assert!(hasher.verify(b"Correct-Horse-9", &phc).unwrap());
///
/// let fingerprint = sha256_hex(b"203.0.113.7|Mozilla/5.0");
/// assert!(ct_eq_str(&fingerprint, &sha256_hex(b"203.0.113.7|Mozilla/5.0")));
/// ```
pub const PASSWORD_ALGORITHM: &str = "argon2id";
