/// Constant-time comparison helpers
///
/// Session fingerprints, reset-token digests and any other value derived from
/// a secret are compared through these functions, never with `==`.

use subtle::ConstantTimeEq;

/// Constant-time comparison of byte slices
///
/// Returns true if slices are equal. Execution time does not depend on where
/// the first differing byte sits.
///
/// # Example
///
/// ```rust
/// use crypto::constant_time::ct_eq;
///
/// assert!(ct_eq(b"fingerprint", b"fingerprint"));
/// assert!(!ct_eq(b"fingerprint", b"fingerprinT"));
/// ```
pub fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    // Length is not secret
    if a.len() != b.len() {
        return false;
    }

    a.ct_eq(b).into()
}

/// Constant-time comparison of strings
pub fn ct_eq_str(a: &str, b: &str) -> bool {
    ct_eq(a.as_bytes(), b.as_bytes())
}

/// True when `needle` equals any entry of `haystack`.
///
/// Every entry is compared; the scan does not stop at the first hit.
pub fn ct_contains(haystack: &[&str], needle: &str) -> bool {
    haystack
        .iter()
        .fold(false, |found, candidate| ct_eq_str(candidate, needle) | found)
}
