/// SHA-256 digests rendered as lowercase hex

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of `data`
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Hex-encoded SHA-256 of the non-empty `parts` joined by `delimiter`.
///
/// Empty components are dropped before joining, so an absent header and an
/// empty header hash identically.
pub fn sha256_hex_joined<S: AsRef<str>>(parts: &[S], delimiter: &str) -> String {
    let joined = parts
        .iter()
        .map(AsRef::as_ref)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(delimiter);
    sha256_hex(joined.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_empty_parts_are_filtered() {
        let with_gap = sha256_hex_joined(&["10.0.0.1", "", "en-US"], "|");
        let without = sha256_hex_joined(&["10.0.0.1", "en-US"], "|");
        assert_eq!(with_gap, without);
        assert_eq!(without, sha256_hex(b"10.0.0.1|en-US"));
    }
}
