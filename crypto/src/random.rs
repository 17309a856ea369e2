/// OS-backed randomness for identifiers and generated secrets

use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use zeroize::Zeroizing;

/// `len` random bytes, wiped on drop
pub fn random_bytes(len: usize) -> Zeroizing<Vec<u8>> {
    let mut buf = Zeroizing::new(vec![0u8; len]);
    OsRng.fill_bytes(&mut buf);
    buf
}

/// Hex token carrying `bytes` bytes of entropy (string length is `2 * bytes`)
pub fn token_hex(bytes: usize) -> String {
    hex::encode(&*random_bytes(bytes))
}

/// One uniformly chosen character from `alphabet`
pub fn pick(alphabet: &[u8]) -> Option<char> {
    alphabet.choose(&mut OsRng).map(|b| char::from(*b))
}

/// `len` characters drawn uniformly from `alphabet`
pub fn string_from(alphabet: &[u8], len: usize) -> String {
    if alphabet.is_empty() {
        return String::new();
    }
    (0..len)
        .filter_map(|_| alphabet.get(OsRng.gen_range(0..alphabet.len())))
        .map(|b| char::from(*b))
        .collect()
}

/// Shuffle characters in place
pub fn shuffle(chars: &mut [char]) {
    chars.shuffle(&mut OsRng);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_length_and_uniqueness() {
        let a = token_hex(32);
        let b = token_hex(32);
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_string_from_alphabet() {
        let s = string_from(b"ab", 50);
        assert_eq!(s.len(), 50);
        assert!(s.chars().all(|c| c == 'a' || c == 'b'));
        assert_eq!(string_from(b"", 5), "");
    }

    #[test]
    fn test_pick() {
        assert_eq!(pick(b"z"), Some('z'));
        assert_eq!(pick(b""), None);
    }
}
