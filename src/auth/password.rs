//! Admin password hashing (PBKDF2-HMAC-SHA256).
//!
//! Encoded form: `pbkdf2-sha256$<iterations>$<salt hex>$<hash hex>`.

use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

pub const SCHEME: &str = "pbkdf2-sha256";
pub const DEFAULT_ITERATIONS: u32 = 100_000;
const SALT_LEN: usize = 16;

/// Hash `password` with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    hash_password_with(password, &salt, DEFAULT_ITERATIONS)
}

pub fn hash_password_with(password: &str, salt: &[u8], iterations: u32) -> String {
    let derived = pbkdf2(password.as_bytes(), salt, iterations.max(1));
    format!(
        "{}${}${}${}",
        SCHEME,
        iterations.max(1),
        hex::encode(salt),
        hex::encode(derived)
    )
}

/// Check `password` against an encoded hash. Unparsable hashes never match.
pub fn verify_password(password: &str, encoded: &str) -> bool {
    let mut parts = encoded.split('$');
    let (Some(SCHEME), Some(iterations), Some(salt), Some(expected), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };

    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (hex::decode(salt), hex::decode(expected)) else {
        return false;
    };
    if iterations == 0 {
        return false;
    }

    let derived = pbkdf2(password.as_bytes(), &salt, iterations);
    bool::from(derived.as_slice().ct_eq(expected.as_slice()))
}

fn pbkdf2(password: &[u8], salt: &[u8], iterations: u32) -> [u8; 32] {
    let mut out = [0u8; 32];
    pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc7914_vector() {
        // PBKDF2-HMAC-SHA256, P="passwd", S="salt", c=1, first 32 bytes.
        let derived = pbkdf2(b"passwd", b"salt", 1);
        assert_eq!(
            hex::encode(derived),
            "55ac046e56e3089fec1691c22544b605f94185216dde0465e68b9d57c20dacbc"
        );
    }

    #[test]
    fn test_hash_and_verify() {
        let encoded = hash_password_with("hunter2", b"fixed-salt", 1000);
        assert!(encoded.starts_with("pbkdf2-sha256$1000$"));
        assert!(verify_password("hunter2", &encoded));
        assert!(!verify_password("hunter3", &encoded));
    }

    #[test]
    fn test_random_salts_differ() {
        let a = hash_password("same password");
        let b = hash_password("same password");
        assert_ne!(a, b);
        assert!(verify_password("same password", &a));
    }

    #[test]
    fn test_garbage_hashes_never_match() {
        for encoded in [
            "",
            "plaintext",
            "pbkdf2-sha256$x$00$00",
            "pbkdf2-sha256$0$00$00",
            "pbkdf2-sha256$10$zz$00",
            "bcrypt$10$00$00",
            "pbkdf2-sha256$10$00$0000",
            "pbkdf2-sha256$10$00$00$extra",
        ] {
            assert!(!verify_password("anything", encoded), "{:?}", encoded);
        }
    }
}
