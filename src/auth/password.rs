//! Salted PBKDF2-HMAC-SHA256 password hashing.
//!
//! Stored format: `pbkdf2-sha256$<iterations>$<salt b64>$<hash b64>`.
//! Verification is constant-time over the derived hash.

use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use subtle::ConstantTimeEq;

const SALT_LENGTH: usize = 16;
const HASH_LENGTH: usize = 32;

// Lower cost under test so the suite stays fast; production cost matches
// current OWASP guidance for PBKDF2-SHA256.
const PBKDF2_ITERATIONS: u32 = if cfg!(test) { 1_000 } else { 600_000 };

const B64: base64::engine::GeneralPurpose = base64::engine::general_purpose::STANDARD_NO_PAD;

/// Hash a plaintext password with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let salt = generate_salt();
    let hash = derive(password, &salt, PBKDF2_ITERATIONS);
    format!(
        "pbkdf2-sha256${}${}${}",
        PBKDF2_ITERATIONS,
        B64.encode(salt),
        B64.encode(hash),
    )
}

/// Verify a plaintext password against a stored hash string.
/// Malformed stored values verify as false rather than erroring.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some(scheme), Some(iters), Some(salt_b64), Some(hash_b64), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };
    if scheme != "pbkdf2-sha256" {
        return false;
    }
    let Ok(iterations) = iters.parse::<u32>() else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (B64.decode(salt_b64), B64.decode(hash_b64)) else {
        return false;
    };
    if expected.len() != HASH_LENGTH {
        return false;
    }

    let derived = derive(password, &salt, iterations);
    derived.ct_eq(expected.as_slice()).into()
}

fn derive(password: &str, salt: &[u8], iterations: u32) -> [u8; HASH_LENGTH] {
    let mut out = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut out);
    out
}

fn generate_salt() -> [u8; SALT_LENGTH] {
    use rand::RngCore;
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}
