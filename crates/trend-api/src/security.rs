//! Token signing and session fingerprints.
//!
//! - CSRF tokens: random nonce plus an HMAC-SHA256 signature under the
//!   server's secret key, `"{nonce}.{signature}"`, both base64url.
//! - Session keys: 32 random lowercase alphanumerics.
//! - Session auth hash: digest of the user's password hash, so a password
//!   change invalidates sessions bound to the old one.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Length of generated session keys.
pub const SESSION_KEY_LEN: usize = 32;

const SESSION_KEY_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Issue a fresh signed CSRF token.
pub fn issue_csrf_token(secret: &str) -> String {
    let nonce: [u8; 32] = rand::rng().random();
    let nonce = URL_SAFE_NO_PAD.encode(nonce);
    let signature = sign(secret, &nonce);
    format!("{}.{}", nonce, signature)
}

/// True if `token` carries a valid signature under `secret`.
pub fn verify_csrf_token(secret: &str, token: &str) -> bool {
    let Some((nonce, signature)) = token.split_once('.') else {
        return false;
    };
    if nonce.is_empty() {
        return false;
    }
    let Ok(sig_bytes) = URL_SAFE_NO_PAD.decode(signature) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(nonce.as_bytes());
    mac.verify_slice(&sig_bytes).is_ok()
}

fn sign(secret: &str, payload: &str) -> String {
    // HMAC accepts keys of any length, so this cannot fail.
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(payload.as_bytes());
    URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
}

/// Random session key.
pub fn generate_session_key() -> String {
    let mut rng = rand::rng();
    (0..SESSION_KEY_LEN)
        .map(|_| SESSION_KEY_CHARS[rng.random_range(0..SESSION_KEY_CHARS.len())] as char)
        .collect()
}

/// Fingerprint of a password hash stored on the session.
pub fn session_auth_hash(password_hash: &str) -> String {
    let digest = Sha256::digest(password_hash.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

/// Compare two strings without short-circuiting on the first mismatch.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}
