//! Session identifiers and cookie signing
//!
//! A session cookie carries `{session_id}.{signature}` where the signature
//! is the hex-encoded HMAC-SHA256 of the session id under the server secret.
//! The session row itself lives in the `sessions` table
//! (see [`crate::models::session`]).
//!
//! # Example
//!
//! ```
//! use taskhub_shared::auth::session::{generate_session_id, sign_session_id, verify_signed_session_id};
//!
//! let secret = b"a-server-secret-that-is-long-enough";
//! let id = generate_session_id();
//!
//! let cookie_value = sign_session_id(&id, secret);
//! assert_eq!(verify_signed_session_id(&cookie_value, secret), Some(id));
//! assert_eq!(verify_signed_session_id(&cookie_value, b"another-secret"), None);
//! ```

use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Length of a session id (characters)
pub const SESSION_ID_LENGTH: usize = 32;

/// Generates a random session id
///
/// 32 base62 characters drawn from `rand::thread_rng()`.
pub fn generate_session_id() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    (0..SESSION_ID_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

fn mac_for(secret: &[u8]) -> HmacSha256 {
    // HMAC accepts keys of any length
    HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size")
}

/// Produces the signed cookie value for a session id
pub fn sign_session_id(session_id: &str, secret: &[u8]) -> String {
    let mut mac = mac_for(secret);
    mac.update(session_id.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    format!("{}.{}", session_id, signature)
}

/// Checks a signed cookie value and returns the session id it carries
///
/// Returns `None` for malformed values, ids of the wrong shape, and bad
/// signatures. The signature check is constant-time.
pub fn verify_signed_session_id(value: &str, secret: &[u8]) -> Option<String> {
    let (session_id, signature) = value.rsplit_once('.')?;

    if !is_valid_session_id(session_id) {
        return None;
    }

    let signature = hex::decode(signature).ok()?;

    let mut mac = mac_for(secret);
    mac.update(session_id.as_bytes());
    mac.verify_slice(&signature).ok()?;

    Some(session_id.to_string())
}

/// Validates session id shape: exactly 32 ASCII alphanumerics
pub fn is_valid_session_id(session_id: &str) -> bool {
    session_id.len() == SESSION_ID_LENGTH && session_id.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-session-secret-at-least-32-bytes";

    #[test]
    fn test_generate_session_id_shape() {
        let id = generate_session_id();
        assert_eq!(id.len(), SESSION_ID_LENGTH);
        assert!(is_valid_session_id(&id));
    }

    #[test]
    fn test_generate_session_id_is_random() {
        assert_ne!(generate_session_id(), generate_session_id());
    }

    #[test]
    fn test_sign_and_verify() {
        let id = generate_session_id();
        let signed = sign_session_id(&id, SECRET);

        assert!(signed.starts_with(&id));
        assert_eq!(signed.len(), SESSION_ID_LENGTH + 1 + 64);
        assert_eq!(verify_signed_session_id(&signed, SECRET), Some(id));
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let signed = sign_session_id(&generate_session_id(), SECRET);
        assert_eq!(verify_signed_session_id(&signed, b"some-other-secret"), None);
    }

    #[test]
    fn test_verify_rejects_tampered_id() {
        let id = generate_session_id();
        let signed = sign_session_id(&id, SECRET);
        let (_, signature) = signed.rsplit_once('.').unwrap();

        let forged = format!("{}.{}", generate_session_id(), signature);
        assert_eq!(verify_signed_session_id(&forged, SECRET), None);
    }

    #[test]
    fn test_verify_rejects_malformed_values() {
        assert_eq!(verify_signed_session_id("", SECRET), None);
        assert_eq!(verify_signed_session_id("no-dot-here", SECRET), None);
        assert_eq!(verify_signed_session_id("short.abcd", SECRET), None);

        let id = generate_session_id();
        assert_eq!(verify_signed_session_id(&format!("{}.not-hex", id), SECRET), None);
        assert_eq!(verify_signed_session_id(&format!("{}.", id), SECRET), None);
    }
}
