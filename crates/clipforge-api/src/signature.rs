//! Webhook signature verification.
//!
//! The render farm signs every callback with HMAC-SHA256 over the exact raw
//! request body and the shared secret, sent as `x-signature: sha256=<hex>`.
//! Verification must run over the same raw bytes (before any JSON parsing)
//! and must hard-fail on mismatch: the webhook endpoint is otherwise a
//! public, unauthenticated internet endpoint.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "x-signature";

const SIGNATURE_PREFIX: &str = "sha256=";

/// Sign a payload the way the render farm does.
///
/// The serving side only verifies; this is the counterpart used by tooling
/// and integration tests that play the farm's role.
pub fn sign(secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(body);
    format!("{}{}", SIGNATURE_PREFIX, hex::encode(mac.finalize().into_bytes()))
}

/// Verify a signature header against the raw request body.
///
/// Comparison is constant-time via the HMAC verify primitive. Any malformed
/// header (wrong prefix, bad hex) fails verification.
pub fn verify(secret: &str, body: &[u8], header: &str) -> bool {
    let hex_digest = match header.strip_prefix(SIGNATURE_PREFIX) {
        Some(rest) => rest,
        None => return false,
    };

    let expected = match hex::decode(hex_digest) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-webhook-secret";

    #[test]
    fn test_sign_verify_roundtrip() {
        let body = br#"{"renderId":"r1","done":true}"#;
        let header = sign(SECRET, body);
        assert!(header.starts_with("sha256="));
        assert!(verify(SECRET, body, &header));
    }

    #[test]
    fn test_wrong_secret_fails() {
        let body = b"payload";
        let header = sign(SECRET, body);
        assert!(!verify("other-secret", body, &header));
    }

    #[test]
    fn test_tampered_body_fails() {
        let header = sign(SECRET, b"original");
        assert!(!verify(SECRET, b"tampered", &header));
    }

    #[test]
    fn test_malformed_header_fails() {
        let body = b"payload";
        assert!(!verify(SECRET, body, "sha512=abcdef"));
        assert!(!verify(SECRET, body, "sha256=not-hex"));
        assert!(!verify(SECRET, body, ""));
    }
}
