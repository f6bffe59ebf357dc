//! Signature primitives for the payment gateway and identity provider.
//!
//! Every comparison of a received signature against an expected one goes
//! through `subtle` so rejection time does not depend on the matching prefix.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Identity webhook timestamps further than this from now are rejected.
pub const SVIX_TOLERANCE_SECS: i64 = 5 * 60;

const SVIX_SECRET_PREFIX: &str = "whsec_";

fn hmac_sha256(key: &[u8], parts: &[&[u8]]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    for part in parts {
        mac.update(part);
    }
    mac.finalize().into_bytes().to_vec()
}

fn ct_eq_str(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Hex-encoded HMAC-SHA256 of `payload`.
pub fn sign_hmac_hex(payload: &[u8], secret: &str) -> String {
    hex::encode(hmac_sha256(secret.as_bytes(), &[payload]))
}

/// Checks a hex HMAC-SHA256 signature in constant time.
pub fn verify_hmac_hex(payload: &[u8], signature: &str, secret: &str) -> bool {
    let expected = sign_hmac_hex(payload, secret);
    ct_eq_str(&expected, signature.trim())
}

/// Checkout callback signature: hex HMAC-SHA256 over `"<order_id>|<payment_id>"`.
pub fn payment_signature(order_id: &str, payment_id: &str, secret: &str) -> String {
    hex::encode(hmac_sha256(
        secret.as_bytes(),
        &[order_id.as_bytes(), b"|", payment_id.as_bytes()],
    ))
}

pub fn verify_payment_signature(
    order_id: &str,
    payment_id: &str,
    signature: &str,
    secret: &str,
) -> bool {
    let expected = payment_signature(order_id, payment_id, secret);
    ct_eq_str(&expected, signature)
}

// ─────────────────────────────────────────────────────────────────────────────
// Svix webhook signatures
// ─────────────────────────────────────────────────────────────────────────────

/// Why a Svix delivery was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SvixError {
    #[error("webhook secret is not valid base64")]
    InvalidSecret,
    #[error("timestamp is not a unix time")]
    InvalidTimestamp,
    #[error("timestamp outside tolerance")]
    StaleTimestamp,
    #[error("no matching signature")]
    NoMatch,
}

fn svix_key(secret: &str) -> Result<Vec<u8>, SvixError> {
    let encoded = secret.strip_prefix(SVIX_SECRET_PREFIX).unwrap_or(secret);
    BASE64.decode(encoded).map_err(|_| SvixError::InvalidSecret)
}

/// Produces a `v1,<base64>` signature for `"<id>.<timestamp>.<body>"`.
pub fn sign_svix(
    secret: &str,
    msg_id: &str,
    timestamp: i64,
    body: &[u8],
) -> Result<String, SvixError> {
    let key = svix_key(secret)?;
    let ts = timestamp.to_string();
    let mac = hmac_sha256(&key, &[msg_id.as_bytes(), b".", ts.as_bytes(), b".", body]);
    Ok(format!("v1,{}", BASE64.encode(mac)))
}

/// Verifies a Svix delivery.
///
/// `signatures` is the raw `svix-signature` header: space-separated
/// `<version>,<base64>` entries, any `v1` match accepts. `now` is unix seconds.
pub fn verify_svix(
    secret: &str,
    msg_id: &str,
    timestamp: &str,
    signatures: &str,
    body: &[u8],
    now: i64,
) -> Result<(), SvixError> {
    let ts: i64 = timestamp
        .trim()
        .parse()
        .map_err(|_| SvixError::InvalidTimestamp)?;
    if now.abs_diff(ts) > SVIX_TOLERANCE_SECS.unsigned_abs() {
        return Err(SvixError::StaleTimestamp);
    }

    let expected = sign_svix(secret, msg_id, ts, body)?;
    let expected = expected.trim_start_matches("v1,");

    let matched = signatures
        .split_whitespace()
        .filter_map(|entry| entry.split_once(','))
        .filter(|(version, _)| *version == "v1")
        .fold(false, |found, (_, sig)| found | ct_eq_str(expected, sig));

    if matched { Ok(()) } else { Err(SvixError::NoMatch) }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SVIX_SECRET: &str = "whsec_MfKQ9r8GKYqrTwjUPD8ILPZIo2LaLaSw";

    #[test]
    fn test_hmac_hex_signing() {
        let payload = br#"{"event":"payment.captured"}"#;
        let secret = "webhook_secret_123";

        let signature = sign_hmac_hex(payload, secret);
        assert_eq!(signature.len(), 64);
        assert!(verify_hmac_hex(payload, &signature, secret));
        assert!(!verify_hmac_hex(payload, &signature, "wrong_secret"));
        assert!(!verify_hmac_hex(b"tampered", &signature, secret));
    }

    #[test]
    fn test_payment_signature_matches_joined_message() {
        let sig = payment_signature("order_1", "pay_1", "secret");
        assert_eq!(sig, sign_hmac_hex(b"order_1|pay_1", "secret"));
        assert!(verify_payment_signature("order_1", "pay_1", &sig, "secret"));
        assert!(!verify_payment_signature("order_1", "pay_2", &sig, "secret"));
    }

    #[test]
    fn test_payment_signature_known_vector() {
        // HMAC-SHA256(key="key", "The quick brown fox jumps over the lazy dog")
        assert_eq!(
            sign_hmac_hex(b"The quick brown fox jumps over the lazy dog", "key"),
            "f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8"
        );
    }

    #[test]
    fn test_svix_round_trip() {
        let body = br#"{"type":"user.created"}"#;
        let now = 1_700_000_000;
        let sig = sign_svix(SVIX_SECRET, "msg_1", now, body).unwrap();

        assert!(sig.starts_with("v1,"));
        assert_eq!(
            verify_svix(SVIX_SECRET, "msg_1", &now.to_string(), &sig, body, now),
            Ok(())
        );
    }

    #[test]
    fn test_svix_accepts_any_listed_signature() {
        let body = b"{}";
        let now = 1_700_000_000;
        let sig = sign_svix(SVIX_SECRET, "msg_1", now, body).unwrap();
        let header = format!("v1,bm9wZQ== {}", sig);

        assert!(verify_svix(SVIX_SECRET, "msg_1", &now.to_string(), &header, body, now).is_ok());
    }

    #[test]
    fn test_svix_rejects_wrong_secret_and_tampering() {
        let body = b"{}";
        let now = 1_700_000_000;
        let sig = sign_svix("whsec_c2Vjb25kLXNlY3JldA==", "msg_1", now, body).unwrap();

        assert_eq!(
            verify_svix(SVIX_SECRET, "msg_1", &now.to_string(), &sig, body, now),
            Err(SvixError::NoMatch)
        );

        let sig = sign_svix(SVIX_SECRET, "msg_1", now, body).unwrap();
        assert_eq!(
            verify_svix(SVIX_SECRET, "msg_2", &now.to_string(), &sig, body, now),
            Err(SvixError::NoMatch)
        );
    }

    #[test]
    fn test_svix_extreme_timestamps_are_stale() {
        let now = 1_700_000_000;

        for ts in ["-9223372036854775808", "9223372036854775807"] {
            assert_eq!(
                verify_svix(SVIX_SECRET, "msg_1", ts, "v1,abc", b"{}", now),
                Err(SvixError::StaleTimestamp)
            );
        }
    }

    #[test]
    fn test_svix_timestamp_tolerance() {
        let body = b"{}";
        let sent = 1_700_000_000;
        let sig = sign_svix(SVIX_SECRET, "msg_1", sent, body).unwrap();
        let ts = sent.to_string();

        assert!(verify_svix(SVIX_SECRET, "msg_1", &ts, &sig, body, sent + 299).is_ok());
        assert_eq!(
            verify_svix(SVIX_SECRET, "msg_1", &ts, &sig, body, sent + 301),
            Err(SvixError::StaleTimestamp)
        );
        assert_eq!(
            verify_svix(SVIX_SECRET, "msg_1", &ts, &sig, body, sent - 301),
            Err(SvixError::StaleTimestamp)
        );
        assert_eq!(
            verify_svix(SVIX_SECRET, "msg_1", "yesterday", &sig, body, sent),
            Err(SvixError::InvalidTimestamp)
        );
    }

    #[test]
    fn test_svix_invalid_secret() {
        assert_eq!(
            sign_svix("whsec_***", "msg_1", 0, b"{}"),
            Err(SvixError::InvalidSecret)
        );
    }
}
