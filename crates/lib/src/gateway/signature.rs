//! Slack request signing: `v0=` + hex(HMAC-SHA256(secret, "v0:{timestamp}:{body}")).

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Requests whose timestamp is further than this from now are rejected (replay window).
pub const MAX_CLOCK_SKEW_SECS: i64 = 300;

const VERSION: &str = "v0";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("missing or malformed request timestamp")]
    BadTimestamp,
    #[error("request timestamp outside the allowed window")]
    Stale,
    #[error("signature mismatch")]
    Mismatch,
}

fn mac(secret: &str, timestamp: &str, body: &[u8]) -> Result<HmacSha256, SignatureError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::Mismatch)?;
    mac.update(VERSION.as_bytes());
    mac.update(b":");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);
    Ok(mac)
}

/// Signature header value Slack would send for this request.
pub fn sign(secret: &str, timestamp: &str, body: &[u8]) -> String {
    match mac(secret, timestamp, body) {
        Ok(m) => format!("{}={}", VERSION, hex::encode(m.finalize().into_bytes())),
        Err(_) => String::new(),
    }
}

/// Check `X-Slack-Signature` against the body. `now` is unix seconds.
pub fn verify(
    secret: &str,
    timestamp: &str,
    signature: &str,
    body: &[u8],
    now: i64,
) -> Result<(), SignatureError> {
    let ts: i64 = timestamp
        .trim()
        .parse()
        .map_err(|_| SignatureError::BadTimestamp)?;
    if (now - ts).abs() > MAX_CLOCK_SKEW_SECS {
        return Err(SignatureError::Stale);
    }
    let provided = signature
        .strip_prefix("v0=")
        .and_then(|h| hex::decode(h).ok())
        .ok_or(SignatureError::Mismatch)?;
    mac(secret, timestamp, body)?
        .verify_slice(&provided)
        .map_err(|_| SignatureError::Mismatch)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "8f742231b10e8888abcd99yyyzzz85a5";
    const BODY: &[u8] = br#"{"type":"url_verification","challenge":"X"}"#;

    #[test]
    fn signed_request_verifies() {
        let sig = sign(SECRET, "1531420618", BODY);
        assert!(sig.starts_with("v0="));
        assert_eq!(sig.len(), 3 + 64);
        assert_eq!(verify(SECRET, "1531420618", &sig, BODY, 1531420618 + 10), Ok(()));
    }

    #[test]
    fn tampered_body_or_secret_fails() {
        let sig = sign(SECRET, "1000", BODY);
        assert_eq!(
            verify(SECRET, "1000", &sig, b"{}", 1000),
            Err(SignatureError::Mismatch)
        );
        assert_eq!(
            verify("other", "1000", &sig, BODY, 1000),
            Err(SignatureError::Mismatch)
        );
        assert_eq!(
            verify(SECRET, "1000", "v0=zz", BODY, 1000),
            Err(SignatureError::Mismatch)
        );
        assert_eq!(
            verify(SECRET, "1000", "", BODY, 1000),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn timestamp_window_is_enforced() {
        let sig = sign(SECRET, "1000", BODY);
        assert_eq!(
            verify(SECRET, "1000", &sig, BODY, 1000 + MAX_CLOCK_SKEW_SECS + 1),
            Err(SignatureError::Stale)
        );
        assert_eq!(
            verify(SECRET, "1000", &sig, BODY, 1000 - MAX_CLOCK_SKEW_SECS - 1),
            Err(SignatureError::Stale)
        );
        assert_eq!(
            verify(SECRET, "", &sig, BODY, 1000),
            Err(SignatureError::BadTimestamp)
        );
    }
}
