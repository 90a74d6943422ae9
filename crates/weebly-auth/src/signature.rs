//! HMAC-SHA256 request signatures
//!
//! Weebly signs both the OAuth phase-one redirect and every webhook delivery
//! with HMAC-SHA256 keyed by the application client secret, hex-encoded in
//! lowercase. Verification recomputes the digest over a canonical payload and
//! compares it with the value the caller sent.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use url::form_urlencoded;

type HmacSha256 = Hmac<Sha256>;

/// Compute the lowercase hex HMAC-SHA256 of `payload` keyed by `secret`.
pub fn sign(payload: &[u8], secret: &[u8]) -> String {
    // HMAC accepts keys of any length, including empty
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Check `expected` against the signature of `payload`.
///
/// Exact string comparison: uppercase hex or a truncated value never matches.
/// Empty inputs produce a signature that simply fails to match.
pub fn is_valid(payload: &[u8], secret: &[u8], expected: &str) -> bool {
    sign(payload, secret) == expected
}

/// Canonical payload for the OAuth phase-one signature.
///
/// Form-urlencoded `user_id`, `timestamp` and, when present, `site_id`, in
/// that order. `*` is escaped as `%2A` to match PHP `http_build_query`.
pub fn oauth_payload(user_id: &str, timestamp: &str, site_id: Option<&str>) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    serializer
        .append_pair("user_id", user_id)
        .append_pair("timestamp", timestamp);
    if let Some(site_id) = site_id {
        serializer.append_pair("site_id", site_id);
    }
    serializer.finish().replace('*', "%2A")
}
