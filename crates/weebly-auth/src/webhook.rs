//! Webhook event decoding and canonical signing payload
//!
//! Weebly signs a webhook by HMAC-ing the JSON encoding of
//! `{client_id, client_version, event, timestamp, data}` in exactly that
//! order. The sender produces that JSON with PHP `json_encode` defaults, so
//! the canonical form here escapes `/` as `\/` and every non-ASCII character
//! as a `\uXXXX` UTF-16 escape, and keeps the key order of `data` as
//! received. Field order in the delivered body does not matter.

use std::fmt;
use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use serde_json::ser::Formatter;

use crate::signature;

/// A JSON string or number, kept in its original form.
///
/// `client_id`, `client_version` and `timestamp` arrive as either, and the
/// signature covers whichever encoding the sender used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(s) => f.write_str(s),
            Scalar::Number(n) => write!(f, "{n}"),
        }
    }
}

/// An inbound webhook delivery.
///
/// All six fields are required; a body missing any of them fails to decode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub client_id: Scalar,
    pub client_version: Scalar,
    pub event: String,
    pub timestamp: Scalar,
    pub data: serde_json::Value,
    pub hmac: String,
}

/// The signed subset of a delivery, in signing order.
#[derive(Serialize)]
struct SignedFields<'a> {
    client_id: &'a Scalar,
    client_version: &'a Scalar,
    event: &'a str,
    timestamp: &'a Scalar,
    data: &'a serde_json::Value,
}

impl WebhookEvent {
    /// Decode a raw request body.
    pub fn from_slice(body: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(body)
    }

    /// Bytes the sender signed.
    pub fn canonical_payload(&self) -> Vec<u8> {
        let fields = SignedFields {
            client_id: &self.client_id,
            client_version: &self.client_version,
            event: &self.event,
            timestamp: &self.timestamp,
            data: &self.data,
        };
        let mut buf = Vec::with_capacity(128);
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, PhpJsonFormatter);
        // Writing plain JSON values into a Vec cannot fail
        if fields.serialize(&mut ser).is_err() {
            buf.clear();
        }
        buf
    }

    /// Whether `hmac` matches the canonical payload signed with `secret`.
    pub fn verify(&self, secret: &[u8]) -> bool {
        signature::is_valid(&self.canonical_payload(), secret, &self.hmac)
    }
}

/// Compact JSON with PHP `json_encode` string escaping.
struct PhpJsonFormatter;

impl Formatter for PhpJsonFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            if ch != '/' && ch.is_ascii() {
                continue;
            }
            writer.write_all(&fragment.as_bytes()[start..i])?;
            if ch == '/' {
                writer.write_all(b"\\/")?;
            } else {
                let mut units = [0u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
            start = i + ch.len_utf8();
        }
        writer.write_all(&fragment.as_bytes()[start..])
    }
}
