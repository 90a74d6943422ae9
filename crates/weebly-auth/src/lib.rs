//! Weebly OAuth provider library
//!
//! Provides HMAC request verification, webhook event decoding, and the
//! provider client used for the authorization-code flow. This crate is a
//! standalone library with no dependency on the HTTP server, so it can be
//! tested and used independently.
//!
//! OAuth flow:
//! 1. Weebly calls phase one with `user_id`, `timestamp`, `site_id?` and an
//!    `hmac` over those values, verified with `signature::oauth_payload()` and
//!    `signature::is_valid()`
//! 2. The user is redirected to `WeeblyClient::authorization_url()`
//! 3. Weebly calls phase two with an authorization code, exchanged through
//!    `WeeblyClient::exchange_code()`
//!
//! Webhook deliveries are decoded into `WebhookEvent` and authenticated with
//! `WebhookEvent::verify()`.

pub mod client;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod signature;
pub mod webhook;

pub use client::{ApiMethod, Endpoints, TokenResult, WeeblyClient, build_http_client};
pub use constants::*;
pub use credentials::Credentials;
pub use error::{Error, Result};
pub use webhook::{Scalar, WebhookEvent};
