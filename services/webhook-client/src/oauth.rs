//! OAuth phase one and phase two handlers
//!
//! Phase one: Weebly sends the user here with a signed `user_id`,
//! `timestamp` and optional `site_id`. After checking the signature the user
//! is redirected to the authorize step, which sends them back to phase two.
//!
//! Phase two: exchange the authorization code for an access token and send
//! the user on to the callback URL Weebly returned. The token is not stored.

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use tracing::{error, info, warn};
use weebly_auth::signature;

use crate::router::QueryParams;
use crate::{AppState, html, metrics};

fn param<'a>(params: &'a QueryParams, key: &str) -> Option<&'a str> {
    params.get(key).map(String::as_str)
}

/// 302 to `location`, or an inline error when it is not a valid header value.
fn redirect(location: String) -> Response {
    match HeaderValue::try_from(location) {
        Ok(location) => (StatusCode::FOUND, [(header::LOCATION, location)]).into_response(),
        Err(e) => {
            warn!(error = %e, "redirect target is not a valid Location header");
            html::error_message("Error: Invalid redirect location")
        }
    }
}

/// GET /oauth/phase_one
pub fn phase_one(state: &AppState, params: &QueryParams, host: Option<&str>) -> Response {
    let user_id = param(params, "user_id");
    let site_id = param(params, "site_id");
    let payload = signature::oauth_payload(
        user_id.unwrap_or_default(),
        param(params, "timestamp").unwrap_or_default(),
        site_id,
    );

    if !signature::is_valid(
        payload.as_bytes(),
        state.credentials.client_secret.expose().as_bytes(),
        param(params, "hmac").unwrap_or_default(),
    ) {
        warn!(user_id, site_id, "phase one HMAC mismatch");
        metrics::record_oauth("phase_one", "invalid_hmac");
        return html::error_message("Unable to verify HMAC. Request is invalid.");
    }

    let host = state
        .config
        .server
        .public_host
        .as_deref()
        .or(host)
        .unwrap_or("localhost");
    let phase_two = format!("https://{host}/oauth/phase_two");

    let client = state
        .weebly_client()
        .with_user(user_id.map(str::to_string))
        .with_site(site_id.map(str::to_string));
    let url = client.authorization_url(&[], Some(&phase_two), param(params, "callback_url"));

    info!(user_id, site_id, "redirecting to authorize step");
    metrics::record_oauth("phase_one", "redirect");
    redirect(url)
}

/// GET /oauth/phase_two
pub async fn phase_two(state: &AppState, params: &QueryParams) -> Response {
    let client = state
        .weebly_client()
        .with_user(param(params, "user_id").map(str::to_string))
        .with_site(param(params, "site_id").map(str::to_string));

    let token = client
        .exchange_code(
            param(params, "authorization_code").unwrap_or_default(),
            param(params, "callback_url"),
        )
        .await;

    match token {
        Ok(weebly_auth::TokenResult {
            access_token: Some(_),
            callback_url: Some(callback_url),
            ..
        }) => {
            // TODO: persist the access token per user/site once API calls need it
            info!(
                user_id = client.user_id(),
                site_id = client.site_id(),
                "access token obtained"
            );
            metrics::record_oauth("phase_two", "redirect");
            redirect(callback_url)
        }
        Ok(weebly_auth::TokenResult {
            error: Some(message),
            ..
        }) => {
            warn!(error = %message, "token exchange rejected by provider");
            metrics::record_oauth("phase_two", "error");
            html::error_message(&format!("Error: {message}"))
        }
        Ok(_) => {
            warn!("token response carried neither a usable token nor an error");
            metrics::record_oauth("phase_two", "error");
            html::error_message("Error: Unable to get Access Token")
        }
        Err(e) => {
            error!(error = %e, "token exchange failed");
            metrics::record_oauth("phase_two", "error");
            html::error_message("Error: Unable to get Access Token")
        }
    }
}
