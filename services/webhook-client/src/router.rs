//! Request routing
//!
//! Every public request lands in `dispatch`, which splits the path into
//! segments, parses the query string, and hands off to exactly one handler.
//! Paths that match nothing get an empty 200 response rather than an error.

use std::collections::HashMap;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode, header};
use axum::response::{IntoResponse, Response};
use tracing::{Instrument, debug, info_span};
use url::form_urlencoded;

use crate::{AppState, home, oauth, webhook};

/// Query parameters; a repeated key keeps its last value.
pub type QueryParams = HashMap<String, String>;

/// Path segments with the leading empty segment removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    segments: Vec<String>,
}

/// The handler a route resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    Home,
    OAuthPhaseOne,
    OAuthPhaseTwo,
    WebhookCallback,
    Unmatched,
}

impl Route {
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Exact, case-sensitive match on the first two segments.
    pub fn handler(&self) -> Handler {
        let segment = |i: usize| self.segments.get(i).map(String::as_str);
        match (segment(0), segment(1)) {
            (None | Some(""), _) => Handler::Home,
            (Some("oauth"), Some("phase_one")) => Handler::OAuthPhaseOne,
            (Some("oauth"), Some("phase_two")) => Handler::OAuthPhaseTwo,
            (Some("webhooks"), Some("callback")) => Handler::WebhookCallback,
            _ => Handler::Unmatched,
        }
    }
}

/// Split `path` into a route and parse `raw_query` into parameters.
pub fn parse(path: &str, raw_query: Option<&str>) -> (Route, QueryParams) {
    let segments = path.split('/').skip(1).map(str::to_string).collect();
    let params = raw_query
        .map(|query| form_urlencoded::parse(query.as_bytes()).into_owned().collect())
        .unwrap_or_default();
    (Route { segments }, params)
}

/// Parse a request target that may carry its query string, e.g. `/a/b?x=1`.
pub fn parse_request_uri(uri: &str) -> (Route, QueryParams) {
    match uri.split_once('?') {
        Some((path, query)) => parse(path, Some(query)),
        None => parse(uri, None),
    }
}

/// Fallback handler for all public requests.
pub async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = format!("req_{}", uuid::Uuid::new_v4().as_simple());
    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let (route, params) = parse_request_uri(target);
    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    );

    async move {
        match route.handler() {
            Handler::Home => home::render(&state).await,
            Handler::OAuthPhaseOne => {
                let host = request
                    .headers()
                    .get(header::HOST)
                    .and_then(|v| v.to_str().ok());
                oauth::phase_one(&state, &params, host)
            }
            Handler::OAuthPhaseTwo => oauth::phase_two(&state, &params).await,
            Handler::WebhookCallback => webhook::callback(&state, request).await,
            Handler::Unmatched => {
                debug!(segments = ?route.segments(), "no handler for route");
                StatusCode::OK.into_response()
            }
        }
    }
    .instrument(span)
    .await
}
