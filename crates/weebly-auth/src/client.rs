//! Weebly provider client
//!
//! Builds authorization URLs, exchanges authorization codes for access
//! tokens, and makes authenticated API calls. A `WeeblyClient` is a
//! per-request session: credentials plus the user/site the request is about.
//! The underlying `reqwest::Client` is built once at startup and cloned into
//! each session, so connections are pooled rather than re-dialed.
//!
//! No retries and no status-code checks: whatever JSON the provider returns
//! is decoded and handed back, and callers inspect the fields.

use common::Secret;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::constants::{
    ACCESS_TOKEN_HEADER, ACCESS_TOKEN_PATH, AUTHORIZE_PATH, USER_AGENT, WEEBLY_API_DOMAIN,
    WEEBLY_DOMAIN,
};
use crate::credentials::Credentials;
use crate::error::{Error, Result};

/// Build the shared HTTP client with the provider user agent and timeouts.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(timeout)
        .timeout(timeout)
        .build()
        .map_err(|e| Error::Http(format!("building HTTP client: {e}")))
}

/// Provider base URLs. Overridable so tests and staging can point elsewhere.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub domain: String,
    pub api_domain: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            domain: WEEBLY_DOMAIN.to_string(),
            api_domain: WEEBLY_API_DOMAIN.to_string(),
        }
    }
}

impl Endpoints {
    pub fn authorize_url(&self) -> String {
        format!("{}{AUTHORIZE_PATH}", self.domain.trim_end_matches('/'))
    }

    pub fn access_token_url(&self) -> String {
        format!("{}{ACCESS_TOKEN_PATH}", self.domain.trim_end_matches('/'))
    }

    pub fn api_url(&self, path: &str) -> String {
        format!("{}{path}", self.api_domain.trim_end_matches('/'))
    }
}

/// HTTP methods accepted by the authenticated API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiMethod {
    Get,
    Post,
    Put,
    Patch,
}

impl ApiMethod {
    fn as_reqwest(self) -> reqwest::Method {
        match self {
            ApiMethod::Get => reqwest::Method::GET,
            ApiMethod::Post => reqwest::Method::POST,
            ApiMethod::Put => reqwest::Method::PUT,
            ApiMethod::Patch => reqwest::Method::PATCH,
        }
    }
}

/// Decoded token endpoint response.
///
/// On success `access_token` and `callback_url` are set; on failure the
/// provider sets `error`.
#[derive(Debug, Deserialize)]
pub struct TokenResult {
    #[serde(default)]
    pub access_token: Option<Secret<String>>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub callback_url: Option<String>,
}

/// A provider session for one user and optionally one site.
#[derive(Debug, Clone)]
pub struct WeeblyClient {
    http: reqwest::Client,
    endpoints: Endpoints,
    credentials: Credentials,
    user_id: Option<String>,
    site_id: Option<String>,
    access_token: Option<Secret<String>>,
}

impl WeeblyClient {
    pub fn new(http: reqwest::Client, endpoints: Endpoints, credentials: Credentials) -> Self {
        Self {
            http,
            endpoints,
            credentials,
            user_id: None,
            site_id: None,
            access_token: None,
        }
    }

    pub fn with_user(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn with_site(mut self, site_id: Option<String>) -> Self {
        self.site_id = site_id;
        self
    }

    pub fn with_access_token(mut self, access_token: Option<Secret<String>>) -> Self {
        self.access_token = access_token;
        self
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn site_id(&self) -> Option<&str> {
        self.site_id.as_deref()
    }

    /// URL to send the user to for the authorize step.
    ///
    /// `callback_url`, when given, replaces the default authorize endpoint.
    /// Parameters are appended in a fixed order: `client_id`, `user_id`,
    /// `site_id?`, `redirect_uri?`, `scope?` (comma-joined). Values are
    /// appended as given, without percent-encoding.
    pub fn authorization_url(
        &self,
        scopes: &[&str],
        redirect_uri: Option<&str>,
        callback_url: Option<&str>,
    ) -> String {
        let mut url = match callback_url {
            Some(callback_url) => callback_url.to_string(),
            None => self.endpoints.authorize_url(),
        };

        url.push_str("?client_id=");
        url.push_str(&self.credentials.client_id);
        url.push_str("&user_id=");
        url.push_str(self.user_id.as_deref().unwrap_or_default());

        if let Some(site_id) = &self.site_id {
            url.push_str("&site_id=");
            url.push_str(site_id);
        }
        if let Some(redirect_uri) = redirect_uri {
            url.push_str("&redirect_uri=");
            url.push_str(redirect_uri);
        }
        if !scopes.is_empty() {
            url.push_str("&scope=");
            url.push_str(&scopes.join(","));
        }
        url
    }

    /// Exchange an authorization code for an access token.
    ///
    /// POSTs `{client_id, client_secret, authorization_code}` as JSON to
    /// `callback_url` if given, else to the default token endpoint.
    #[instrument(skip_all, fields(user_id = ?self.user_id, site_id = ?self.site_id))]
    pub async fn exchange_code(
        &self,
        authorization_code: &str,
        callback_url: Option<&str>,
    ) -> Result<TokenResult> {
        let url = match callback_url {
            Some(callback_url) => callback_url.to_string(),
            None => self.endpoints.access_token_url(),
        };
        let params = serde_json::json!({
            "client_id": self.credentials.client_id,
            "client_secret": self.credentials.client_secret.expose(),
            "authorization_code": authorization_code,
        });
        self.send(ApiMethod::Post, &url, &params).await
    }

    /// Call the API at `path` relative to the API base.
    ///
    /// POST/PUT/PATCH send `params` as a JSON body. GET sends no body and
    /// does not encode `params` into the query string.
    pub async fn authenticated_request(
        &self,
        method: ApiMethod,
        path: &str,
        params: &serde_json::Value,
    ) -> Result<serde_json::Value> {
        let url = self.endpoints.api_url(path);
        self.send(method, &url, params).await
    }

    pub async fn get(&self, path: &str, params: &serde_json::Value) -> Result<serde_json::Value> {
        self.authenticated_request(ApiMethod::Get, path, params).await
    }

    pub async fn post(&self, path: &str, params: &serde_json::Value) -> Result<serde_json::Value> {
        self.authenticated_request(ApiMethod::Post, path, params).await
    }

    pub async fn put(&self, path: &str, params: &serde_json::Value) -> Result<serde_json::Value> {
        self.authenticated_request(ApiMethod::Put, path, params).await
    }

    pub async fn patch(&self, path: &str, params: &serde_json::Value) -> Result<serde_json::Value> {
        self.authenticated_request(ApiMethod::Patch, path, params).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: ApiMethod,
        url: &str,
        params: &serde_json::Value,
    ) -> Result<T> {
        let mut request = self.http.request(method.as_reqwest(), url);

        if method != ApiMethod::Get {
            let body = serde_json::to_vec(params)
                .map_err(|e| Error::Decode(format!("encoding request body: {e}")))?;
            request = request.body(body);
        }

        // Content type is only declared alongside a token
        if let Some(token) = &self.access_token {
            let value = HeaderValue::from_str(token.expose())
                .map_err(|e| Error::Http(format!("invalid access token header: {e}")))?;
            request = request
                .header(CONTENT_TYPE, "application/json")
                .header(ACCESS_TOKEN_HEADER, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Http(format!("{method:?} {url} failed: {e}")))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Http(format!("reading response body: {e}")))?;
        debug!(%status, bytes = body.len(), "provider responded");

        serde_json::from_slice(&body)
            .map_err(|e| Error::Decode(format!("invalid JSON from {url} ({status}): {e}")))
    }
}
