//! Application credentials
//!
//! The client id and secret are issued to the application by Weebly and are
//! loaded once from the environment at startup. Nothing downstream mutates
//! them; handlers receive a shared reference.

use common::Secret;

use crate::constants::{CLIENT_ID_ENV, CLIENT_SECRET_ENV};

/// Application client id and secret.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: Secret<String>,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: Secret::new(client_secret.into()),
        }
    }

    /// Load credentials from `WEEBLY_CLIENT_ID` and `WEEBLY_SECRET_KEY`.
    ///
    /// Both must be set and non-empty.
    pub fn from_env() -> common::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> common::Result<Self> {
        let required = |key: &str| {
            lookup(key).filter(|v| !v.is_empty()).ok_or_else(|| {
                common::Error::Config(format!("environment variable {key} is not set"))
            })
        };
        let client_id = required(CLIENT_ID_ENV)?;
        let client_secret = required(CLIENT_SECRET_ENV)?;
        Ok(Self::new(client_id, client_secret))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn loads_both_variables() {
        let creds = Credentials::from_lookup(lookup(&[
            (CLIENT_ID_ENV, "app-123"),
            (CLIENT_SECRET_ENV, "s3cret"),
        ]))
        .unwrap();
        assert_eq!(creds.client_id, "app-123");
        assert_eq!(creds.client_secret.expose(), "s3cret");
    }

    #[test]
    fn missing_client_id_is_config_error() {
        let err = Credentials::from_lookup(lookup(&[(CLIENT_SECRET_ENV, "s3cret")])).unwrap_err();
        assert!(matches!(err, common::Error::Config(_)));
        assert!(err.to_string().contains(CLIENT_ID_ENV), "got: {err}");
    }

    #[test]
    fn empty_secret_is_config_error() {
        let err = Credentials::from_lookup(lookup(&[
            (CLIENT_ID_ENV, "app-123"),
            (CLIENT_SECRET_ENV, ""),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains(CLIENT_SECRET_ENV), "got: {err}");
    }

    #[test]
    fn debug_never_prints_secret() {
        let creds = Credentials::new("app-123", "s3cret");
        let debug = format!("{creds:?}");
        assert!(debug.contains("app-123"));
        assert!(!debug.contains("s3cret"), "secret leaked: {debug}");
    }
}
