//! Configuration types and loading
//!
//! Config precedence: CLI `--config` > `CONFIG_PATH` env var > built-in
//! defaults. The TOML file only carries deployment settings; the Weebly
//! client id and secret come from the environment (see
//! `weebly_auth::Credentials::from_env`) and are never read from the file.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use weebly_auth::{Endpoints, WEEBLY_API_DOMAIN, WEEBLY_DOMAIN};

/// Root configuration
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub weebly: WeeblyConfig,
    pub log: LogConfig,
    pub metrics: MetricsConfig,
}

/// Public HTTP listener settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    /// Host used in the phase-two redirect URI. Falls back to the request's
    /// `Host` header when unset.
    pub public_host: Option<String>,
    pub max_connections: usize,
}

/// Provider endpoints and outbound call limits
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WeeblyConfig {
    pub domain: String,
    pub api_domain: String,
    pub timeout_secs: u64,
}

/// Message log location
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub path: PathBuf,
}

/// Optional Prometheus listener, separate from the public routes
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub listen_addr: Option<SocketAddr>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            public_host: None,
            max_connections: 1000,
        }
    }
}

impl Default for WeeblyConfig {
    fn default() -> Self {
        Self {
            domain: WEEBLY_DOMAIN.to_string(),
            api_domain: WEEBLY_API_DOMAIN.to_string(),
            timeout_secs: weebly_auth::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("messages/messages.txt"),
        }
    }
}

impl WeeblyConfig {
    pub fn endpoints(&self) -> Endpoints {
        Endpoints {
            domain: self.domain.clone(),
            api_domain: self.api_domain.clone(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from a TOML file, or use defaults when no path is given.
    pub fn load(path: Option<&Path>) -> common::Result<Self> {
        let config = match path {
            Some(path) => {
                let contents = std::fs::read_to_string(path)?;
                toml::from_str(&contents)?
            }
            None => Config::default(),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> common::Result<()> {
        for (field, value) in [
            ("weebly.domain", &self.weebly.domain),
            ("weebly.api_domain", &self.weebly.api_domain),
        ] {
            if !value.starts_with("http://") && !value.starts_with("https://") {
                return Err(common::Error::Config(format!(
                    "{field} must start with http:// or https://, got: {value}"
                )));
            }
        }

        if self.weebly.timeout_secs == 0 {
            return Err(common::Error::Config(
                "weebly.timeout_secs must be greater than 0".into(),
            ));
        }

        if self.server.max_connections == 0 {
            return Err(common::Error::Config(
                "server.max_connections must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> Option<PathBuf> {
        if let Some(p) = cli_path {
            return Some(PathBuf::from(p));
        }
        std::env::var("CONFIG_PATH").ok().map(PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mutex to serialize tests that mutate environment variables, preventing
    /// data races when tests run in parallel.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// SAFETY: Callers must hold ENV_MUTEX to prevent concurrent env mutation.
    unsafe fn set_env(key: &str, val: &str) {
        unsafe { std::env::set_var(key, val) };
    }

    unsafe fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) };
    }

    fn write_config(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_defaults_without_file() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.server.listen_addr.port(), 8080);
        assert_eq!(config.server.max_connections, 1000);
        assert!(config.server.public_host.is_none());
        assert_eq!(config.weebly.domain, "https://www.weebly.com");
        assert_eq!(config.weebly.api_domain, "https://api.weebly.com/v1");
        assert_eq!(config.weebly.timeout(), Duration::from_secs(30));
        assert_eq!(config.log.path, PathBuf::from("messages/messages.txt"));
        assert!(config.metrics.listen_addr.is_none());
    }

    #[test]
    fn test_load_full_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
[server]
listen_addr = "127.0.0.1:9000"
public_host = "hooks.example.com"
max_connections = 50

[weebly]
domain = "http://localhost:4000"
api_domain = "http://localhost:4001/v1"
timeout_secs = 5

[log]
path = "/var/lib/webhook-client/messages.txt"

[metrics]
listen_addr = "127.0.0.1:9090"
"#,
        );

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.server.listen_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(config.server.public_host.as_deref(), Some("hooks.example.com"));
        assert_eq!(config.server.max_connections, 50);
        assert_eq!(config.weebly.endpoints().domain, "http://localhost:4000");
        assert_eq!(config.weebly.timeout_secs, 5);
        assert_eq!(
            config.log.path,
            PathBuf::from("/var/lib/webhook-client/messages.txt")
        );
        assert_eq!(
            config.metrics.listen_addr.unwrap().to_string(),
            "127.0.0.1:9090"
        );
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "[log]\npath = \"log.txt\"\n");

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.log.path, PathBuf::from("log.txt"));
        assert_eq!(config.weebly.timeout_secs, 30);
        assert_eq!(config.server.max_connections, 1000);
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load(Some(Path::new("/nonexistent/path/config.toml")));
        assert!(matches!(result, Err(common::Error::Io(_))));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "not valid {{{{ toml");
        let result = Config::load(Some(&path));
        assert!(matches!(result, Err(common::Error::Toml(_))));
    }

    #[test]
    fn test_invalid_domain_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "[weebly]\ndomain = \"www.weebly.com\"\n");

        let err = Config::load(Some(&path)).unwrap_err().to_string();
        assert!(
            err.contains("weebly.domain must start with http"),
            "error message should explain the issue, got: {err}"
        );
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "[weebly]\ntimeout_secs = 0\n");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_zero_max_connections_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "[server]\nmax_connections = 0\n");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_resolve_path_cli_arg() {
        let path = Config::resolve_path(Some("/custom/path.toml"));
        assert_eq!(path, Some(PathBuf::from("/custom/path.toml")));
    }

    #[test]
    fn test_resolve_path_env_var() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { set_env("CONFIG_PATH", "/env/path.toml") };
        let path = Config::resolve_path(None);
        assert_eq!(path, Some(PathBuf::from("/env/path.toml")));
        unsafe { remove_env("CONFIG_PATH") };
    }

    #[test]
    fn test_resolve_path_none_uses_defaults() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { remove_env("CONFIG_PATH") };
        assert_eq!(Config::resolve_path(None), None);
    }

    #[test]
    fn test_resolve_path_cli_overrides_env() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { set_env("CONFIG_PATH", "/env/should-lose.toml") };
        let path = Config::resolve_path(Some("/cli/wins.toml"));
        assert_eq!(
            path,
            Some(PathBuf::from("/cli/wins.toml")),
            "CLI arg must take precedence over CONFIG_PATH env var"
        );
        unsafe { remove_env("CONFIG_PATH") };
    }
}
