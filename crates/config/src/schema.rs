use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_port() -> u16 {
    8018
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_perms() -> String {
    "delete".to_string()
}
fn default_timeout_secs() -> u64 {
    12
}

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Listen port (defaults to 8018).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Listen address (defaults to `127.0.0.1`).
    #[serde(default = "default_host")]
    pub host: String,
    /// Backend API key issued for this application.
    #[serde(default)]
    pub api_key: String,
    /// Shared secret used to sign backend requests.
    #[serde(default)]
    pub shared_secret: String,
    /// Permission level to request during authorization
    /// ("read", "write" or "delete"; defaults to "delete").
    #[serde(default = "default_perms")]
    pub perms: String,
    /// Path of the persisted token record
    /// (defaults to `~/.remilk/token.json`).
    #[serde(default)]
    pub token_path: Option<PathBuf>,
    /// Outbound backend request timeout in seconds (defaults to 12).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            api_key: String::new(),
            shared_secret: String::new(),
            perms: default_perms(),
            token_path: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Parses configuration from a YAML string, merged with defaults and
    /// `REMILK_` environment variables.
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if the YAML is invalid or extraction fails.
    #[allow(clippy::result_large_err)]
    pub fn from_yaml(yaml: &str) -> Result<Self, figment::Error> {
        use figment::{
            Figment,
            providers::{Env, Format as _, Serialized, Yaml},
        };
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Yaml::string(yaml))
            .merge(Env::prefixed("REMILK_"))
            .extract()
    }

    /// Loads configuration from a file path, merged with defaults and
    /// `REMILK_` environment variables.
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if the file cannot be read or parsed.
    #[allow(clippy::result_large_err)]
    pub fn from_file(path: &std::path::Path) -> Result<Self, figment::Error> {
        use figment::{
            Figment,
            providers::{Env, Format as _, Serialized, Yaml},
        };
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed("REMILK_"))
            .extract()
    }

    /// Resolve the token record path, falling back to `~/.remilk/token.json`.
    ///
    /// # Errors
    ///
    /// Returns an error string if no path is configured and `HOME` is unset.
    pub fn resolved_token_path(&self) -> Result<PathBuf, String> {
        if let Some(path) = &self.token_path {
            return Ok(path.clone());
        }
        std::env::var("HOME")
            .map(|home| PathBuf::from(home).join(".remilk").join("token.json"))
            .map_err(|_| "token_path not set and HOME is unset".to_string())
    }

    /// Serve-time validation: the backend credentials must be present.
    ///
    /// # Errors
    ///
    /// Returns a message naming the missing field.
    pub fn validate(&self) -> Result<(), String> {
        if self.api_key.trim().is_empty() {
            return Err("api_key must be set".to_string());
        }
        if self.shared_secret.trim().is_empty() {
            return Err("shared_secret must be set".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_YAML: &str = r#"
port: 9000
host: "0.0.0.0"
api_key: "key123"
shared_secret: "sec456"
perms: "write"
timeout_secs: 5
"#;

    #[test]
    fn test_default_config() {
        let c = Config::default();
        assert_eq!(c.port, 8018);
        assert_eq!(c.host, "127.0.0.1");
        assert_eq!(c.perms, "delete");
        assert_eq!(c.timeout_secs, 12);
        assert!(c.api_key.is_empty());
    }

    #[test]
    fn test_from_yaml_overrides() {
        let c = Config::from_yaml(SAMPLE_YAML).unwrap();
        assert_eq!(c.port, 9000);
        assert_eq!(c.host, "0.0.0.0");
        assert_eq!(c.api_key, "key123");
        assert_eq!(c.shared_secret, "sec456");
        assert_eq!(c.perms, "write");
        assert_eq!(c.timeout_secs, 5);
    }

    #[test]
    fn test_validate_missing_api_key() {
        let c = Config::default();
        let err = c.validate().unwrap_err();
        assert!(err.contains("api_key"));
    }

    #[test]
    fn test_validate_missing_secret() {
        let c = Config {
            api_key: "key".into(),
            ..Config::default()
        };
        let err = c.validate().unwrap_err();
        assert!(err.contains("shared_secret"));
    }

    #[test]
    fn test_validate_ok() {
        let c = Config::from_yaml(SAMPLE_YAML).unwrap();
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_explicit_token_path_wins() {
        let c = Config {
            token_path: Some(PathBuf::from("/tmp/tok.json")),
            ..Config::default()
        };
        assert_eq!(
            c.resolved_token_path().unwrap(),
            PathBuf::from("/tmp/tok.json")
        );
    }
}
