//! Proxy server configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use airdash_core::client::DEFAULT_BASE_URL;

/// Server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Listener settings.
    pub server: ServerConfig,
    /// Where requests are forwarded.
    pub upstream: UpstreamConfig,
    /// Static file serving.
    pub static_files: StaticFilesConfig,
}

impl Config {
    /// Load configuration from the default path, or defaults if it is absent.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = default_config_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Validate the configuration, collecting every problem found.
    ///
    /// # Example
    ///
    /// ```
    /// use airdash_service::Config;
    ///
    /// let config = Config::default();
    /// config.validate().expect("Default config should be valid");
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.server.validate());
        errors.extend(self.upstream.validate());
        errors.extend(self.static_files.validate());

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:3001").
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3001".to_string(),
        }
    }
}

impl ServerConfig {
    /// Validate listener configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.bind.is_empty() {
            errors.push(ValidationError::new(
                "server.bind",
                "bind address cannot be empty",
            ));
            return errors;
        }

        match self.bind.rsplit_once(':') {
            None => errors.push(ValidationError::new(
                "server.bind",
                format!(
                    "invalid bind address '{}': expected format 'host:port'",
                    self.bind
                ),
            )),
            Some((_, port)) => match port.parse::<u16>() {
                Ok(0) => errors.push(ValidationError::new("server.bind", "port cannot be 0")),
                Ok(_) => {}
                Err(_) => errors.push(ValidationError::new(
                    "server.bind",
                    format!("invalid port '{}': must be a number 1-65535", port),
                )),
            },
        }

        errors
    }
}

/// Minimum upstream timeout in seconds.
pub const MIN_TIMEOUT_SECS: u64 = 1;
/// Maximum upstream timeout in seconds.
pub const MAX_TIMEOUT_SECS: u64 = 300;

/// Upstream API configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the AirGradient API.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

impl UpstreamConfig {
    /// Validate upstream configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.base_url.is_empty() {
            errors.push(ValidationError::new(
                "upstream.base_url",
                "base URL cannot be empty",
            ));
        } else if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://"))
        {
            errors.push(ValidationError::new(
                "upstream.base_url",
                format!(
                    "invalid base URL '{}': must start with http:// or https://",
                    self.base_url
                ),
            ));
        }

        if !(MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS).contains(&self.timeout_secs) {
            errors.push(ValidationError::new(
                "upstream.timeout_secs",
                format!(
                    "timeout {} is out of range ({}-{} seconds)",
                    self.timeout_secs, MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS
                ),
            ));
        }

        errors
    }
}

/// Static file configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    /// Directory served for paths no route matches. Nothing is served if unset.
    pub dir: Option<PathBuf>,
}

impl StaticFilesConfig {
    /// Validate static file configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if let Some(dir) = &self.dir
            && dir.as_os_str().is_empty()
        {
            errors.push(ValidationError::new(
                "static_files.dir",
                "directory cannot be empty (omit it instead)",
            ));
        }
        errors
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// A single validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The field path (e.g., `server.bind`).
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("airdash")
        .join("server.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server.bind, "127.0.0.1:3001");
        assert_eq!(config.upstream.base_url, "https://api.airgradient.com");
        assert_eq!(config.upstream.timeout_secs, 10);
        assert!(config.static_files.dir.is_none());
    }

    #[test]
    fn test_config_load_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("server.toml");
        std::fs::write(
            &config_path,
            r#"
                [server]
                bind = "0.0.0.0:9090"

                [upstream]
                base_url = "http://localhost:8000"
                timeout_secs = 30

                [static_files]
                dir = "/srv/airdash"
            "#,
        )
        .unwrap();

        let loaded = Config::load(&config_path).unwrap();
        loaded.validate().unwrap();
        assert_eq!(loaded.server.bind, "0.0.0.0:9090");
        assert_eq!(loaded.upstream.base_url, "http://localhost:8000");
        assert_eq!(loaded.upstream.timeout_secs, 30);
        assert_eq!(loaded.static_files.dir, Some(PathBuf::from("/srv/airdash")));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml = r#"
            [upstream]
            timeout_secs = 5
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:3001");
        assert_eq!(config.upstream.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.upstream.timeout_secs, 5);
    }

    #[test]
    fn test_config_load_nonexistent() {
        let result = Config::load("/nonexistent/path/server.toml");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_config_load_invalid_toml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("invalid.toml");
        std::fs::write(&config_path, "this is not valid { toml").unwrap();

        let result = Config::load(&config_path);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_default_config_path() {
        assert!(default_config_path().ends_with("airdash/server.toml"));
    }

    #[test]
    fn test_server_bind_validation() {
        let ok = |bind: &str| {
            ServerConfig {
                bind: bind.to_string(),
            }
            .validate()
        };

        assert!(ok("127.0.0.1:3001").is_empty());
        assert!(ok("[::1]:3001").is_empty());
        assert!(ok("localhost:3001").is_empty());

        let errors = ok("");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("cannot be empty"));

        let errors = ok("127.0.0.1");
        assert!(errors[0].message.contains("host:port"));

        let errors = ok("127.0.0.1:0");
        assert!(errors[0].message.contains("cannot be 0"));

        let errors = ok("127.0.0.1:http");
        assert!(errors[0].message.contains("must be a number"));
    }

    #[test]
    fn test_upstream_validation() {
        let upstream = |base_url: &str, timeout_secs| UpstreamConfig {
            base_url: base_url.to_string(),
            timeout_secs,
        };

        assert!(upstream("https://api.airgradient.com", 10).validate().is_empty());
        assert!(upstream("http://127.0.0.1:8000", 1).validate().is_empty());
        assert!(upstream("http://127.0.0.1:8000", 300).validate().is_empty());

        let errors = upstream("ftp://example.com", 10).validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "upstream.base_url");

        let errors = upstream("", 0).validate();
        assert_eq!(errors.len(), 2);
        assert!(errors[1].message.contains("out of range"));

        assert_eq!(upstream("https://x", 301).validate().len(), 1);
    }

    #[test]
    fn test_validation_error_display() {
        let config = Config {
            server: ServerConfig {
                bind: "nope".to_string(),
            },
            upstream: UpstreamConfig {
                base_url: "https://api.airgradient.com".to_string(),
                timeout_secs: 0,
            },
            static_files: StaticFilesConfig {
                dir: Some(PathBuf::new()),
            },
        };

        let err = config.validate().unwrap_err();
        let ConfigError::Validation(errors) = &err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(errors.len(), 3);

        let display = err.to_string();
        assert!(display.contains("server.bind"));
        assert!(display.contains("upstream.timeout_secs"));
        assert!(display.contains("static_files.dir"));
    }
}
