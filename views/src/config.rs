use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("request_ms cannot be 0")]
    InvalidTimeout,

    #[error("slow_request_ms must be >= request_ms")]
    SlowTimeoutBelowRequest,
}

/// BFF configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Listener for incoming frontend requests
    pub listener: Listener,
    /// Base URLs of the upstream services
    pub upstreams: Upstreams,
    /// Per-call timeout budget
    #[serde(default)]
    pub timeouts: Timeouts,
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.listener.validate()?;
        self.timeouts.validate()?;
        Ok(())
    }
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    /// Host address to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

impl Listener {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        Ok(())
    }
}

/// Upstream base URLs
///
/// Note: Uses the `url::Url` type for compile-time URL validation.
/// Invalid URLs will be rejected during config deserialization.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Upstreams {
    pub stock_info: Url,
    /// Typically the same service as `stock_info`, kept separate so the
    /// history and indicator planes can be split out later.
    pub historical_data: Url,
    pub indicators: Url,
    pub catalog_python: Url,
    pub catalog_node: Url,
    pub catalog_rust: Url,
}

/// Per-call timeout budget, in milliseconds.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Timeouts {
    /// Applied to every ordinary upstream call.
    #[serde(default = "Timeouts::default_request_ms")]
    pub request_ms: u64,
    /// Applied to known-slow mutations (full stock refresh).
    #[serde(default = "Timeouts::default_slow_request_ms")]
    pub slow_request_ms: u64,
}

impl Timeouts {
    const fn default_request_ms() -> u64 {
        10_000
    }

    const fn default_slow_request_ms() -> u64 {
        30_000
    }

    pub fn request(&self) -> Duration {
        Duration::from_millis(self.request_ms)
    }

    pub fn slow_request(&self) -> Duration {
        Duration::from_millis(self.slow_request_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_ms == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        if self.slow_request_ms < self.request_ms {
            return Err(ConfigError::SlowTimeoutBelowRequest);
        }
        Ok(())
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Timeouts {
            request_ms: Self::default_request_ms(),
            slow_request_ms: Self::default_slow_request_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const VALID_YAML: &str = r#"
listener:
    host: "0.0.0.0"
    port: 4000
upstreams:
    stock_info: "http://127.0.0.1:8000"
    historical_data: "http://127.0.0.1:8000"
    indicators: "http://127.0.0.1:8000"
    catalog_python: "http://127.0.0.1:8001"
    catalog_node: "http://127.0.0.1:8002"
    catalog_rust: "http://127.0.0.1:8003"
timeouts:
    request_ms: 5000
    slow_request_ms: 20000
"#;

    #[test]
    fn test_parse_valid_config() {
        let config: Config = serde_yaml::from_str(VALID_YAML).unwrap();
        assert!(config.validate().is_ok());

        assert_eq!(config.listener.port, 4000);
        assert_eq!(config.upstreams.stock_info.as_str(), "http://127.0.0.1:8000/");
        assert_eq!(config.timeouts.request(), Duration::from_millis(5000));
    }

    #[test]
    fn test_timeouts_default_when_omitted() {
        let yaml = r#"
listener: {host: "0.0.0.0", port: 4000}
upstreams:
    stock_info: "http://127.0.0.1:8000"
    historical_data: "http://127.0.0.1:8000"
    indicators: "http://127.0.0.1:8000"
    catalog_python: "http://127.0.0.1:8001"
    catalog_node: "http://127.0.0.1:8002"
    catalog_rust: "http://127.0.0.1:8003"
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.timeouts, Timeouts::default());
        assert!(config.timeouts.slow_request() > config.timeouts.request());
    }

    #[test]
    fn test_validation_errors() {
        let base: Config = serde_yaml::from_str(VALID_YAML).unwrap();

        let mut config = base.clone();
        config.listener.port = 0;
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::InvalidPort
        ));

        let mut config = base.clone();
        config.timeouts.request_ms = 0;
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::InvalidTimeout
        ));

        let mut config = base;
        config.timeouts.slow_request_ms = config.timeouts.request_ms - 1;
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::SlowTimeoutBelowRequest
        ));
    }

    #[test]
    fn test_deserialization_errors() {
        // Invalid URL
        assert!(
            serde_yaml::from_str::<Config>(
                r#"
listener: {host: "0.0.0.0", port: 4000}
upstreams:
    stock_info: "not-a-url"
    historical_data: "http://127.0.0.1:8000"
    indicators: "http://127.0.0.1:8000"
    catalog_python: "http://127.0.0.1:8001"
    catalog_node: "http://127.0.0.1:8002"
    catalog_rust: "http://127.0.0.1:8003"
"#
            )
            .is_err()
        );

        // Missing required upstream
        assert!(
            serde_yaml::from_str::<Config>(
                r#"
listener: {host: "0.0.0.0", port: 4000}
upstreams:
    stock_info: "http://127.0.0.1:8000"
"#
            )
            .is_err()
        );
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(VALID_YAML.as_bytes()).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.listener.port, 4000);

        assert!(matches!(
            Config::from_file("/nonexistent/config.yaml").unwrap_err(),
            ConfigError::Io(_)
        ));
    }
}
