//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `geckoctl.toml` in the working directory unless a path is given.
//! Every field has a sensible default so the file is optional. Environment
//! variables take precedence over file values.

use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use gecko_adapter_http::HttpBackendConfig;

const DEFAULT_PATH: &str = "geckoctl.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which rig backend to drive.
    pub backend: BackendConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Safety interlocks.
    pub safety: SafetyConfig,
}

/// Rig backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// The rig's executor, reached over HTTP.
    #[default]
    Http,
    /// In-memory simulated rig.
    Virtual,
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "virtual" => Ok(Self::Virtual),
            other => Err(ConfigError::Validation(format!(
                "unknown backend kind {other:?}, expected \"http\" or \"virtual\""
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub kind: BackendKind,
    /// Base URL of the rig's executor.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    /// Refuse runs until the rig reported a completed motor check.
    pub require_motor_check: bool,
}

impl Config {
    /// Load configuration from `path`, or `geckoctl.toml` when none is given,
    /// then apply environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is malformed, if an explicitly given file
    /// is missing, or if the result fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path, false)?,
            None => Self::from_file(Path::new(DEFAULT_PATH), true)?,
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path, optional: bool) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if optional && err.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(val) = lookup("GECKO_BACKEND") {
            self.backend.kind = val.parse()?;
        }
        if let Some(val) = lookup("GECKO_BACKEND_URL") {
            self.backend.base_url = val;
        }
        if let Some(val) = lookup("GECKO_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.backend.timeout_secs = secs;
            }
        }
        if let Some(val) = lookup("GECKO_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "backend timeout must be non-zero".to_string(),
            ));
        }
        if let Err(err) = url::Url::parse(&self.backend.base_url) {
            return Err(ConfigError::Validation(format!(
                "backend base_url {:?} is not a valid URL: {err}",
                self.backend.base_url
            )));
        }
        Ok(())
    }

    /// Settings for the HTTP backend adapter.
    #[must_use]
    pub fn http_backend(&self) -> HttpBackendConfig {
        HttpBackendConfig {
            base_url: self.backend.base_url.clone(),
            timeout_secs: self.backend.timeout_secs,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        let http = HttpBackendConfig::default();
        Self {
            kind: BackendKind::default(),
            base_url: http.base_url,
            timeout_secs: http.timeout_secs,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "geckoctl=info,gecko=info".to_string(),
        }
    }
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            require_motor_check: true,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
