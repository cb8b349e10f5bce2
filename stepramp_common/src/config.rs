//! Configuration loading traits and types.
//!
//! Every stepramp binary reads a single TOML file. The types here give
//! those files a common `[shared]` table and a common error type.
//!
//! # Usage
//!
//! ```rust,no_run
//! use stepramp_common::config::{ConfigError, ConfigLoader, SharedConfig};
//! use serde::Deserialize;
//! use std::path::Path;
//!
//! #[derive(Debug, Deserialize)]
//! struct RunnerFile {
//!     shared: SharedConfig,
//! }
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = RunnerFile::load(Path::new("runner.toml"))?;
//!     println!("Service: {}", config.shared.service_name);
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Error type for configuration loading operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// File could not be read or TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, detailed tracing information.
    Trace,
    /// Debug information useful during development.
    Debug,
    /// General information about application operation.
    #[default]
    Info,
    /// Warning messages for potentially problematic situations.
    Warn,
    /// Error messages for serious problems.
    Error,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    pub const fn as_directive(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Common configuration fields shared across all stepramp applications.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "stepramp-bench-axis"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Application instance identifier.
    pub service_name: String,
}

impl SharedConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `service_name` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Trait for loading configuration from TOML.
///
/// Blanket-implemented for every `serde::de::DeserializeOwned` type.
///
/// # Contract
///
/// - `ConfigError::FileNotFound` if the file does not exist
/// - `ConfigError::ParseError` if the file is unreadable or TOML is invalid
///
/// Semantic validation is left to the caller.
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound(path.display().to_string())
            } else {
                ConfigError::ParseError(format!("{}: {e}", path.display()))
            }
        })?;
        debug!(path = %path.display(), bytes = content.len(), "config file read");
        Self::load_str(&content)
    }

    /// Parse configuration from an in-memory TOML document.
    fn load_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct LevelWrapper {
        level: LogLevel,
    }

    const ALL_LEVELS: [(LogLevel, &str); 5] = [
        (LogLevel::Trace, "trace"),
        (LogLevel::Debug, "debug"),
        (LogLevel::Info, "info"),
        (LogLevel::Warn, "warn"),
        (LogLevel::Error, "error"),
    ];

    #[test]
    fn log_level_default_is_info() {
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }

    #[test]
    fn log_level_serializes_lowercase() {
        for (level, name) in ALL_LEVELS {
            let text = toml::to_string(&LevelWrapper { level }).unwrap();
            assert!(text.contains(name), "{text} does not contain {name}");
        }
    }

    #[test]
    fn log_level_deserializes_lowercase() {
        for (level, name) in ALL_LEVELS {
            let parsed: LevelWrapper = toml::from_str(&format!("level = \"{name}\"")).unwrap();
            assert_eq!(parsed.level, level);
        }
    }

    #[test]
    fn log_level_directive_matches_serde_name() {
        for (level, name) in ALL_LEVELS {
            assert_eq!(level.as_directive(), name);
        }
    }

    #[test]
    fn shared_config_rejects_blank_service_name() {
        let config = SharedConfig {
            log_level: LogLevel::Info,
            service_name: "   ".to_string(),
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn shared_config_accepts_named_service() {
        let config = SharedConfig {
            log_level: LogLevel::Warn,
            service_name: "axis-x".to_string(),
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn loader_reports_missing_file() {
        #[allow(dead_code)]
        #[derive(Debug, Deserialize)]
        struct Probe {
            value: u32,
        }

        let result = Probe::load(Path::new("/nonexistent/stepramp/runner.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(p)) if p.contains("runner.toml")));
    }

    #[test]
    fn loader_reports_parse_error() {
        #[allow(dead_code)]
        #[derive(Debug, Deserialize)]
        struct Probe {
            value: u32,
        }

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "value = [unterminated").unwrap();

        assert!(matches!(Probe::load(file.path()), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn loader_reads_shared_table() {
        #[derive(Debug, Deserialize)]
        struct Probe {
            shared: SharedConfig,
            ticks: u64,
        }

        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"ticks = 500

[shared]
service_name = "axis-y"
"#
        )
        .unwrap();
        file.flush().unwrap();

        let probe = Probe::load(file.path()).unwrap();
        assert_eq!(probe.ticks, 500);
        assert_eq!(probe.shared.service_name, "axis-y");
        assert_eq!(probe.shared.log_level, LogLevel::Info);
    }
}
