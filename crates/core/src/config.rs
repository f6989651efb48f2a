use crate::constants::{
    DEFAULT_ARTIFACT_DIR, DEFAULT_FEEDBACK_PATH, DEFAULT_HTTP_PORT, DEFAULT_MAX_BODY_SIZE,
};
use crate::Error;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration for revtag.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RevtagConfig {
    /// HTTP server configuration.
    pub http: HttpConfig,

    /// Feedback log configuration.
    pub storage: StorageConfig,

    /// Model artifact configuration.
    pub model: ModelConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Host to bind to.
    pub host: String,

    /// Port to bind to.
    pub port: u16,

    /// Enable CORS.
    pub enable_cors: bool,

    /// Allowed CORS origins. Empty means any origin.
    pub cors_allowed_origins: Vec<String>,

    /// Request timeout in seconds (0 disables the timeout).
    pub request_timeout: u64,

    /// Enable request logging.
    pub enable_request_logging: bool,

    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

/// Feedback log configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path of the CSV feedback log.
    pub feedback_path: PathBuf,
}

/// Model artifact configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory holding `vectorizer.json`, `classifier.json` and `labels.json`.
    pub artifact_dir: PathBuf,

    /// Optional JSON lexicon (`{"word": polarity}`) merged over the built-in one.
    pub lexicon_path: Option<PathBuf>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level.
    pub level: LogLevel,

    /// Log format.
    pub format: LogFormat,
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Error level.
    Error,

    /// Warning level.
    Warn,

    /// Info level.
    Info,

    /// Debug level.
    Debug,

    /// Trace level.
    Trace,
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON format.
    Json,

    /// Text format.
    Text,

    /// Pretty format.
    Pretty,
}

impl RevtagConfig {
    /// Default location of the user configuration file.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("revtag").join("config.toml"))
    }

    /// Load configuration from file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        toml::from_str(&content).map_err(|e| Error::Parse(format!("Failed to parse config: {}", e)))
    }

    /// Load from `path` when given, else from the default location if it exists,
    /// else fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => Self::load(&path),
                None => Ok(Self::default()),
            },
        }
    }

    /// Save configuration to file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Parse(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content).map_err(|e| {
            Error::config(format!(
                "Failed to write config file {}: {}",
                path.display(),
                e
            ))
        })
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_HTTP_PORT,
            enable_cors: true,
            cors_allowed_origins: Vec::new(),
            request_timeout: 30,
            enable_request_logging: true,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            feedback_path: PathBuf::from(DEFAULT_FEEDBACK_PATH),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            artifact_dir: PathBuf::from(DEFAULT_ARTIFACT_DIR),
            lexicon_path: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: RevtagConfig = toml::from_str(
            r#"
            [http]
            port = 8088

            [logging]
            level = "debug"
            "#,
        )
        .expect("config should parse");

        assert_eq!(config.http.port, 8088);
        assert_eq!(config.http.host, "127.0.0.1");
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.format, LogFormat::Text);
        assert_eq!(config.storage.feedback_path, PathBuf::from("data/reviews.csv"));
        assert!(config.model.lexicon_path.is_none());
    }

    #[test]
    fn save_and_load_round_trip() -> Result<()> {
        let path = std::env::temp_dir()
            .join(format!("revtag_config_{}", std::process::id()))
            .join("config.toml");
        let mut config = RevtagConfig::default();
        config.http.port = 9100;
        config.model.lexicon_path = Some(PathBuf::from("lexicon.json"));
        config.save(&path)?;

        let loaded = RevtagConfig::load(&path)?;
        assert_eq!(loaded.http.port, 9100);
        assert_eq!(loaded.model.lexicon_path, Some(PathBuf::from("lexicon.json")));
        Ok(())
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let missing = std::env::temp_dir().join("revtag_definitely_missing.toml");
        assert!(matches!(
            RevtagConfig::load_or_default(Some(&missing)),
            Err(Error::Config(_))
        ));
    }
}
