//! Configuration types for the Quanda service.
//!
//! Covers the knobs the pipeline consumes: which generative model to
//! call, how long to wait for it, which response shape the deployment
//! speaks, and the listen port. The API credential is deliberately not
//! config-file material; it is read from the environment once at
//! startup by the binary.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// The default config file name.
const CONFIG_FILE_NAME: &str = "quanda.json";

/// Default generative model identifier.
fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

/// Default timeout for a single generative call, in seconds.
const fn default_generation_timeout() -> u64 {
    30
}

/// Default HTTP listen port.
const fn default_port() -> u16 {
    5000
}

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file exists but could not be read or parsed.
    #[error("Invalid config file '{path}': {message}\n\nSuggestion: Validate your quanda.json with a JSON linter")]
    Parse {
        /// Path to the configuration file.
        path: String,
        /// Description of the parse error.
        message: String,
    },

    /// Configuration values failed validation.
    #[error("Invalid configuration: {message}\n\nSuggestion: {suggestion}")]
    Validation {
        /// Description of the validation failure.
        message: String,
        /// Actionable suggestion for the user.
        suggestion: String,
    },
}

impl ConfigError {
    /// Creates a new `Parse` error.
    #[must_use]
    pub fn parse(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `Validation` error.
    #[must_use]
    pub fn validation(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }
}

/// Which response shape the deployment speaks.
///
/// Exactly one is active per deployment; the two shapes are historical
/// variants of the same endpoint and are never mixed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AnswerFormat {
    /// Sanitized HTML fragment under `answer_html` (default, authoritative).
    #[default]
    Html,
    /// Raw answer text under `answer` (legacy/degraded mode).
    Text,
}

impl AnswerFormat {
    /// Parses a string into an `AnswerFormat`, case-insensitively.
    fn from_str_case_insensitive(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "html" => Some(Self::Html),
            "text" => Some(Self::Text),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for AnswerFormat {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str_case_insensitive(&s).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "invalid answer format '{s}': expected 'html' or 'text'"
            ))
        })
    }
}

impl Serialize for AnswerFormat {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let s = match self {
            Self::Html => "html",
            Self::Text => "text",
        };
        serializer.serialize_str(s)
    }
}

/// Main configuration for the Quanda service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    /// Generative model identifier passed to the backend.
    #[serde(default = "default_model")]
    pub model: String,

    /// Response shape for successful answers.
    #[serde(default)]
    pub answer_format: AnswerFormat,

    /// Timeout for a single generative call, in seconds.
    #[serde(default = "default_generation_timeout")]
    pub generation_timeout_secs: u64,

    /// HTTP listen port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            answer_format: AnswerFormat::default(),
            generation_timeout_secs: default_generation_timeout(),
            port: default_port(),
        }
    }
}

impl ServiceConfig {
    /// Loads configuration from the current working directory.
    ///
    /// Looks for `quanda.json`; missing file means defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let current_dir = std::env::current_dir().map_err(|e| {
            ConfigError::parse(
                "<current directory>",
                format!("cannot determine current directory: {e}"),
            )
        })?;
        Self::load_from_dir(&current_dir)
    }

    /// Loads configuration from a specific directory.
    ///
    /// # Errors
    ///
    /// Returns an error if `quanda.json` exists there but is invalid.
    pub fn load_from_dir(dir: &Path) -> Result<Self, ConfigError> {
        Self::load_from_file(&dir.join(CONFIG_FILE_NAME))
    }

    /// Loads configuration from a specific file path.
    ///
    /// A missing file yields validated defaults; an unreadable or
    /// malformed file is an error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for read/parse failures and
    /// [`ConfigError::Validation`] for invalid values.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.validate()?;
                return Ok(config);
            }
            Err(e) => {
                return Err(ConfigError::parse(
                    path.display().to_string(),
                    format!("failed to read file: {e}"),
                ));
            }
        };

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError::parse(path.display().to_string(), e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if the model is empty or the
    /// generation timeout is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::validation(
                "model must not be empty",
                "Set model to a generative model id in your quanda.json",
            ));
        }

        if self.generation_timeout_secs == 0 {
            return Err(ConfigError::validation(
                "generationTimeoutSecs must be greater than 0",
                "Set generationTimeoutSecs to at least 1 second in your quanda.json",
            ));
        }

        Ok(())
    }
}
