//! Configuration module for odbridge.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.
//!
//! Access tokens are never part of the file; `auth.token_env` names the
//! environment variable they are read from.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::ConflictPolicy;

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for odbridge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: ProviderConfig,
    pub auth: AuthConfig,
    pub upload: UploadConfig,
    pub logging: LoggingConfig,
}

/// How items are addressed in backend requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressingMode {
    /// Requests use `/items/{id}`; caller paths carry identifiers.
    #[default]
    Id,
    /// Requests use `/root:/drive/path:`; caller paths are drive paths.
    Path,
}

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Drive endpoint, e.g. `https://api.onedrive.com/v1.0/drive`.
    pub base_url: String,
    /// Identifier of the folder exposed as the virtual root.
    pub root_folder_id: String,
    /// Drive path prefix applied under path addressing.
    pub root_path: Option<String>,
    pub addressing: AddressingMode,
    /// `top` value for delta queries; only one page is ever read.
    pub delta_page_size: u32,
}

/// Authentication settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Environment variable holding the bearer token.
    pub token_env: String,
}

/// Upload behaviour.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Policy used when the caller does not pick one.
    pub default_conflict: ConflictPolicy,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

// ---------------------------------------------------------------------------
// Config::load()
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/odbridge/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("odbridge")
            .join("config.yaml")
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Default OneDrive drive endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.onedrive.com/v1.0/drive";

/// Default environment variable for the bearer token.
pub const DEFAULT_TOKEN_ENV: &str = "ODBRIDGE_ACCESS_TOKEN";

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            root_folder_id: "root".to_string(),
            root_path: None,
            addressing: AddressingMode::Id,
            delta_page_size: 250,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_env: DEFAULT_TOKEN_ENV.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"provider.base_url"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Valid values for `upload.default_conflict`.
const VALID_CONFLICT_POLICIES: &[&str] = &["replace", "rename", "warn"];

/// Upper bound the backend accepts for `top` on delta queries.
const MAX_DELTA_PAGE_SIZE: u32 = 1000;

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- provider ---
        match url::Url::parse(&self.provider.base_url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            Ok(parsed) => errors.push(ValidationError {
                field: "provider.base_url".into(),
                message: format!("unsupported scheme '{}'", parsed.scheme()),
            }),
            Err(e) => errors.push(ValidationError {
                field: "provider.base_url".into(),
                message: format!("not a valid URL: {e}"),
            }),
        }
        if self.provider.base_url.ends_with('/') {
            errors.push(ValidationError {
                field: "provider.base_url".into(),
                message: "must not end with '/'".into(),
            });
        }
        if let Err(e) = crate::domain::RemoteId::new(self.provider.root_folder_id.clone()) {
            errors.push(ValidationError {
                field: "provider.root_folder_id".into(),
                message: e.to_string(),
            });
        }
        if let Some(root_path) = &self.provider.root_path {
            if root_path.split('/').any(|s| s == "." || s == "..") {
                errors.push(ValidationError {
                    field: "provider.root_path".into(),
                    message: "must not contain '.' or '..' segments".into(),
                });
            }
            if self.provider.addressing == AddressingMode::Id {
                errors.push(ValidationError {
                    field: "provider.root_path".into(),
                    message: "only applies when addressing is 'path'".into(),
                });
            }
        }
        if self.provider.delta_page_size == 0 || self.provider.delta_page_size > MAX_DELTA_PAGE_SIZE
        {
            errors.push(ValidationError {
                field: "provider.delta_page_size".into(),
                message: format!("must be in range 1..={MAX_DELTA_PAGE_SIZE}"),
            });
        }

        // --- auth ---
        if self.auth.token_env.trim().is_empty() {
            errors.push(ValidationError {
                field: "auth.token_env".into(),
                message: "must not be empty".into(),
            });
        }

        // --- upload ---
        if !VALID_CONFLICT_POLICIES.contains(&self.upload.default_conflict.as_str()) {
            errors.push(ValidationError {
                field: "upload.default_conflict".into(),
                message: format!(
                    "invalid policy '{}'; valid options: {}",
                    self.upload.default_conflict,
                    VALID_CONFLICT_POLICIES.join(", ")
                ),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use odbridge_core::config::{AddressingMode, ConfigBuilder};
///
/// let config = ConfigBuilder::new()
///     .provider_addressing(AddressingMode::Path)
///     .provider_root_path("Apps/odbridge")
///     .logging_level("debug")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- provider ---

    pub fn provider_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.provider.base_url = url.into();
        self
    }

    pub fn provider_root_folder_id(mut self, id: impl Into<String>) -> Self {
        self.config.provider.root_folder_id = id.into();
        self
    }

    pub fn provider_root_path(mut self, path: impl Into<String>) -> Self {
        self.config.provider.root_path = Some(path.into());
        self
    }

    pub fn provider_addressing(mut self, mode: AddressingMode) -> Self {
        self.config.provider.addressing = mode;
        self
    }

    pub fn provider_delta_page_size(mut self, n: u32) -> Self {
        self.config.provider.delta_page_size = n;
        self
    }

    // --- auth ---

    pub fn auth_token_env(mut self, name: impl Into<String>) -> Self {
        self.config.auth.token_env = name.into();
        self
    }

    // --- upload ---

    pub fn upload_default_conflict(mut self, policy: ConflictPolicy) -> Self {
        self.config.upload.default_conflict = policy;
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn logging_json(mut self, json: bool) -> Self {
        self.config.logging.json = json;
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
