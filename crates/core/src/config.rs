use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::comparator::ProviderPriority;
use crate::domain::quote::ProviderId;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub comparison: ComparisonConfig,
    pub booking: BookingConfig,
    pub providers: ProvidersConfig,
    pub semantic: SemanticConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct ComparisonConfig {
    /// Hard deadline for one quote-gathering round across all providers.
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct BookingConfig {
    /// Deadline for the single booking call on the winning provider.
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ProvidersConfig {
    /// Ordered provider set. Position doubles as the price tie-break
    /// priority, so the order here is part of the selection semantics.
    pub enabled: Vec<String>,
    /// Enables trajectory capture in the automation backend. Has no
    /// effect on comparison or booking logic.
    pub debug_mode: bool,
}

#[derive(Clone, Debug)]
pub struct SemanticConfig {
    /// Whether the semantic-parser fallback may be consulted when pattern
    /// matching finds neither destination nor ride type.
    pub enabled: bool,
    pub api_key: Option<SecretString>,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub providers: Option<Vec<String>>,
    pub debug_mode: Option<bool>,
    pub log_level: Option<String>,
    pub semantic_api_key: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            comparison: ComparisonConfig { timeout_secs: 180 },
            booking: BookingConfig { timeout_secs: 300 },
            providers: ProvidersConfig {
                enabled: vec!["uber".to_string(), "ola".to_string(), "rapido".to_string()],
                debug_mode: false,
            },
            semantic: SemanticConfig {
                enabled: false,
                api_key: None,
                model: "gemini-2.0-flash".to_string(),
                timeout_secs: 30,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("cabby.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn comparison_timeout(&self) -> Duration {
        Duration::from_secs(self.comparison.timeout_secs)
    }

    pub fn booking_timeout(&self) -> Duration {
        Duration::from_secs(self.booking.timeout_secs)
    }

    /// Tie-break order for the comparator, derived from the configured
    /// provider set.
    pub fn provider_priority(&self) -> ProviderPriority {
        ProviderPriority::new(self.providers.enabled.iter().map(ProviderId::new).collect())
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(comparison) = patch.comparison {
            if let Some(timeout_secs) = comparison.timeout_secs {
                self.comparison.timeout_secs = timeout_secs;
            }
        }

        if let Some(booking) = patch.booking {
            if let Some(timeout_secs) = booking.timeout_secs {
                self.booking.timeout_secs = timeout_secs;
            }
        }

        if let Some(providers) = patch.providers {
            if let Some(enabled) = providers.enabled {
                self.providers.enabled = enabled;
            }
            if let Some(debug_mode) = providers.debug_mode {
                self.providers.debug_mode = debug_mode;
            }
        }

        if let Some(semantic) = patch.semantic {
            if let Some(enabled) = semantic.enabled {
                self.semantic.enabled = enabled;
            }
            if let Some(api_key) = semantic.api_key {
                self.semantic.api_key = Some(api_key.into());
            }
            if let Some(model) = semantic.model {
                self.semantic.model = model;
            }
            if let Some(timeout_secs) = semantic.timeout_secs {
                self.semantic.timeout_secs = timeout_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("CABBY_COMPARISON_TIMEOUT_SECS") {
            self.comparison.timeout_secs = parse_u64("CABBY_COMPARISON_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("CABBY_BOOKING_TIMEOUT_SECS") {
            self.booking.timeout_secs = parse_u64("CABBY_BOOKING_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("CABBY_PROVIDERS") {
            self.providers.enabled =
                value.split(',').map(|entry| entry.trim().to_string()).collect();
        }
        if let Some(value) = read_env("CABBY_DEBUG_MODE") {
            self.providers.debug_mode = parse_bool("CABBY_DEBUG_MODE", &value)?;
        }

        if let Some(value) = read_env("CABBY_SEMANTIC_ENABLED") {
            self.semantic.enabled = parse_bool("CABBY_SEMANTIC_ENABLED", &value)?;
        }
        if let Some(value) = read_env("CABBY_SEMANTIC_API_KEY") {
            self.semantic.api_key = Some(value.into());
        }
        if let Some(value) = read_env("CABBY_SEMANTIC_MODEL") {
            self.semantic.model = value;
        }
        if let Some(value) = read_env("CABBY_SEMANTIC_TIMEOUT_SECS") {
            self.semantic.timeout_secs = parse_u64("CABBY_SEMANTIC_TIMEOUT_SECS", &value)?;
        }

        let log_level = read_env("CABBY_LOGGING_LEVEL").or_else(|| read_env("CABBY_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format = read_env("CABBY_LOGGING_FORMAT").or_else(|| read_env("CABBY_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(providers) = overrides.providers {
            self.providers.enabled = providers;
        }
        if let Some(debug_mode) = overrides.debug_mode {
            self.providers.debug_mode = debug_mode;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(api_key) = overrides.semantic_api_key {
            self.semantic.api_key = Some(api_key.into());
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_timeout("comparison.timeout_secs", self.comparison.timeout_secs)?;
        validate_timeout("booking.timeout_secs", self.booking.timeout_secs)?;
        validate_providers(&self.providers)?;
        validate_semantic(&self.semantic)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("cabby.toml"), PathBuf::from("config/cabby.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_timeout(key: &str, value: u64) -> Result<(), ConfigError> {
    if value == 0 || value > 600 {
        return Err(ConfigError::Validation(format!("{key} must be in range 1..=600")));
    }
    Ok(())
}

fn validate_providers(providers: &ProvidersConfig) -> Result<(), ConfigError> {
    if providers.enabled.is_empty() {
        return Err(ConfigError::Validation(
            "providers.enabled must list at least one provider".to_string(),
        ));
    }

    let mut seen = Vec::new();
    for entry in &providers.enabled {
        let normalized = entry.trim().to_ascii_lowercase();
        if normalized.is_empty() || !normalized.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ConfigError::Validation(format!(
                "providers.enabled entry `{entry}` must be a lowercase alphanumeric identifier"
            )));
        }
        if seen.contains(&normalized) {
            return Err(ConfigError::Validation(format!(
                "providers.enabled lists `{normalized}` more than once"
            )));
        }
        seen.push(normalized);
    }

    Ok(())
}

fn validate_semantic(semantic: &SemanticConfig) -> Result<(), ConfigError> {
    if semantic.timeout_secs == 0 || semantic.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "semantic.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if semantic.enabled {
        let missing = semantic
            .api_key
            .as_ref()
            .map(|value| value.expose_secret().trim().is_empty())
            .unwrap_or(true);
        if missing {
            return Err(ConfigError::Validation(
                "semantic.api_key is required when semantic.enabled is true".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    comparison: Option<ComparisonPatch>,
    booking: Option<BookingPatch>,
    providers: Option<ProvidersPatch>,
    semantic: Option<SemanticPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ComparisonPatch {
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct BookingPatch {
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ProvidersPatch {
    enabled: Option<Vec<String>>,
    debug_mode: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct SemanticPatch {
    enabled: Option<bool>,
    api_key: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
