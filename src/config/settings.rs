use crate::core::error::ConfigError;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

/// All knobs the client reads at startup.
///
/// Loaded from an optional `config/default` file plus `CHAT_*` environment
/// variables (a `.env` file is honored by main before this runs). Required:
/// `api_key`, `model`, `temperature`, `max_tokens`. Optional memory
/// features stay off until configured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    #[serde(default)]
    pub window_pair_capacity: Option<usize>,
    #[serde(default)]
    pub token_ceiling: Option<usize>,
    #[serde(default)]
    pub debug_mode: bool,
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Raw view before required-key checks: everything optional, so a missing
/// key can be reported by name instead of as a serde error.
#[derive(Debug, Deserialize)]
struct RawSettings {
    api_key: Option<String>,
    model: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    #[serde(default)]
    window_pair_capacity: Option<usize>,
    #[serde(default)]
    token_ceiling: Option<usize>,
    #[serde(default)]
    debug_mode: Option<bool>,
    #[serde(default)]
    base_url: Option<String>,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(Environment::with_prefix("CHAT").try_parsing(true))
            .build()
            .map_err(load_error)?;

        let raw: RawSettings = config.try_deserialize().map_err(load_error)?;

        let settings = Settings {
            api_key: raw.api_key.ok_or_else(|| {
                ConfigError::missing(
                    "CHAT_API_KEY",
                    "Add CHAT_API_KEY=your-key-here to your .env file",
                )
            })?,
            model: raw.model.ok_or_else(|| {
                ConfigError::missing("CHAT_MODEL", "Add CHAT_MODEL=gpt-4o-mini to your .env file")
            })?,
            temperature: raw.temperature.ok_or_else(|| {
                ConfigError::missing(
                    "CHAT_TEMPERATURE",
                    "Add CHAT_TEMPERATURE=0.7 to your .env file",
                )
            })?,
            max_tokens: raw.max_tokens.ok_or_else(|| {
                ConfigError::missing(
                    "CHAT_MAX_TOKENS",
                    "Add CHAT_MAX_TOKENS=1000 to your .env file",
                )
            })?,
            window_pair_capacity: raw.window_pair_capacity,
            token_ceiling: raw.token_ceiling,
            debug_mode: raw.debug_mode.unwrap_or(false),
            base_url: raw.base_url,
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Domain checks for every setting. Any failure is fatal and names the
    /// offending key with a remediation hint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::missing(
                "CHAT_API_KEY",
                "Add CHAT_API_KEY=your-key-here to your .env file",
            ));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::missing(
                "CHAT_MODEL",
                "Add CHAT_MODEL=gpt-4o-mini to your .env file",
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::invalid(
                "CHAT_TEMPERATURE",
                self.temperature,
                "must be between 0.0 and 2.0",
            ));
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::invalid(
                "CHAT_MAX_TOKENS",
                self.max_tokens,
                "must be a positive integer",
            ));
        }
        if self.window_pair_capacity == Some(0) {
            return Err(ConfigError::invalid(
                "CHAT_WINDOW_PAIR_CAPACITY",
                0,
                "must be a positive integer (unset it to disable the window)",
            ));
        }
        if self.token_ceiling == Some(0) {
            return Err(ConfigError::invalid(
                "CHAT_TOKEN_CEILING",
                0,
                "must be a positive integer (unset it to disable alerts)",
            ));
        }
        if let Some(url) = &self.base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::invalid(
                    "CHAT_BASE_URL",
                    url,
                    "must start with http:// or https://",
                ));
            }
        }
        Ok(())
    }
}

fn load_error(e: config::ConfigError) -> ConfigError {
    // Type mismatches from env parsing land here (e.g. a non-numeric
    // CHAT_TEMPERATURE); the config crate's message names the field.
    ConfigError::invalid(
        "CHAT configuration",
        e,
        "check the value types (numbers must be numeric, booleans true/false)",
    )
}
