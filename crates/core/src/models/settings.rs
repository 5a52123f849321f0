use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::errors::CoreError;

/// Default lifetime of a cached bulk price fetch (five minutes).
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Largest TTL a `chrono::Duration` can hold.
pub const MAX_CACHE_TTL_SECS: u64 = (i64::MAX / 1_000) as u64;

/// Environment variable consulted for the Alpha Vantage key when the
/// settings file does not provide one.
pub const ALPHAVANTAGE_KEY_ENV: &str = "ALPHAVANTAGE_API_KEY";

/// User-configurable settings for a dashboard session.
///
/// Every field has a default, so a settings file only needs the keys it
/// wants to override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Title shown above every page.
    pub page_title: String,

    /// Use wide table columns.
    pub wide_layout: bool,

    /// Optional path to a custom stylesheet. Cosmetic only.
    pub stylesheet: Option<String>,

    /// Currency label used when formatting money columns (e.g., "USD", "INR").
    pub currency: String,

    /// How long a bulk price fetch stays cached, in seconds.
    pub cache_ttl_secs: u64,

    /// Optional API keys for providers that require them.
    /// Keys: provider name (e.g., "alphavantage").
    /// Values: the API key string.
    pub api_keys: HashMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            page_title: "Portfolio Dashboard".to_string(),
            wide_layout: true,
            stylesheet: None,
            currency: "USD".to_string(),
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            api_keys: HashMap::new(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file. Missing keys fall back to defaults.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| CoreError::Config(format!("Cannot read {}: {e}", path.display())))?;
        let settings: Settings = serde_json::from_str(&content)
            .map_err(|e| CoreError::Config(format!("Invalid settings in {}: {e}", path.display())))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Fill in API keys from the environment where the file left them unset.
    pub fn with_env_overrides(mut self) -> Self {
        if !self.api_keys.contains_key("alphavantage") {
            if let Ok(key) = std::env::var(ALPHAVANTAGE_KEY_ENV) {
                if !key.trim().is_empty() {
                    self.api_keys.insert("alphavantage".to_string(), key);
                }
            }
        }
        self
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.cache_ttl_secs == 0 {
            return Err(CoreError::Config(
                "cache_ttl_secs must be greater than zero".into(),
            ));
        }
        if self.cache_ttl_secs > MAX_CACHE_TTL_SECS {
            return Err(CoreError::Config(format!(
                "cache_ttl_secs must be at most {MAX_CACHE_TTL_SECS}"
            )));
        }
        if self.currency.trim().is_empty() {
            return Err(CoreError::Config("currency must not be empty".into()));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> chrono::Duration {
        // Clamped so unvalidated settings never overflow the duration.
        chrono::Duration::seconds(self.cache_ttl_secs.min(MAX_CACHE_TTL_SECS) as i64)
    }
}
