use serde::{Deserialize, Serialize};

use dadcade_games::{ArcadeConfig, ConfigError};

use crate::entitlement::UsageLimits;

/// App-wide settings. Missing JSON fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub arcade: ArcadeConfig,
    pub limits: UsageLimits,
    /// Premium upgrade price.
    pub price_cents: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            arcade: ArcadeConfig::default(),
            limits: UsageLimits::default(),
            price_cents: 999,
        }
    }
}

impl AppConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.arcade.validate()?;
        if config.price_cents == 0 {
            return Err(ConfigError::Invalid("upgrade price must be positive".into()));
        }
        Ok(config)
    }
}
