mod schema;

pub use schema::*;

use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    content.parse()
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}

impl Config {
    /// Reject values that cannot describe any schedule
    ///
    /// Zero and negative rates are fine, they turn limiting off.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let LimiterConfig::Rate { rate, .. } = self.limiter {
            if !rate.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "limiter.rate must be finite, got {rate}"
                )));
            }
        }
        Ok(())
    }
}
