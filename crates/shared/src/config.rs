//! Application configuration management.

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::types::Currency;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Matching configuration.
    #[serde(default)]
    pub matching: MatchingConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Default tolerances and currency used by a match run.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchingConfig {
    /// Allowed quantity deviation, in percent.
    #[serde(default = "default_quantity_tolerance")]
    pub quantity_tolerance: Decimal,
    /// Allowed unit price deviation, in percent.
    #[serde(default = "default_price_tolerance")]
    pub price_tolerance: Decimal,
    /// Currency assumed when a purchase order does not name one.
    #[serde(default)]
    pub currency: Currency,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            quantity_tolerance: default_quantity_tolerance(),
            price_tolerance: default_price_tolerance(),
            currency: Currency::default(),
        }
    }
}

fn default_quantity_tolerance() -> Decimal {
    Decimal::from(5)
}

fn default_price_tolerance() -> Decimal {
    Decimal::from(2)
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON log lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl AppConfig {
    /// Loads configuration from `config/` and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(Path::new("config"))
    }

    /// Loads configuration from `{dir}/default`, then `{dir}/{RUN_MODE}`,
    /// then `MATCHBOOK__*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a present file or variable cannot be parsed.
    pub fn load_from(dir: &Path) -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::from(dir.join("default")).required(false))
            .add_source(config::File::from(dir.join(&run_mode)).required(false))
            .add_source(config::Environment::with_prefix("MATCHBOOK").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn missing_dir() -> &'static Path {
        Path::new("does-not-exist")
    }

    #[test]
    fn test_defaults_without_sources() {
        let config = temp_env::with_vars_unset(
            [
                "RUN_MODE",
                "MATCHBOOK__MATCHING__QUANTITY_TOLERANCE",
                "MATCHBOOK__MATCHING__PRICE_TOLERANCE",
                "MATCHBOOK__MATCHING__CURRENCY",
                "MATCHBOOK__LOGGING__JSON",
            ],
            || AppConfig::load_from(missing_dir()),
        )
        .unwrap();

        assert_eq!(config.matching.quantity_tolerance, dec!(5));
        assert_eq!(config.matching.price_tolerance, dec!(2));
        assert_eq!(config.matching.currency, Currency::Usd);
        assert!(!config.logging.json);
    }

    #[test]
    fn test_environment_overrides() {
        let config = temp_env::with_vars(
            [
                ("MATCHBOOK__MATCHING__PRICE_TOLERANCE", Some("3.5")),
                ("MATCHBOOK__MATCHING__CURRENCY", Some("EUR")),
                ("MATCHBOOK__LOGGING__JSON", Some("true")),
            ],
            || AppConfig::load_from(missing_dir()),
        )
        .unwrap();

        assert_eq!(config.matching.price_tolerance, dec!(3.5));
        assert_eq!(config.matching.currency, Currency::Eur);
        assert!(config.logging.json);
    }

    #[test]
    fn test_invalid_tolerance_is_rejected() {
        let result = temp_env::with_var(
            "MATCHBOOK__MATCHING__QUANTITY_TOLERANCE",
            Some("five"),
            || AppConfig::load_from(missing_dir()),
        );

        assert!(result.is_err());
    }
}
