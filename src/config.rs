//! Gate and logging configuration, loadable from TOML.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::GateError;
use crate::hashcash::{DateFormat, MAX_DIFFICULTY};
use crate::logging::LogFormat;

/// Puzzle parameters for issued challenges and the policy applied to submitted solutions.
#[derive(Builder, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[builder(pattern = "owned")]
#[serde(default)]
pub struct GateConfig {
    /// Required leading zero bits, `1..=64`.
    #[builder(default = "20")]
    pub difficulty: u32,
    #[builder(default = "8")]
    pub salt_length: usize,
    #[builder(default = "DateFormat::Yymmdd")]
    pub date_format: DateFormat,
    /// Reject solutions whose difficulty is below `difficulty` or whose resource
    /// is not the requester's. When off, any fresh solved stamp redeems an
    /// outstanding key.
    #[builder(default = "true")]
    pub enforce_binding: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            difficulty: 20,
            salt_length: 8,
            date_format: DateFormat::Yymmdd,
            enforce_binding: true,
        }
    }
}

impl GateConfig {
    pub fn validate(&self) -> Result<(), GateError> {
        if self.difficulty == 0 || self.difficulty > MAX_DIFFICULTY {
            return Err(GateError::InvalidConfig(format!(
                "difficulty must be in 1..={MAX_DIFFICULTY}"
            )));
        }
        if self.salt_length == 0 {
            return Err(GateError::InvalidConfig(
                "salt_length must be >= 1".into(),
            ));
        }
        Ok(())
    }
}

impl GateConfigBuilder {
    pub fn build_validated(self) -> Result<GateConfig, GateError> {
        let cfg = self
            .build()
            .map_err(|e| GateError::InvalidConfig(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, overridden by `RUST_LOG` when set.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "debug".into(),
            format: LogFormat::Human,
        }
    }
}

/// Top-level configuration with `[gate]` and `[logging]` tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gate: GateConfig,
    pub logging: LoggingConfig,
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self, GateError> {
        let cfg: Config = toml::from_str(s).map_err(|e| GateError::InvalidConfig(e.to_string()))?;
        cfg.gate.validate()?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_builder_defaults() {
        let built = GateConfigBuilder::default().build_validated().unwrap();
        assert_eq!(built, GateConfig::default());
        assert_eq!(built.difficulty, 20);
        assert_eq!(built.salt_length, 8);
        assert_eq!(built.date_format, DateFormat::Yymmdd);
        assert!(built.enforce_binding);
    }

    #[test]
    fn builder_rejects_invalid_values() {
        let err = GateConfigBuilder::default()
            .difficulty(0)
            .build_validated()
            .unwrap_err();
        assert!(matches!(err, GateError::InvalidConfig(_)));
        let err = GateConfigBuilder::default()
            .difficulty(65)
            .build_validated()
            .unwrap_err();
        assert!(matches!(err, GateError::InvalidConfig(_)));
        let err = GateConfigBuilder::default()
            .salt_length(0)
            .build_validated()
            .unwrap_err();
        assert!(matches!(err, GateError::InvalidConfig(_)));
    }

    #[test]
    fn parses_toml_with_partial_tables() {
        let cfg = Config::from_toml_str(
            r#"
            [gate]
            difficulty = 12
            date_format = "yymmddhhmm"

            [logging]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.gate.difficulty, 12);
        assert_eq!(cfg.gate.salt_length, 8);
        assert_eq!(cfg.gate.date_format, DateFormat::Yymmddhhmm);
        assert_eq!(cfg.logging.format, LogFormat::Json);
        assert_eq!(cfg.logging.level, "debug");
    }

    #[test]
    fn empty_toml_gives_defaults() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn toml_is_validated() {
        let err = Config::from_toml_str("[gate]\ndifficulty = 0\n").unwrap_err();
        assert!(matches!(err, GateError::InvalidConfig(_)));
        let err = Config::from_toml_str("[gate]\ndate_format = \"weekly\"\n").unwrap_err();
        assert!(matches!(err, GateError::InvalidConfig(_)));
    }
}
