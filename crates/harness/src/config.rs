//! Harness configuration

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use microcheck_model::SCHEMA_VERSION;
use microcheck_quant::RoundingMode;

use crate::error::{HarnessError, Result};

/// What to do after the first vector outside tolerance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    /// Stop at the first failing vector
    #[default]
    FailFast,
    /// Run every vector, then report
    CollectAll,
}

impl FromStr for RunMode {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail-fast" => Ok(RunMode::FailFast),
            "collect-all" => Ok(RunMode::CollectAll),
            other => Err(HarnessError::InvalidConfig(format!(
                "unknown run mode: {}",
                other
            ))),
        }
    }
}

/// Harness configuration
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Bytes of the caller's buffer lent to the engine
    pub arena_size: usize,

    /// Schema version the model must declare
    pub required_schema_version: u32,

    /// Largest accepted |reference - prediction|
    pub tolerance: f32,

    /// Fail-fast or collect-all
    pub mode: RunMode,

    /// Rounding used when quantizing inputs
    pub rounding: RoundingMode,

    /// Invoke each vector twice and require identical outputs
    pub check_determinism: bool,

    /// Print the final report as JSON
    pub report_json: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            arena_size: 3000,
            required_schema_version: SCHEMA_VERSION,
            tolerance: 0.05,
            mode: RunMode::FailFast,
            rounding: RoundingMode::NearestTiesAway,
            check_determinism: false,
            report_json: false,
        }
    }
}

impl HarnessConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from `MICROCHECK_*` values supplied by `lookup`.
    /// Missing or unparseable values keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(size) = lookup("MICROCHECK_ARENA_SIZE") {
            if let Ok(s) = size.trim().parse() {
                config.arena_size = s;
            }
        }

        if let Some(version) = lookup("MICROCHECK_SCHEMA_VERSION") {
            if let Ok(v) = version.trim().parse() {
                config.required_schema_version = v;
            }
        }

        if let Some(tolerance) = lookup("MICROCHECK_TOLERANCE") {
            if let Ok(t) = tolerance.trim().parse() {
                config.tolerance = t;
            }
        }

        if let Some(mode) = lookup("MICROCHECK_MODE") {
            if let Ok(m) = mode.parse() {
                config.mode = m;
            }
        }

        if let Some(rounding) = lookup("MICROCHECK_ROUNDING") {
            if let Ok(r) = rounding.parse() {
                config.rounding = r;
            }
        }

        if let Some(flag) = lookup("MICROCHECK_CHECK_DETERMINISM") {
            config.check_determinism = parse_flag(&flag);
        }

        if let Some(flag) = lookup("MICROCHECK_REPORT_JSON") {
            config.report_json = parse_flag(&flag);
        }

        config
    }

    /// Reject settings no run could succeed with
    pub fn validate(&self) -> Result<()> {
        if self.arena_size == 0 {
            return Err(HarnessError::InvalidConfig("arena size must be > 0".into()));
        }
        self.run_options().validate()
    }

    /// Options for an acceptance run
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            tolerance: self.tolerance,
            mode: self.mode,
            rounding: self.rounding,
            check_determinism: self.check_determinism,
        }
    }
}

/// Per-run settings of an acceptance test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunOptions {
    pub tolerance: f32,
    pub mode: RunMode,
    pub rounding: RoundingMode,
    pub check_determinism: bool,
}

impl RunOptions {
    /// Default options with the given tolerance
    pub fn with_tolerance(tolerance: f32) -> Self {
        Self {
            tolerance,
            ..HarnessConfig::default().run_options()
        }
    }

    pub fn collect_all(mut self) -> Self {
        self.mode = RunMode::CollectAll;
        self
    }

    pub fn deterministic(mut self) -> Self {
        self.check_determinism = true;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(HarnessError::InvalidConfig(format!(
                "tolerance must be finite and >= 0, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        HarnessConfig::default().run_options()
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HarnessConfig::default();
        assert_eq!(config.arena_size, 3000);
        assert_eq!(config.required_schema_version, 3);
        assert_eq!(config.tolerance, 0.05);
        assert_eq!(config.mode, RunMode::FailFast);
        assert_eq!(config.rounding, RoundingMode::NearestTiesAway);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_tolerance() {
        for tolerance in [-0.1, f32::NAN, f32::INFINITY] {
            let config = HarnessConfig {
                tolerance,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(HarnessError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn test_validate_rejects_empty_arena() {
        let config = HarnessConfig {
            arena_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_run_mode_parse() {
        assert_eq!("collect-all".parse::<RunMode>().unwrap(), RunMode::CollectAll);
        assert_eq!("FAIL-FAST".parse::<RunMode>().unwrap(), RunMode::FailFast);
        assert!("sometimes".parse::<RunMode>().is_err());
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("1"));
        assert!(parse_flag(" True "));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("nope"));
    }

    #[test]
    fn test_from_lookup_overrides() {
        let vars = [
            ("MICROCHECK_ARENA_SIZE", "4096"),
            ("MICROCHECK_MODE", "collect-all"),
            ("MICROCHECK_ROUNDING", "toward-zero"),
            ("MICROCHECK_CHECK_DETERMINISM", "1"),
            ("MICROCHECK_TOLERANCE", "abc"),
            ("MICROCHECK_SCHEMA_VERSION", "-1"),
        ];
        let config = HarnessConfig::from_lookup(|key| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        });

        assert_eq!(config.arena_size, 4096);
        assert_eq!(config.mode, RunMode::CollectAll);
        assert_eq!(config.rounding, RoundingMode::TowardZero);
        assert!(config.check_determinism);
        // Unparseable values keep their defaults
        assert_eq!(config.tolerance, 0.05);
        assert_eq!(config.required_schema_version, 3);
        assert!(!config.report_json);
    }

    #[test]
    fn test_from_env() {
        std::env::set_var("MICROCHECK_ARENA_SIZE", "8192");
        std::env::set_var("MICROCHECK_TOLERANCE", "not-a-number");
        std::env::set_var("MICROCHECK_REPORT_JSON", "true");
        let config = HarnessConfig::from_env();
        std::env::remove_var("MICROCHECK_ARENA_SIZE");
        std::env::remove_var("MICROCHECK_TOLERANCE");
        std::env::remove_var("MICROCHECK_REPORT_JSON");

        assert_eq!(config.arena_size, 8192);
        assert_eq!(config.tolerance, 0.05);
        assert!(config.report_json);
    }

    #[test]
    fn test_run_options_builders() {
        let options = RunOptions::with_tolerance(0.1).collect_all().deterministic();
        assert_eq!(options.tolerance, 0.1);
        assert_eq!(options.mode, RunMode::CollectAll);
        assert!(options.check_determinism);
    }
}
