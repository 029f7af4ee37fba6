//! Configuration file and environment overrides.
//!
//! Settings come from built-in defaults, then an optional YAML file, then
//! `GCADAPTER_*` environment variables.

use std::path::Path;

use gcadapter_ffb::INFINITE;
use gcadapter_hid_wup028_protocol::{PRODUCT_ID, VENDOR_ID};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CliError;

pub const VENDOR_ID_ENV: &str = "GCADAPTER_VENDOR_ID";
pub const PRODUCT_ID_ENV: &str = "GCADAPTER_PRODUCT_ID";
pub const READ_TIMEOUT_ENV: &str = "GCADAPTER_READ_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub vendor_id: u16,
    pub product_id: u16,
    /// Read timeout per report while monitoring.
    pub read_timeout_ms: u32,
    /// Effect timer tick while a rumble effect plays.
    pub timer_tick_ms: u32,
    /// Default duration of one rumble iteration.
    pub rumble_duration_ms: u32,
    /// How long `rumble` waits for the controller to show up.
    pub connect_timeout_ms: u32,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            vendor_id: VENDOR_ID,
            product_id: PRODUCT_ID,
            read_timeout_ms: 16,
            timer_tick_ms: 4,
            rumble_duration_ms: 500,
            connect_timeout_ms: 3000,
        }
    }
}

impl CliConfig {
    /// Loads defaults, the file at `path` if given, and the process
    /// environment.
    pub fn load(path: Option<&Path>) -> Result<Self, CliError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, CliError> {
        let text = std::fs::read_to_string(path)?;
        let config: CliConfig = serde_yaml::from_str(&text)?;
        debug!(path = %path.display(), "loaded configuration file");
        Ok(config)
    }

    /// Applies overrides found through `lookup`.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), CliError> {
        if let Some(value) = lookup(VENDOR_ID_ENV) {
            self.vendor_id = parse_u16(VENDOR_ID_ENV, &value)?;
        }
        if let Some(value) = lookup(PRODUCT_ID_ENV) {
            self.product_id = parse_u16(PRODUCT_ID_ENV, &value)?;
        }
        if let Some(value) = lookup(READ_TIMEOUT_ENV) {
            self.read_timeout_ms = parse_u32(READ_TIMEOUT_ENV, &value)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), CliError> {
        let positive = [
            ("read_timeout_ms", self.read_timeout_ms),
            ("timer_tick_ms", self.timer_tick_ms),
            ("rumble_duration_ms", self.rumble_duration_ms),
            ("connect_timeout_ms", self.connect_timeout_ms),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(CliError::InvalidConfiguration(format!(
                    "{name} must be greater than zero"
                )));
            }
        }
        if effect_duration_us(self.rumble_duration_ms).is_none() {
            return Err(CliError::InvalidConfiguration(format!(
                "rumble_duration_ms must be below {} ms",
                INFINITE / 1000 + 1
            )));
        }
        if i32::try_from(self.read_timeout_ms).is_err() {
            return Err(CliError::InvalidConfiguration(
                "read_timeout_ms is too large".to_string(),
            ));
        }
        Ok(())
    }

    pub fn read_timeout(&self) -> i32 {
        i32::try_from(self.read_timeout_ms).unwrap_or(i32::MAX)
    }
}

/// Effect duration in microseconds for `duration_ms`, or `None` when it
/// does not fit below [`INFINITE`].
pub fn effect_duration_us(duration_ms: u32) -> Option<u32> {
    duration_ms
        .checked_mul(1000)
        .filter(|&us| us < INFINITE)
}

/// Parses `0x`-prefixed hex or decimal.
pub fn parse_u16(name: &str, value: &str) -> Result<u16, CliError> {
    let value = value.trim();
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.map_err(|e| CliError::InvalidConfiguration(format!("{name}={value:?}: {e}")))
}

fn parse_u32(name: &str, value: &str) -> Result<u32, CliError> {
    let value = value.trim();
    value
        .parse()
        .map_err(|e| CliError::InvalidConfiguration(format!("{name}={value:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_target_the_wup028() -> TestResult {
        let config = CliConfig::default();
        assert_eq!(config.vendor_id, 0x057E);
        assert_eq!(config.product_id, 0x0337);
        config.validate()?;
        Ok(())
    }

    #[test]
    fn env_overrides_accept_hex_and_decimal() -> TestResult {
        let mut config = CliConfig::default();
        config.apply_env(env(&[
            (VENDOR_ID_ENV, "0x1234"),
            (PRODUCT_ID_ENV, "4660"),
            (READ_TIMEOUT_ENV, " 8 "),
        ]))?;
        assert_eq!(config.vendor_id, 0x1234);
        assert_eq!(config.product_id, 0x1234);
        assert_eq!(config.read_timeout_ms, 8);
        Ok(())
    }

    #[test]
    fn bad_env_value_is_rejected() {
        let mut config = CliConfig::default();
        let result = config.apply_env(env(&[(VENDOR_ID_ENV, "0xZZ")]));
        assert!(matches!(result, Err(CliError::InvalidConfiguration(_))));
    }

    #[test]
    fn zero_timeouts_fail_validation() {
        let config = CliConfig {
            timer_tick_ms: 0,
            ..CliConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CliError::InvalidConfiguration(msg)) if msg.contains("timer_tick_ms")
        ));
    }

    #[test]
    fn rumble_duration_must_stay_finite() -> TestResult {
        assert_eq!(effect_duration_us(500), Some(500_000));
        assert_eq!(effect_duration_us(4_294_967), Some(4_294_967_000));
        assert_eq!(effect_duration_us(4_294_968), None);
        assert_eq!(effect_duration_us(u32::MAX), None);

        let config = CliConfig {
            rumble_duration_ms: 4_294_968,
            ..CliConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CliError::InvalidConfiguration(msg)) if msg.contains("rumble_duration_ms")
        ));

        let config = CliConfig {
            rumble_duration_ms: 4_294_967,
            ..CliConfig::default()
        };
        config.validate()?;
        Ok(())
    }

    #[test]
    fn yaml_fills_missing_fields_with_defaults() -> TestResult {
        let config: CliConfig = serde_yaml::from_str("read_timeout_ms: 32\nvendor_id: 1150\n")?;
        assert_eq!(config.read_timeout_ms, 32);
        assert_eq!(config.vendor_id, 1150);
        assert_eq!(config.rumble_duration_ms, 500);
        Ok(())
    }
}
