use std::time::Duration;

use serde::Deserialize;

mod validation;

pub use validation::{ConfigValidationError, is_well_formed_pattern};

pub const DEFAULT_CONFIG_FILE_PATH: &str = "~/.config/timebox/config.toml";

/// Identifier of the element the clock writes into.
pub const DEFAULT_TARGET_ID: &str = "time-box";

/// Delay between two timed renders.
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 100;

/// Short weekday, short month, day, 12-hour time with seconds and meridiem,
/// e.g. `Fri, Mar 15, 1:04:05 PM`.
pub const US_ENGLISH_FORMAT: &str = "%a, %b %-d, %-I:%M:%S %p";

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ClockModuleConfig {
    #[serde(default = "default_target_id")]
    pub target_id: String,
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
    #[serde(default = "default_format")]
    pub format: String,
}

impl ClockModuleConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}

impl Default for ClockModuleConfig {
    fn default() -> Self {
        Self {
            target_id: default_target_id(),
            refresh_interval_ms: default_refresh_interval_ms(),
            format: default_format(),
        }
    }
}

fn default_target_id() -> String {
    DEFAULT_TARGET_ID.to_owned()
}

fn default_refresh_interval_ms() -> u64 {
    DEFAULT_REFRESH_INTERVAL_MS
}

fn default_format() -> String {
    US_ENGLISH_FORMAT.to_owned()
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub clock: ClockModuleConfig,
}

fn default_log_level() -> String {
    "warn".to_owned()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            clock: ClockModuleConfig::default(),
        }
    }
}
