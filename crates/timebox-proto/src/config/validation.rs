use chrono::format::{Item, StrftimeItems};

use super::Config;

/// Errors returned when validating a [`Config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// The clock target identifier is empty or whitespace.
    EmptyTargetId,

    /// The refresh interval is zero, which would spin the timer.
    ZeroInterval,

    /// The clock format is not a usable strftime pattern.
    InvalidFormat { pattern: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTargetId => write!(f, "clock target_id must not be empty"),
            Self::ZeroInterval => {
                write!(f, "clock refresh_interval_ms must be greater than zero")
            }
            Self::InvalidFormat {
                pattern,
            } => {
                write!(f, "clock format '{}' is not a valid strftime pattern", pattern)
            }
        }
    }
}

impl std::error::Error for ConfigValidationError {}

/// Whether `pattern` is a non-empty strftime pattern chrono can render.
///
/// # Examples
///
/// ```
/// use timebox_proto::config::is_well_formed_pattern;
///
/// assert!(is_well_formed_pattern("%H:%M:%S"));
/// assert!(!is_well_formed_pattern("%Q"));
/// assert!(!is_well_formed_pattern(""));
/// ```
pub fn is_well_formed_pattern(pattern: &str) -> bool {
    !pattern.trim().is_empty()
        && !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
}

impl Config {
    /// Validates the configuration before the clock is mounted.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigValidationError`] if the target identifier is blank,
    /// the refresh interval is zero or the format pattern is malformed.
    ///
    /// # Examples
    ///
    /// ```
    /// use timebox_proto::config::Config;
    ///
    /// let config = Config::default();
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let clock = &self.clock;

        if clock.target_id.trim().is_empty() {
            return Err(ConfigValidationError::EmptyTargetId);
        }

        if clock.refresh_interval_ms == 0 {
            return Err(ConfigValidationError::ZeroInterval);
        }

        if !is_well_formed_pattern(&clock.format) {
            return Err(ConfigValidationError::InvalidFormat {
                pattern: clock.format.clone(),
            });
        }

        Ok(())
    }
}
