use std::{borrow::Cow, fmt::Display};

use chrono::{DateTime, TimeZone};
use masterror::AppError;
use thiserror::Error;
use timebox_proto::config::{US_ENGLISH_FORMAT, is_well_formed_pattern};

/// Returned when a custom clock pattern cannot be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("clock format '{pattern}' is not a valid strftime pattern")]
pub struct ClockFormatError {
    pattern: String,
}

impl ClockFormatError {
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl From<ClockFormatError> for AppError {
    fn from(err: ClockFormatError) -> Self {
        AppError::validation(err.to_string())
    }
}

/// Display pattern applied to every render tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockFormat {
    pattern: Cow<'static, str>,
}

impl ClockFormat {
    /// US-English short form, e.g. `Fri, Mar 15, 1:04:05 PM`.
    pub const fn us_english() -> Self {
        Self {
            pattern: Cow::Borrowed(US_ENGLISH_FORMAT),
        }
    }

    /// Accept a custom chrono strftime pattern.
    ///
    /// # Errors
    ///
    /// Returns [`ClockFormatError`] for blank patterns or unknown specifiers.
    ///
    /// # Examples
    ///
    /// ```
    /// use timebox_core::clock::ClockFormat;
    ///
    /// assert!(ClockFormat::parse("%H:%M:%S").is_ok());
    /// assert!(ClockFormat::parse("%H:%Q").is_err());
    /// ```
    pub fn parse(pattern: impl Into<String>) -> Result<Self, ClockFormatError> {
        let pattern = pattern.into();

        if !is_well_formed_pattern(&pattern) {
            return Err(ClockFormatError {
                pattern,
            });
        }

        Ok(Self {
            pattern: Cow::Owned(pattern),
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Render `moment` with this pattern.
    pub fn format<Tz>(&self, moment: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        moment.format(&self.pattern).to_string()
    }
}

impl Default for ClockFormat {
    fn default() -> Self {
        Self::us_english()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, Utc};

    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s)
            .single()
            .expect("valid utc timestamp")
    }

    #[test]
    fn afternoon_uses_pm_and_unpadded_hour() {
        let formatted = ClockFormat::us_english().format(&utc(2024, 3, 15, 13, 4, 5));
        assert_eq!(formatted, "Fri, Mar 15, 1:04:05 PM");
    }

    #[test]
    fn midnight_is_twelve_am() {
        let formatted = ClockFormat::us_english().format(&utc(2023, 12, 31, 0, 0, 9));
        assert_eq!(formatted, "Sun, Dec 31, 12:00:09 AM");
    }

    #[test]
    fn noon_is_twelve_pm() {
        let formatted = ClockFormat::us_english().format(&utc(2025, 7, 4, 12, 30, 0));
        assert_eq!(formatted, "Fri, Jul 4, 12:30:00 PM");
    }

    #[test]
    fn fields_follow_local_offset() {
        let offset = FixedOffset::west_opt(5 * 3600).expect("valid offset");
        let moment = utc(2024, 1, 1, 3, 15, 0).with_timezone(&offset);

        let formatted = ClockFormat::us_english().format(&moment);
        assert_eq!(formatted, "Sun, Dec 31, 10:15:00 PM");
    }

    #[test]
    fn same_instant_formats_identically() {
        let format = ClockFormat::default();
        let moment = utc(2024, 2, 29, 23, 59, 59);

        assert_eq!(format.format(&moment), format.format(&moment));
    }

    #[test]
    fn custom_pattern_is_applied() {
        let format = ClockFormat::parse("%H:%M").expect("valid pattern");
        assert_eq!(format.format(&utc(2024, 3, 15, 13, 4, 5)), "13:04");
        assert_eq!(format.pattern(), "%H:%M");
    }

    #[test]
    fn rejects_blank_pattern() {
        let err = ClockFormat::parse("  ").expect_err("blank pattern rejected");
        assert_eq!(err.pattern(), "  ");
    }
}
