//! Reminder preference model and its string encodings.
//!
//! # Responsibility
//! - Hold the enabled flag and time-of-day for the daily reminder.
//! - Encode/decode the two persisted string tokens.
//!
//! # Invariants
//! - `hour < 24` and `minute < 60`.
//! - Only hour and minute of a stored timestamp are significant.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const DEFAULT_REMINDER_HOUR: u8 = 18;
pub const DEFAULT_REMINDER_MINUTE: u8 = 0;

// Matches `...THH:MM...` timestamps as well as bare `HH:MM`.
static TIME_OF_DAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\d{4}-\d{2}-\d{2}[T ])?(\d{1,2}):(\d{2})(?::\d{2}(?:\.\d+)?)?(?:Z|[+-]\d{2}:?\d{2})?$")
        .expect("valid time-of-day regex")
});

/// Errors for reminder preference values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationValueError {
    InvalidTime { hour: u8, minute: u8 },
    UnparsableTime(String),
    UnparsableFlag(String),
}

impl Display for NotificationValueError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTime { hour, minute } => {
                write!(f, "invalid reminder time {hour:02}:{minute:02}")
            }
            Self::UnparsableTime(value) => write!(f, "unparsable reminder time `{value}`"),
            Self::UnparsableFlag(value) => write!(f, "unparsable reminder flag `{value}`"),
        }
    }
}

impl Error for NotificationValueError {}

/// Daily reminder preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationSettings {
    pub enabled: bool,
    pub hour: u8,
    pub minute: u8,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            hour: DEFAULT_REMINDER_HOUR,
            minute: DEFAULT_REMINDER_MINUTE,
        }
    }
}

/// Checks a time-of-day pair.
pub fn validate_time_of_day(hour: u8, minute: u8) -> Result<(), NotificationValueError> {
    if hour >= 24 || minute >= 60 {
        return Err(NotificationValueError::InvalidTime { hour, minute });
    }
    Ok(())
}

/// Encodes the enabled flag as its stored token.
pub fn encode_enabled_flag(enabled: bool) -> &'static str {
    if enabled {
        "true"
    } else {
        "false"
    }
}

pub fn decode_enabled_flag(value: &str) -> Result<bool, NotificationValueError> {
    match value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(NotificationValueError::UnparsableFlag(other.to_string())),
    }
}

/// Encodes a time-of-day as a timestamp string on a fixed date.
pub fn encode_time_of_day(hour: u8, minute: u8) -> String {
    format!("1970-01-01T{hour:02}:{minute:02}:00.000Z")
}

/// Reads hour and minute from a stored timestamp, ignoring the date.
pub fn decode_time_of_day(value: &str) -> Result<(u8, u8), NotificationValueError> {
    let trimmed = value.trim();
    let unparsable = || NotificationValueError::UnparsableTime(trimmed.to_string());
    let caps = TIME_OF_DAY_RE.captures(trimmed).ok_or_else(unparsable)?;
    let hour = caps[1].parse::<u8>().map_err(|_| unparsable())?;
    let minute = caps[2].parse::<u8>().map_err(|_| unparsable())?;
    validate_time_of_day(hour, minute)?;
    Ok((hour, minute))
}
