//! Time formatting and parsing for UPnP `H:MM:SS` positions.
//!
//! Positions and durations travel as nanoseconds between the services and
//! the [`Output`](crate::output::Output) backend, and as `H+:MM:SS[.F+]`
//! strings in state variables and action arguments.

use thiserror::Error;

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Error returned when a time string cannot be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid time format '{0}': expected H:MM:SS[.fff]")]
pub struct TimeFormatError(pub String);

/// Formats nanoseconds as `H:MM:SS`, truncating to the second.
///
/// # Examples
/// ```
/// # use pmomediarenderer::time_utils::format_upnp_time;
/// assert_eq!(format_upnp_time(0), "0:00:00");
/// assert_eq!(format_upnp_time(61_500_000_000), "0:01:01");
/// assert_eq!(format_upnp_time(36_000_000_000_000), "10:00:00");
/// ```
pub fn format_upnp_time(nanos: u64) -> String {
    let seconds = nanos / NANOS_PER_SEC;
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{}:{:02}:{:02}", hours, minutes, secs)
}

/// Parses `H+:MM:SS[.F+]` into nanoseconds.
///
/// Hours may have any number of digits. Minutes and seconds must be below
/// 60. The optional decimal fraction is kept down to the nanosecond.
///
/// # Examples
/// ```
/// # use pmomediarenderer::time_utils::parse_upnp_time;
/// assert_eq!(parse_upnp_time("0:01:30").unwrap(), 90_000_000_000);
/// assert_eq!(parse_upnp_time("1:00:00.5").unwrap(), 3_600_500_000_000);
/// assert!(parse_upnp_time("01:30").is_err());
/// ```
///
/// # Errors
/// Returns [`TimeFormatError`] if the string does not have exactly three
/// colon-separated components, a component is not numeric, or minutes or
/// seconds are out of range.
pub fn parse_upnp_time(input: &str) -> Result<u64, TimeFormatError> {
    let err = || TimeFormatError(input.to_string());
    let trimmed = input.trim();

    let (clock, fraction) = match trimmed.split_once('.') {
        Some((clock, fraction)) => (clock, Some(fraction)),
        None => (trimmed, None),
    };

    let parts: Vec<&str> = clock.split(':').collect();
    if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
        return Err(err());
    }
    if parts[1].len() != 2 || parts[2].len() != 2 {
        return Err(err());
    }

    let hours: u64 = parse_digits(parts[0]).ok_or_else(err)?;
    let minutes: u64 = parse_digits(parts[1]).ok_or_else(err)?;
    let seconds: u64 = parse_digits(parts[2]).ok_or_else(err)?;
    if minutes >= 60 || seconds >= 60 {
        return Err(err());
    }

    let mut nanos = hours
        .checked_mul(3600)
        .and_then(|h| h.checked_add(minutes * 60 + seconds))
        .and_then(|s| s.checked_mul(NANOS_PER_SEC))
        .ok_or_else(err)?;

    if let Some(fraction) = fraction {
        if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        let digits: String = fraction.chars().take(9).collect();
        let scale = 10u64.pow(9 - digits.len() as u32);
        let value: u64 = digits.parse().map_err(|_| err())?;
        nanos += value * scale;
    }

    Ok(nanos)
}

fn parse_digits(s: &str) -> Option<u64> {
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Whole seconds of a nanosecond value.
pub fn nanos_to_secs(nanos: u64) -> u64 {
    nanos / NANOS_PER_SEC
}
