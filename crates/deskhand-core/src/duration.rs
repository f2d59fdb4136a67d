// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Human-readable durations for reports and the `/afk` command.

use chrono::Duration;

use crate::error::DeskhandError;

/// Longest duration [`parse_duration`] accepts: one year.
pub const MAX_DURATION_SECS: i64 = 365 * 86_400;

/// Formats a number of seconds as `"<h>h <mm>m"` (or `"<m>m"` under an hour).
///
/// Negative input is rejected.
pub fn format_duration(secs: i64) -> Result<String, DeskhandError> {
    if secs < 0 {
        return Err(DeskhandError::internal("time can not be less than zero"));
    }
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    if hours == 0 {
        Ok(format!("{minutes}m"))
    } else {
        Ok(format!("{hours}h {minutes:02}m"))
    }
}

/// Seconds as fractional hours rounded to two decimals.
pub fn as_hours(secs: i64) -> f64 {
    (secs as f64 / 36.0).round() / 100.0
}

/// Parses durations such as `30m`, `2h`, `1h30m`, or `1d`.
///
/// Anything longer than [`MAX_DURATION_SECS`] is rejected.
pub fn parse_duration(input: &str) -> Result<Duration, DeskhandError> {
    let input = input.trim();
    let invalid = || DeskhandError::internal(format!("invalid duration `{input}`, use e.g. 30m, 2h, 1h30m"));
    if input.is_empty() {
        return Err(invalid());
    }

    let mut total: i64 = 0;
    let mut digits = String::new();
    for ch in input.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }
        let value: i64 = digits.parse().map_err(|_| invalid())?;
        digits.clear();
        let unit = match ch.to_ascii_lowercase() {
            'd' => 86_400,
            'h' => 3_600,
            'm' => 60,
            's' => 1,
            _ => return Err(invalid()),
        };
        total = value
            .checked_mul(unit)
            .and_then(|v| total.checked_add(v))
            .ok_or_else(invalid)?;
    }
    if !digits.is_empty() || total == 0 {
        return Err(invalid());
    }
    if total > MAX_DURATION_SECS {
        return Err(DeskhandError::internal(format!(
            "duration `{input}` is too long, the maximum is 365d"
        )));
    }
    Duration::try_seconds(total).ok_or_else(invalid)
}
