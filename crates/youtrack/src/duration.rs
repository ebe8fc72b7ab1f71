//! Worklog duration parsing.
//!
//! Accepts the same shorthand YouTrack shows for spent time: `1w 2d 3h 30m`.
//! A working day is 8 hours and a working week is 5 days, matching the
//! server's default time-tracking settings. A bare number means minutes.

use crate::error::{Error, Result};

const MINUTES_PER_HOUR: u32 = 60;
const MINUTES_PER_DAY: u32 = 8 * MINUTES_PER_HOUR;
const MINUTES_PER_WEEK: u32 = 5 * MINUTES_PER_DAY;

/// Parse a duration such as `1h 30m`, `2d`, `90` into minutes.
///
/// # Errors
///
/// Returns `Error::InvalidInput` for empty input, unknown units, a unit
/// without a number, overflow, or a total of zero.
pub fn parse_duration(input: &str) -> Result<u32> {
    let invalid = |reason: String| Error::invalid("duration", reason);
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();

    if compact.is_empty() {
        return Err(invalid("duration cannot be empty".to_string()));
    }

    if compact.chars().all(|c| c.is_ascii_digit()) {
        let minutes: u32 = compact
            .parse()
            .map_err(|_| invalid(format!("'{input}' is too large")))?;
        return non_zero(minutes, input);
    }

    let mut total: u32 = 0;
    let mut number = String::new();
    for c in compact.chars() {
        if c.is_ascii_digit() {
            number.push(c);
            continue;
        }

        let unit = match c.to_ascii_lowercase() {
            'w' => MINUTES_PER_WEEK,
            'd' => MINUTES_PER_DAY,
            'h' => MINUTES_PER_HOUR,
            'm' => 1,
            other => {
                return Err(invalid(format!(
                    "unknown unit '{other}' in '{input}' (use w, d, h or m)"
                )));
            }
        };

        if number.is_empty() {
            return Err(invalid(format!("unit '{c}' without a number in '{input}'")));
        }

        let value: u32 = number
            .parse()
            .map_err(|_| invalid(format!("'{input}' is too large")))?;
        total = value
            .checked_mul(unit)
            .and_then(|v| total.checked_add(v))
            .ok_or_else(|| invalid(format!("'{input}' is too large")))?;
        number.clear();
    }

    if !number.is_empty() {
        return Err(invalid(format!(
            "trailing number without a unit in '{input}'"
        )));
    }

    non_zero(total, input)
}

fn non_zero(minutes: u32, input: &str) -> Result<u32> {
    if minutes == 0 {
        Err(Error::invalid(
            "duration",
            format!("'{input}' must be longer than zero"),
        ))
    } else {
        Ok(minutes)
    }
}

/// Render minutes as `1h 30m` using hours and minutes only.
pub fn format_minutes(minutes: u32) -> String {
    let hours = minutes / MINUTES_PER_HOUR;
    let rest = minutes % MINUTES_PER_HOUR;
    match (hours, rest) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::bare_minutes("90", 90)]
    #[case::minutes("45m", 45)]
    #[case::hours("2h", 120)]
    #[case::hours_minutes("1h 30m", 90)]
    #[case::no_space("1h30m", 90)]
    #[case::day("1d", 480)]
    #[case::week("1w", 2400)]
    #[case::everything("1w 2d 3h 4m", 2400 + 960 + 180 + 4)]
    #[case::uppercase("2H", 120)]
    #[case::repeated_unit("1h 1h", 120)]
    fn test_parse_duration(#[case] input: &str, #[case] expected: u32) {
        assert_eq!(parse_duration(input).unwrap(), expected);
    }

    #[rstest]
    #[case::empty("")]
    #[case::blank("   ")]
    #[case::zero("0")]
    #[case::zero_units("0h 0m")]
    #[case::unknown_unit("3x")]
    #[case::unit_only("h")]
    #[case::trailing_number("1h 30")]
    #[case::negative("-5m")]
    #[case::overflow("99999999999")]
    #[case::overflow_weeks("9999999w")]
    fn test_parse_duration_rejects(#[case] input: &str) {
        let err = parse_duration(input).unwrap_err();
        assert!(matches!(err, Error::InvalidInput { field: "duration", .. }));
    }

    #[rstest]
    #[case(5, "5m")]
    #[case(60, "1h")]
    #[case(90, "1h 30m")]
    #[case(480, "8h")]
    fn test_format_minutes(#[case] minutes: u32, #[case] expected: &str) {
        assert_eq!(format_minutes(minutes), expected);
    }
}
