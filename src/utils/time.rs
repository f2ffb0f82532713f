//! Time parsing and formatting utilities

use crate::error::{VeditError, VeditResult};

/// Parse a user time into seconds.
///
/// Accepts plain seconds (`12.5`), `MM:SS(.ms)` and `HH:MM:SS(.ms)`.
pub fn parse_time(time_str: &str) -> VeditResult<f64> {
    let trimmed = time_str.trim();
    let invalid = || VeditError::InvalidTimeFormat {
        time: time_str.to_string(),
    };

    let parts: Vec<&str> = trimmed.split(':').collect();
    let seconds = match parts.as_slice() {
        [secs] => secs.parse::<f64>().map_err(|_| invalid())?,
        [minutes, secs] => {
            let minutes = whole_field(minutes).ok_or_else(invalid)?;
            let secs = seconds_field(secs).ok_or_else(invalid)?;
            minutes * 60.0 + secs
        }
        [hours, minutes, secs] => {
            let hours = whole_field(hours).ok_or_else(invalid)?;
            let minutes = whole_field(minutes).ok_or_else(invalid)?;
            if minutes >= 60.0 {
                return Err(invalid());
            }
            let secs = seconds_field(secs).ok_or_else(invalid)?;
            hours * 3600.0 + minutes * 60.0 + secs
        }
        _ => return Err(invalid()),
    };

    if !seconds.is_finite() || seconds < 0.0 {
        return Err(invalid());
    }
    Ok(seconds)
}

fn whole_field(text: &str) -> Option<f64> {
    text.parse::<u32>().ok().map(f64::from)
}

/// Seconds within a minute, allowing a fractional part
fn seconds_field(text: &str) -> Option<f64> {
    let value = text.parse::<f64>().ok()?;
    (value >= 0.0 && value < 60.0).then_some(value)
}

/// Format seconds as `MM:SS.mmm`, or `HH:MM:SS.mmm` past the hour
pub fn format_time(seconds: f64) -> String {
    let total_millis = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_millis / 3_600_000;
    let minutes = (total_millis % 3_600_000) / 60_000;
    let secs = (total_millis % 60_000) / 1000;
    let millis = total_millis % 1000;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, millis)
    } else {
        format!("{:02}:{:02}.{:03}", minutes, secs, millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_seconds() {
        assert_eq!(parse_time("5").unwrap(), 5.0);
        assert_eq!(parse_time(" 2.5 ").unwrap(), 2.5);
    }

    #[test]
    fn test_parse_clock_formats() {
        assert_eq!(parse_time("01:30").unwrap(), 90.0);
        assert_eq!(parse_time("00:02.250").unwrap(), 2.25);
        assert_eq!(parse_time("01:00:05.5").unwrap(), 3605.5);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "abc", "1:2:3:4", "00:75", "-3", "01:61:00", "1.5:00"] {
            assert!(
                matches!(parse_time(bad), Err(VeditError::InvalidTimeFormat { .. })),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(3.0), "00:03.000");
        assert_eq!(format_time(90.25), "01:30.250");
        assert_eq!(format_time(3605.5), "01:00:05.500");
    }
}
