//! Timestamp parsing utilities.
//!
//! Transcript manifests carry segment boundaries either as raw seconds or
//! as clock strings, supporting formats like HH:MM:SS, HH:MM:SS.mmm,
//! MM:SS, and SS.

/// Maximum reasonable timeline position (24 hours in seconds).
pub const MAX_TIMELINE_SECS: f64 = 86400.0;

/// Parse a timestamp string to total seconds.
///
/// Supports formats:
/// - `HH:MM:SS` or `HH:MM:SS.mmm`
/// - `MM:SS` or `MM:SS.mmm`
/// - `SS` or `SS.mmm`
///
/// # Examples
/// ```
/// use autodub_models::timestamp::parse_timestamp;
/// assert_eq!(parse_timestamp("01:30:00").unwrap(), 5400.0);
/// assert_eq!(parse_timestamp("05:30").unwrap(), 330.0);
/// assert_eq!(parse_timestamp("90").unwrap(), 90.0);
/// ```
pub fn parse_timestamp(ts: &str) -> Result<f64, TimestampError> {
    let ts = ts.trim();
    if ts.is_empty() {
        return Err(TimestampError::Empty);
    }

    let parts: Vec<&str> = ts.split(':').collect();
    match parts.len() {
        1 => {
            // Just seconds (SS or SS.mmm)
            let seconds: f64 = parts[0]
                .parse()
                .map_err(|_| TimestampError::InvalidValue("seconds", parts[0].to_string()))?;
            if seconds < 0.0 {
                return Err(TimestampError::Negative);
            }
            Ok(seconds)
        }
        2 => {
            // MM:SS or MM:SS.mmm
            let minutes: f64 = parts[0]
                .parse()
                .map_err(|_| TimestampError::InvalidValue("minutes", parts[0].to_string()))?;
            let seconds: f64 = parts[1]
                .parse()
                .map_err(|_| TimestampError::InvalidValue("seconds", parts[1].to_string()))?;
            if minutes < 0.0 || seconds < 0.0 {
                return Err(TimestampError::Negative);
            }
            Ok(minutes * 60.0 + seconds)
        }
        3 => {
            // HH:MM:SS or HH:MM:SS.mmm
            let hours: f64 = parts[0]
                .parse()
                .map_err(|_| TimestampError::InvalidValue("hours", parts[0].to_string()))?;
            let minutes: f64 = parts[1]
                .parse()
                .map_err(|_| TimestampError::InvalidValue("minutes", parts[1].to_string()))?;
            let seconds: f64 = parts[2]
                .parse()
                .map_err(|_| TimestampError::InvalidValue("seconds", parts[2].to_string()))?;
            if hours < 0.0 || minutes < 0.0 || seconds < 0.0 {
                return Err(TimestampError::Negative);
            }
            Ok(hours * 3600.0 + minutes * 60.0 + seconds)
        }
        _ => Err(TimestampError::InvalidFormat(ts.to_string())),
    }
}

/// Format seconds into HH:MM:SS or HH:MM:SS.mmm string.
pub fn format_seconds(total_secs: f64) -> String {
    let hours = (total_secs / 3600.0).floor() as u32;
    let mins = ((total_secs % 3600.0) / 60.0).floor() as u32;
    let secs = total_secs % 60.0;

    // Include milliseconds if present
    if (secs - secs.floor()).abs() > 0.0001 {
        format!("{:02}:{:02}:{:06.3}", hours, mins, secs)
    } else {
        format!("{:02}:{:02}:{:02}", hours, mins, secs.floor() as u32)
    }
}

/// Timestamp parsing error.
#[derive(Debug, Clone, PartialEq)]
pub enum TimestampError {
    /// Timestamp string is empty
    Empty,
    /// Timestamp contains negative values
    Negative,
    /// Invalid numeric value for a component
    InvalidValue(&'static str, String),
    /// Invalid timestamp format
    InvalidFormat(String),
}

impl std::fmt::Display for TimestampError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "Timestamp cannot be empty"),
            Self::Negative => write!(f, "Timestamp cannot be negative"),
            Self::InvalidValue(component, value) => {
                write!(f, "Invalid {} value: {}", component, value)
            }
            Self::InvalidFormat(ts) => write!(
                f,
                "Invalid timestamp format '{}'. Use HH:MM:SS, HH:MM:SS.mmm, MM:SS, or MM:SS.mmm",
                ts
            ),
        }
    }
}

impl std::error::Error for TimestampError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_hh_mm_ss() {
        assert_eq!(parse_timestamp("00:00:00").unwrap(), 0.0);
        assert_eq!(parse_timestamp("00:01:00").unwrap(), 60.0);
        assert_eq!(parse_timestamp("01:00:00").unwrap(), 3600.0);
        assert_eq!(parse_timestamp("01:30:45").unwrap(), 5445.0);
    }

    #[test]
    fn test_parse_timestamp_mm_ss() {
        assert_eq!(parse_timestamp("05:30").unwrap(), 330.0);
        assert_eq!(parse_timestamp("53:53").unwrap(), 3233.0);
    }

    #[test]
    fn test_parse_timestamp_ss() {
        assert_eq!(parse_timestamp("90").unwrap(), 90.0);
        assert_eq!(parse_timestamp("0").unwrap(), 0.0);
    }

    #[test]
    fn test_parse_timestamp_with_milliseconds() {
        let result = parse_timestamp("00:00:30.500").unwrap();
        assert!((result - 30.5).abs() < 0.001);
    }

    #[test]
    fn test_parse_timestamp_errors() {
        assert!(matches!(parse_timestamp(""), Err(TimestampError::Empty)));
        assert!(matches!(parse_timestamp("  "), Err(TimestampError::Empty)));
        assert!(matches!(
            parse_timestamp("abc"),
            Err(TimestampError::InvalidValue(_, _))
        ));
        assert!(matches!(
            parse_timestamp("1:2:3:4"),
            Err(TimestampError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_timestamp("-5"),
            Err(TimestampError::Negative)
        ));
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(0.0), "00:00:00");
        assert_eq!(format_seconds(90.0), "00:01:30");
        assert_eq!(format_seconds(3661.0), "01:01:01");
        assert_eq!(format_seconds(30.5), "00:00:30.500");
    }
}
