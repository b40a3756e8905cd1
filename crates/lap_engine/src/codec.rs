//! Time codec: seconds <-> `M:SS:mmm`.

/// Display text of a time that has not been recorded
pub const UNSET_TIME: &str = "--:--:---";

/// Round seconds to millisecond precision
pub fn round_ms(seconds: f64) -> f64 {
    (seconds * 1000.0).round() / 1000.0
}

/// Format seconds as `M:SS:mmm`
///
/// Minutes carry no leading zero, seconds always two digits and milliseconds
/// always three. The value is rounded to whole milliseconds first, so minutes
/// and seconds are the truncated parts of the rounded value. Negative values get
/// a leading `-`; non-finite values render as unset.
pub fn format_time(seconds: Option<f64>) -> String {
    match seconds {
        Some(value) if value.is_finite() => {
            let total_ms = (value * 1000.0).round() as i64;
            let sign = if total_ms < 0 { "-" } else { "" };
            let total_ms = total_ms.unsigned_abs();
            format!(
                "{sign}{}:{:02}:{:03}",
                total_ms / 60_000,
                (total_ms % 60_000) / 1000,
                total_ms % 1000
            )
        }
        _ => UNSET_TIME.to_string(),
    }
}

/// Format a signed difference with an explicit sign
///
/// `-` marks an improvement, `+` a loss; zero renders as `+`.
pub fn format_delta(delta: f64) -> String {
    let sign = if delta < 0.0 { '-' } else { '+' };
    format!("{sign}{}", format_time(Some(delta.abs())))
}

/// Result of parsing display text
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParsedTime<'a> {
    Seconds(f64),
    Unset,
    /// Malformed input handed back unchanged (passthrough mode)
    Verbatim(&'a str),
}

impl ParsedTime<'_> {
    pub fn seconds(&self) -> Option<f64> {
        match self {
            ParsedTime::Seconds(value) => Some(*value),
            _ => None,
        }
    }
}

/// Parse `M:SS:mmm` back into seconds
///
/// Malformed text yields [`ParsedTime::Unset`], or the input itself as
/// [`ParsedTime::Verbatim`] when `passthrough` is set.
pub fn parse_time(input: &str, passthrough: bool) -> ParsedTime<'_> {
    match parse_components(input) {
        Some(value) => ParsedTime::Seconds(value),
        None if passthrough => ParsedTime::Verbatim(input),
        None => ParsedTime::Unset,
    }
}

/// Shorthand for [`parse_time`] without passthrough
pub fn parse_seconds(input: &str) -> Option<f64> {
    parse_time(input, false).seconds()
}

fn parse_components(input: &str) -> Option<f64> {
    let mut parts = input.trim().split(':');
    let minutes = parse_digits(parts.next()?)?;
    let seconds = parse_digits(parts.next()?)?;
    let fraction = parts.next()?;
    if parts.next().is_some() || fraction.is_empty() || !is_digits(fraction) {
        return None;
    }
    let fraction: f64 = format!("0.{fraction}").parse().ok()?;

    Some(round_ms(minutes as f64 * 60.0 + seconds as f64 + fraction))
}

fn parse_digits(part: &str) -> Option<u64> {
    if part.is_empty() || !is_digits(part) {
        return None;
    }
    part.parse().ok()
}

fn is_digits(part: &str) -> bool {
    part.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_examples() {
        assert_eq!(format_time(Some(0.0)), "0:00:000");
        assert_eq!(format_time(Some(83.456)), "1:23:456");
        assert_eq!(format_time(Some(20.0)), "0:20:000");
        assert_eq!(format_time(Some(600.5)), "10:00:500");
    }

    #[test]
    fn test_milliseconds_round_to_nearest() {
        assert_eq!(format_time(Some(12.3456)), "0:12:346");
        assert_eq!(format_time(Some(59.9996)), "1:00:000");
    }

    #[test]
    fn test_unset_sentinel() {
        assert_eq!(format_time(None), UNSET_TIME);
        assert_eq!(format_time(Some(f64::NAN)), UNSET_TIME);
        assert_eq!(parse_time(UNSET_TIME, false), ParsedTime::Unset);
    }

    #[test]
    fn test_passthrough_returns_input() {
        assert_eq!(parse_time("n/a", true), ParsedTime::Verbatim("n/a"));
        assert_eq!(parse_time("n/a", false), ParsedTime::Unset);
        assert_eq!(parse_time("1:2", false), ParsedTime::Unset);
        assert_eq!(parse_time("1:02:03:04", false), ParsedTime::Unset);
    }

    #[test]
    fn test_delta_sign() {
        assert_eq!(format_delta(-0.25), "-0:00:250");
        assert_eq!(format_delta(1.5), "+0:01:500");
        assert_eq!(format_delta(0.0), "+0:00:000");
    }

    #[test]
    fn test_round_trip_every_millisecond() {
        for ms in 0..=5_999_999u64 {
            let t = ms as f64 / 1000.0;
            let parsed = parse_seconds(&format_time(Some(t)));
            assert_eq!(parsed, Some(t), "round trip failed for {ms}ms");
        }
    }
}
