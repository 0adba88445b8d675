//! Plain-text telemetry lines as printed by the device firmware:
//!
//! ```text
//! V: 2.42V | I: 510mA | L: 16% | T: 26.9C
//! ```
//!
//! Each segment is optional. Only the last non-empty line of a submission is
//! parsed; earlier lines are boot or debug noise.

use thiserror::Error;

use super::{status, PartialReading};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LineError {
    #[error("plain-text body is empty")]
    EmptyInput,
}

/// `(marker, unit)` pairs for each field.
const VOLTAGE: (&str, &str) = ("V:", "V");
const CURRENT: (&str, &str) = ("I:", "mA");
const LOAD: (&str, &str) = ("L:", "%");
const TEMPERATURE: (&str, &str) = ("T:", "C");

/// Parse the last non-empty line of `text` into a partial reading with a
/// computed status.
pub fn parse(text: &str) -> Result<PartialReading, LineError> {
    let line = last_line(text).ok_or(LineError::EmptyInput)?;

    let voltage = extract(line, VOLTAGE);
    let current = extract(line, CURRENT);
    let load = extract(line, LOAD);
    let temperature = extract(line, TEMPERATURE);

    Ok(PartialReading {
        voltage,
        current,
        load,
        temperature,
        status: Some(status::evaluate(voltage, current, temperature, load)),
        ..PartialReading::default()
    })
}

/// Last line that still has content after trimming.
pub fn last_line(text: &str) -> Option<&str> {
    text.lines().rev().map(str::trim).find(|l| !l.is_empty())
}

/// Find `marker`, then an unsigned decimal, then `unit`, allowing whitespace
/// in between. Later occurrences of the marker are tried if an earlier one
/// does not fit the shape.
fn extract(line: &str, (marker, unit): (&str, &str)) -> Option<f64> {
    line.match_indices(marker).find_map(|(idx, _)| {
        let rest = line[idx + marker.len()..].trim_start();
        let len = decimal_len(rest);
        if len == 0 {
            return None;
        }
        let (number, tail) = rest.split_at(len);
        if !tail.trim_start().starts_with(unit) {
            return None;
        }
        number.parse().ok()
    })
}

/// Byte length of the leading `digits[.digits]` prefix of `s`, or 0.
fn decimal_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let int = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    if int == 0 {
        return 0;
    }
    if bytes.get(int) == Some(&b'.') {
        let frac = bytes[int + 1..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if frac > 0 {
            return int + 1 + frac;
        }
    }
    int
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_line() {
        let r = parse("V: 2.42V | I: 510mA | L: 16% | T: 26.9C").unwrap();
        assert_eq!(r.voltage, Some(2.42));
        assert_eq!(r.current, Some(510.0));
        assert_eq!(r.load, Some(16.0));
        assert_eq!(r.temperature, Some(26.9));
        assert_eq!(r.status.as_deref(), Some("HEALTHY"));
        assert!(r.panel_id.is_none());
    }

    #[test]
    fn only_last_line_is_used() {
        let r = parse("noise\nV: 2.42V | I: 510mA | L: 16% | T: 26.9C").unwrap();
        assert_eq!(r.voltage, Some(2.42));
        assert_eq!(r.current, Some(510.0));
        assert_eq!(r.load, Some(16.0));
        assert_eq!(r.temperature, Some(26.9));
        assert_eq!(r.status.as_deref(), Some("HEALTHY"));
    }

    #[test]
    fn earlier_data_lines_are_discarded() {
        let r = parse("V: 9.9V | I: 5000mA | L: 1% | T: 90C\r\nV: 3.1V\r\n\r\n").unwrap();
        assert_eq!(r.voltage, Some(3.1));
        assert_eq!(r.current, None);
    }

    #[test]
    fn whitespace_only_is_empty_input() {
        assert_eq!(parse("   \n  ").unwrap_err(), LineError::EmptyInput);
        assert_eq!(parse("").unwrap_err(), LineError::EmptyInput);
    }

    #[test]
    fn absent_markers_leave_fields_unset() {
        let r = parse("I: 200mA | T: 30C").unwrap();
        assert_eq!(r.voltage, None);
        assert_eq!(r.current, Some(200.0));
        assert_eq!(r.load, None);
        assert_eq!(r.temperature, Some(30.0));
        // voltage and load missing -> treated as 0
        assert_eq!(r.status.as_deref(), Some("LOW_VOLTAGE | LOW_LOAD"));
    }

    #[test]
    fn unparseable_value_leaves_field_unset() {
        let r = parse("V: nanV | I: 510mA | L: 16% | T: 26.9C").unwrap();
        assert_eq!(r.voltage, None);
        assert_eq!(r.current, Some(510.0));
    }

    #[test]
    fn missing_unit_leaves_field_unset() {
        let r = parse("V: 2.42 | I: 510mA").unwrap();
        assert_eq!(r.voltage, None);
        assert_eq!(r.current, Some(510.0));
    }

    #[test]
    fn tolerates_compact_spacing() {
        let r = parse("V:4.9V|I:12mA|L:80%|T:61.5C").unwrap();
        assert_eq!(r.voltage, Some(4.9));
        assert_eq!(r.current, Some(12.0));
        assert_eq!(r.load, Some(80.0));
        assert_eq!(r.temperature, Some(61.5));
        assert_eq!(r.status.as_deref(), Some("OVER_TEMP"));
    }

    #[test]
    fn markers_are_case_sensitive() {
        let r = parse("v: 2.0V | i: 10mA").unwrap();
        assert_eq!(r.voltage, None);
        assert_eq!(r.current, None);
    }

    #[test]
    fn trailing_dot_is_not_part_of_number() {
        assert_eq!(decimal_len("12.V"), 2);
        assert_eq!(decimal_len("12.5V"), 4);
        assert_eq!(decimal_len(".5V"), 0);
    }
}
