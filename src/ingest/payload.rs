use std::borrow::Cow;

use serde_json::{Map, Value};
use thiserror::Error;

use super::PartialReading;

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("malformed JSON payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("JSON payload must be an object, got {0}")]
    NotAnObject(&'static str),
    #[error("JSON payload is empty")]
    Empty,
    #[error("JSON payload is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
}

// ---------------------------------------------------------------------------
// Key mapping
// ---------------------------------------------------------------------------

/// Device-side key → canonical field name.
const KEY_RENAMES: &[(&str, &str)] = &[
    ("panel_voltage_v", "voltage"),
    ("current_ma", "current"),
    ("light_pct", "load"),
    ("temp_c", "temperature"),
];

fn canonical_key(key: &str) -> Option<&'static str> {
    KEY_RENAMES
        .iter()
        .find(|(device, _)| *device == key)
        .map(|(_, canonical)| *canonical)
}

// ---------------------------------------------------------------------------
// Sanitization
//
// The firmware serializes failed float reads as bare `nan` / `Infinity`
// literals, which are not valid JSON. They are rewritten to `null` before the
// strict decoder ever sees the text. Longer literals come first so that
// `-Infinity` is never reduced to `-null`.
// ---------------------------------------------------------------------------

const NON_FINITE_LITERALS: &[&str] = &["-Infinity", "Infinity", "-NaN", "NaN", "-nan", "nan"];

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'.'
}

/// Replace bare non-finite numeric literals outside string literals with
/// `null`. Returns the input unchanged (borrowed) when nothing matched.
pub fn sanitize(raw: &str) -> Cow<'_, str> {
    let bytes = raw.as_bytes();
    let mut out = String::new();
    let mut copied = 0;
    let mut in_string = false;
    let mut escaped = false;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];

        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            i += 1;
            continue;
        }

        if b == b'"' {
            in_string = true;
            i += 1;
            continue;
        }

        let at_boundary = i == 0 || !is_word_byte(bytes[i - 1]);
        if at_boundary {
            let literal = NON_FINITE_LITERALS.iter().find(|lit| {
                bytes[i..].starts_with(lit.as_bytes())
                    && !bytes.get(i + lit.len()).copied().is_some_and(is_word_byte)
            });
            if let Some(lit) = literal {
                out.push_str(&raw[copied..i]);
                out.push_str("null");
                i += lit.len();
                copied = i;
                continue;
            }
        }

        i += 1;
    }

    if copied == 0 {
        return Cow::Borrowed(raw);
    }
    out.push_str(&raw[copied..]);
    Cow::Owned(out)
}

// ---------------------------------------------------------------------------
// Decode + normalize
// ---------------------------------------------------------------------------

/// Strictly decode already-sanitized text into a non-empty JSON object.
pub fn decode(text: &str) -> Result<Map<String, Value>, PayloadError> {
    match serde_json::from_str::<Value>(text)? {
        Value::Object(map) if map.is_empty() => Err(PayloadError::Empty),
        Value::Object(map) => Ok(map),
        Value::Null => Err(PayloadError::NotAnObject("null")),
        Value::Bool(_) => Err(PayloadError::NotAnObject("boolean")),
        Value::Number(_) => Err(PayloadError::NotAnObject("number")),
        Value::String(_) => Err(PayloadError::NotAnObject("string")),
        Value::Array(_) => Err(PayloadError::NotAnObject("array")),
    }
}

/// Rename device-side keys to canonical field names. Values are untouched;
/// unmapped keys pass through and input order is preserved.
pub fn normalize(raw: Map<String, Value>) -> Map<String, Value> {
    raw.into_iter()
        .map(|(key, value)| match canonical_key(&key) {
            Some(canonical) => (canonical.to_owned(), value),
            None => (key, value),
        })
        .collect()
}

/// Full structured path: sanitize, decode, normalize, and lift into a
/// [`PartialReading`].
pub fn parse(raw: &str) -> Result<PartialReading, PayloadError> {
    let sanitized = sanitize(raw);
    let map = normalize(decode(&sanitized)?);
    Ok(serde_json::from_value(Value::Object(map))?)
}

/// [`parse`] for a raw request body; invalid UTF-8 is an error, never
/// replaced.
pub fn parse_bytes(raw: &[u8]) -> Result<PartialReading, PayloadError> {
    parse(std::str::from_utf8(raw)?)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    // --- sanitize -----------------------------------------------------------

    #[test]
    fn sanitize_replaces_bare_literals() {
        let raw = r#"{"a":nan,"b":NaN,"c":Infinity,"d":-Infinity}"#;
        assert_eq!(
            sanitize(raw),
            r#"{"a":null,"b":null,"c":null,"d":null}"#
        );
    }

    #[test]
    fn sanitize_leaves_valid_json_borrowed() {
        let raw = r#"{"panel_voltage_v": 12.34, "device": "esp8266"}"#;
        assert!(matches!(sanitize(raw), Cow::Borrowed(_)));
    }

    #[test]
    fn sanitize_ignores_string_contents() {
        let raw = r#"{"device":"nan","note":"say \"Infinity\"","v":nan}"#;
        assert_eq!(
            sanitize(raw),
            r#"{"device":"nan","note":"say \"Infinity\"","v":null}"#
        );
    }

    #[test]
    fn sanitize_respects_token_boundaries() {
        let raw = r#"{"v": nanny, "w": Infinityx, "x": [nan, -nan]}"#;
        assert_eq!(
            sanitize(raw),
            r#"{"v": nanny, "w": Infinityx, "x": [null, null]}"#
        );
    }

    // --- decode -------------------------------------------------------------

    #[test]
    fn decode_rejects_garbage() {
        let err = decode("{not json").unwrap_err();
        assert!(matches!(err, PayloadError::Malformed(_)));
    }

    #[test]
    fn decode_rejects_non_objects() {
        assert!(matches!(decode("[1,2]").unwrap_err(), PayloadError::NotAnObject("array")));
        assert!(matches!(decode("42").unwrap_err(), PayloadError::NotAnObject("number")));
    }

    #[test]
    fn decode_rejects_empty_object() {
        assert!(matches!(decode("{}").unwrap_err(), PayloadError::Empty));
    }

    #[test]
    fn decode_is_strict_without_sanitize() {
        assert!(decode(r#"{"temp_c": nan}"#).is_err());
    }

    // --- normalize ----------------------------------------------------------

    #[test]
    fn normalize_renames_device_keys() {
        let raw = json!({
            "panel_voltage_v": 12.34,
            "current_ma": 210,
            "light_pct": 76,
            "temp_c": 29.1,
            "device": "esp8266"
        });
        let Value::Object(map) = raw else { unreachable!() };

        let out = Value::Object(normalize(map));
        assert_eq!(
            out,
            json!({
                "voltage": 12.34,
                "current": 210,
                "load": 76,
                "temperature": 29.1,
                "device": "esp8266"
            })
        );
    }

    #[test]
    fn normalize_preserves_order_and_passthrough_keys() {
        let map = decode(r#"{"ip":"10.0.0.7","temp_c":20,"device":"esp32","panel_voltage_v":3.3}"#)
            .unwrap();
        let keys: Vec<_> = normalize(map).into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["ip", "temperature", "device", "voltage"]);
    }

    // --- parse --------------------------------------------------------------

    #[test]
    fn parse_sample_payload() {
        let r = parse(
            r#"{"panel_voltage_v":12.34,"current_ma":210,"light_pct":76,"temp_c":29.1,"device":"esp8266"}"#,
        )
        .unwrap();
        assert_eq!(r.voltage, Some(12.34));
        assert_eq!(r.current, Some(210.0));
        assert_eq!(r.load, Some(76.0));
        assert_eq!(r.temperature, Some(29.1));
        assert_eq!(r.device.as_deref(), Some("esp8266"));
        assert!(r.status.is_none());
    }

    #[test]
    fn parse_nan_field_becomes_missing() {
        let r = parse(r#"{"panel_voltage_v":3.1,"temp_c":nan,"device":"esp8266"}"#).unwrap();
        assert_eq!(r.voltage, Some(3.1));
        assert_eq!(r.temperature, None);
    }

    #[test]
    fn parse_tolerates_odd_field_types() {
        let r = parse(r#"{"panel_voltage_v":"4.2","current_ma":"n/a","light_pct":true,"device":7}"#)
            .unwrap();
        assert_eq!(r.voltage, Some(4.2));
        assert_eq!(r.current, None);
        assert_eq!(r.load, None);
        assert_eq!(r.device, None);
    }

    #[test]
    fn parse_bytes_rejects_invalid_utf8() {
        let err = parse_bytes(b"{\"device\":\"esp\xff\"}").unwrap_err();
        assert!(matches!(err, PayloadError::Encoding(_)));
    }

    #[test]
    fn parse_bytes_accepts_multibyte_utf8() {
        let r = parse_bytes("{\"device\":\"dach-süd\"}".as_bytes()).unwrap();
        assert_eq!(r.device.as_deref(), Some("dach-süd"));
    }

    #[test]
    fn parse_keeps_supplied_status_and_panel_id() {
        let r = parse(r#"{"panel_id":"ROOF-2","status":"OVER_TEMP","temp_c":70}"#).unwrap();
        assert_eq!(r.panel_id.as_deref(), Some("ROOF-2"));
        assert_eq!(r.status.as_deref(), Some("OVER_TEMP"));
    }
}
