pub mod line;
pub mod payload;
pub mod pipeline;
pub mod status;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub use pipeline::{IngestError, IngestionPipeline, Payload, FALLBACK_PANEL_ID};

/// Intermediate result of either input path, before defaults are applied.
///
/// Deserializes from a normalized payload map. Fields of the wrong type are
/// dropped rather than failing the whole submission.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PartialReading {
    #[serde(default, deserialize_with = "lenient_string")]
    pub panel_id: Option<String>,
    /// Device identity, used as `panel_id` fallback.
    #[serde(default, deserialize_with = "lenient_string")]
    pub device: Option<String>,
    /// Volts
    #[serde(default, deserialize_with = "lenient_f64")]
    pub voltage: Option<f64>,
    /// Milliamps
    #[serde(default, deserialize_with = "lenient_f64")]
    pub current: Option<f64>,
    /// Light percentage
    #[serde(default, deserialize_with = "lenient_f64")]
    pub load: Option<f64>,
    /// Degrees Celsius
    #[serde(default, deserialize_with = "lenient_f64")]
    pub temperature: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
}

/// Numbers and numeric strings become finite `f64`s; anything else is `None`.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(number.filter(|n| n.is_finite()))
}

/// Non-blank strings only.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) if !s.trim().is_empty() => Ok(Some(s.trim().to_owned())),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn deserializes_canonical_fields() {
        let r: PartialReading = serde_json::from_value(json!({
            "voltage": 3.3,
            "current": 120,
            "load": "55.5",
            "temperature": null,
            "device": " esp32 ",
            "ip": "192.168.1.40"
        }))
        .unwrap();

        assert_eq!(r.voltage, Some(3.3));
        assert_eq!(r.current, Some(120.0));
        assert_eq!(r.load, Some(55.5));
        assert_eq!(r.temperature, None);
        assert_eq!(r.device.as_deref(), Some("esp32"));
        assert_eq!(r.panel_id, None);
    }

    #[test]
    fn blank_strings_and_non_finite_strings_are_dropped() {
        let r: PartialReading = serde_json::from_value(json!({
            "panel_id": "   ",
            "status": "",
            "voltage": "inf",
            "current": "NaN"
        }))
        .unwrap();

        assert_eq!(r, PartialReading::default());
    }
}
