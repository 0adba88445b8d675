use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::FromRow;

/// A finished reading that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReading {
    pub panel_id: String,
    /// Volts
    pub voltage: Option<f64>,
    /// Milliamps
    pub current: Option<f64>,
    /// Light percentage
    pub load: Option<f64>,
    /// Degrees Celsius
    pub temperature: Option<f64>,
    /// `"HEALTHY"` or `" | "`-joined fault tags.
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

/// A persisted reading with its auto-assigned sequence id.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredReading {
    pub id: i64,
    pub panel_id: String,
    pub voltage: Option<f64>,
    pub current: Option<f64>,
    pub load: Option<f64>,
    pub temperature: Option<f64>,
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl StoredReading {
    pub fn from_new(id: i64, r: NewReading) -> Self {
        Self {
            id,
            panel_id: r.panel_id,
            voltage: r.voltage,
            current: r.current,
            load: r.load,
            temperature: r.temperature,
            status: r.status,
            timestamp: r.timestamp,
        }
    }
}

/// Mirrors one row of the `readings` table.
///
/// `timestamp` is kept as fixed-width RFC 3339 text so that `ORDER BY
/// timestamp` is chronological.
#[derive(Debug, Clone, FromRow)]
pub struct ReadingRow {
    pub id: i64,
    pub panel_id: String,
    pub voltage: Option<f64>,
    pub current: Option<f64>,
    pub load: Option<f64>,
    pub temperature: Option<f64>,
    pub status: String,
    pub timestamp: String,
}

impl TryFrom<ReadingRow> for StoredReading {
    type Error = chrono::ParseError;

    fn try_from(row: ReadingRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            panel_id: row.panel_id,
            voltage: row.voltage,
            current: row.current,
            load: row.load,
            temperature: row.temperature,
            status: row.status,
            timestamp: parse_timestamp(&row.timestamp)?,
        })
    }
}

/// `2026-10-14T07:03:00.123456Z`: always microseconds, always `Z`.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|ts| ts.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn timestamp_text_is_fixed_width() {
        let whole = Utc.with_ymd_and_hms(2026, 10, 14, 7, 3, 0).unwrap();
        assert_eq!(format_timestamp(&whole), "2026-10-14T07:03:00.000000Z");

        let later = whole + chrono::Duration::microseconds(1_500);
        assert_eq!(format_timestamp(&later), "2026-10-14T07:03:00.001500Z");
        assert!(format_timestamp(&whole) < format_timestamp(&later));
    }

    #[test]
    fn timestamp_text_round_trips() {
        let ts = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap()
            + chrono::Duration::microseconds(678_901);
        assert_eq!(parse_timestamp(&format_timestamp(&ts)).unwrap(), ts);
    }

    #[test]
    fn row_with_bad_timestamp_fails_conversion() {
        let row = ReadingRow {
            id: 1,
            panel_id: "PANEL-1".into(),
            voltage: None,
            current: None,
            load: None,
            temperature: None,
            status: "HEALTHY".into(),
            timestamp: "yesterday".into(),
        };
        assert!(StoredReading::try_from(row).is_err());
    }
}
