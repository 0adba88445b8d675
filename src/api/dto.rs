use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::db::models::{format_timestamp, StoredReading};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReadingDto {
    pub id: i64,
    pub panel_id: String,
    /// Volts
    pub voltage: Option<f64>,
    /// Milliamps
    pub current: Option<f64>,
    /// Light percentage
    pub load: Option<f64>,
    /// Degrees Celsius
    pub temperature: Option<f64>,
    /// `HEALTHY`, or fault tags joined with ` | `
    /// (e.g. `OVER_VOLTAGE | LOW_LOAD`).
    pub status: String,
    /// RFC 3339, UTC, microsecond precision. Sorts lexically.
    pub timestamp: String,
}

impl From<StoredReading> for ReadingDto {
    fn from(r: StoredReading) -> Self {
        Self {
            id: r.id,
            timestamp: format_timestamp(&r.timestamp),
            panel_id: r.panel_id,
            voltage: r.voltage,
            current: r.current,
            load: r.load,
            temperature: r.temperature,
            status: r.status,
        }
    }
}

/// JSON body as sent by the panel monitor firmware. Documentation only: the
/// ingestion path decodes leniently and tolerates `nan` / `Infinity`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DevicePayload {
    /// Volts
    pub panel_voltage_v: Option<f64>,
    /// Milliamps
    pub current_ma: Option<f64>,
    /// Light percentage
    pub light_pct: Option<f64>,
    /// Degrees Celsius
    pub temp_c: Option<f64>,
    /// Device name, used as `panel_id` when none is given.
    pub device: Option<String>,
    pub ip: Option<String>,
    pub panel_id: Option<String>,
    /// Honored as-is when present; otherwise derived from thresholds.
    pub status: Option<String>,
}

/// Response for a successful ingestion.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IngestResponse {
    pub message: String,
    pub data: ReadingDto,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecentParams {
    /// Maximum number of readings to return (default 50, must be positive).
    pub limit: Option<u32>,
}
