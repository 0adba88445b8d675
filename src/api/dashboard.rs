use axum::{extract::State, response::Html};

use super::{errors::AppError, AppState};
use crate::{
    db::models::{format_timestamp, StoredReading},
    ingest::status::HEALTHY,
};

/// Human-readable table of the most recent readings. Refreshes itself every
/// ten seconds.
pub async fn dashboard(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let readings = state.query.recent(state.dashboard_limit).await?;
    Ok(Html(render(&readings)))
}

pub fn render(readings: &[StoredReading]) -> String {
    let mut rows = String::new();
    for r in readings {
        let class = if r.status == HEALTHY { "ok" } else { "fault" };
        rows.push_str(&format!(
            "<tr class=\"{class}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            html_escape(&format_timestamp(&r.timestamp)),
            html_escape(&r.panel_id),
            measurement(r.voltage, "V"),
            measurement(r.current, "mA"),
            measurement(r.load, "%"),
            measurement(r.temperature, "°C"),
            html_escape(&r.status),
        ));
    }

    if readings.is_empty() {
        rows.push_str("<tr><td colspan=\"7\" class=\"empty\">No readings yet</td></tr>");
    }

    format!(
        r#"<!doctype html>
<html>
<head>
    <meta charset="utf-8">
    <meta http-equiv="refresh" content="10">
    <title>Solar Panel Monitor</title>
    <style>
        body {{ font-family: system-ui; padding: 2rem; background: #1a1a2e; color: #eee; }}
        table {{ border-collapse: collapse; width: 100%; }}
        th, td {{ padding: 0.4rem 0.8rem; text-align: left; border-bottom: 1px solid #333; }}
        tr.ok td:last-child {{ color: #6bff95; }}
        tr.fault td:last-child {{ color: #ff6b6b; font-weight: bold; }}
        td.empty {{ color: #888; text-align: center; }}
    </style>
</head>
<body>
    <h1>Solar Panel Monitor</h1>
    <table>
        <thead>
            <tr><th>Time (UTC)</th><th>Panel</th><th>Voltage</th><th>Current</th><th>Load</th><th>Temperature</th><th>Status</th></tr>
        </thead>
        <tbody>
{rows}
        </tbody>
    </table>
</body>
</html>"#
    )
}

fn measurement(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{v} {unit}"),
        None => "n/a".to_owned(),
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
