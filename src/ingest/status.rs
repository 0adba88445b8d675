use std::fmt;

/// Status recorded when no threshold is violated.
pub const HEALTHY: &str = "HEALTHY";

/// Separator between fault tags in a multi-fault status.
pub const FAULT_SEPARATOR: &str = " | ";

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Volts
const MAX_VOLTAGE: f64 = 5.5;
/// Volts
const MIN_VOLTAGE: f64 = 1.0;
/// Degrees Celsius
const MAX_TEMPERATURE: f64 = 60.0;
/// Degrees Celsius
const WARN_TEMPERATURE: f64 = 45.0;
/// Milliamps
const MAX_CURRENT: f64 = 1000.0;
/// Light percentage
const MIN_LOAD: f64 = 5.0;

// ---------------------------------------------------------------------------
// Fault
// ---------------------------------------------------------------------------

/// One threshold violation. Variants are declared in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
    OverVoltage,
    LowVoltage,
    OverTemp,
    HighTemp,
    OverCurrent,
    LowLoad,
}

impl Fault {
    pub fn tag(self) -> &'static str {
        match self {
            Fault::OverVoltage => "OVER_VOLTAGE",
            Fault::LowVoltage => "LOW_VOLTAGE",
            Fault::OverTemp => "OVER_TEMP",
            Fault::HighTemp => "HIGH_TEMP",
            Fault::OverCurrent => "OVER_CURRENT",
            Fault::LowLoad => "LOW_LOAD",
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Missing or non-finite measurements count as zero.
fn or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Every fault triggered by the given measurements, in evaluation order.
///
/// Categories are independent; within the voltage and temperature categories
/// only the most severe fault is reported.
pub fn faults(
    voltage: Option<f64>,
    current: Option<f64>,
    temperature: Option<f64>,
    load: Option<f64>,
) -> Vec<Fault> {
    let voltage = or_zero(voltage);
    let current = or_zero(current);
    let temperature = or_zero(temperature);
    let load = or_zero(load);

    let mut faults = Vec::new();

    if voltage > MAX_VOLTAGE {
        faults.push(Fault::OverVoltage);
    } else if voltage < MIN_VOLTAGE {
        faults.push(Fault::LowVoltage);
    }

    if temperature > MAX_TEMPERATURE {
        faults.push(Fault::OverTemp);
    } else if temperature > WARN_TEMPERATURE {
        faults.push(Fault::HighTemp);
    }

    if current > MAX_CURRENT {
        faults.push(Fault::OverCurrent);
    }

    if load < MIN_LOAD {
        faults.push(Fault::LowLoad);
    }

    faults
}

/// Derive the categorical status string for a reading: `"HEALTHY"` or the
/// triggered fault tags joined with `" | "`.
pub fn evaluate(
    voltage: Option<f64>,
    current: Option<f64>,
    temperature: Option<f64>,
    load: Option<f64>,
) -> String {
    let faults = faults(voltage, current, temperature, load);
    if faults.is_empty() {
        return HEALTHY.to_owned();
    }

    faults
        .iter()
        .map(|f| f.tag())
        .collect::<Vec<_>>()
        .join(FAULT_SEPARATOR)
}
