// ── Plug snapshot ──
//
// Replaced wholesale on every successful attempt. Meter values stay typed;
// `MeterAttributes` is the fixed-precision rendering hosts display.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use plugsync_api::RealtimeMeter;

/// Last-known state of one plug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlugSnapshot {
    pub is_on: bool,
    /// Present only when the device advertises metering.
    pub meter: Option<MeterReadings>,
    pub updated_at: DateTime<Utc>,
}

impl PlugSnapshot {
    /// Snapshot carrying relay state only.
    pub fn state_only(is_on: bool) -> Self {
        Self {
            is_on,
            meter: None,
            updated_at: Utc::now(),
        }
    }
}

/// Energy-meter values for metering-capable devices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeterReadings {
    pub current_power_w: f64,
    pub total_energy_kwh: f64,
    pub voltage: f64,
    pub current_a: f64,
    /// Absent when the daily history has no entry for today.
    pub today_energy_kwh: Option<f64>,
}

impl MeterReadings {
    pub fn from_realtime(meter: RealtimeMeter, today_energy_kwh: Option<f64>) -> Self {
        Self {
            current_power_w: meter.power,
            total_energy_kwh: meter.total,
            voltage: meter.voltage,
            current_a: meter.current,
            today_energy_kwh,
        }
    }

    pub fn attributes(&self) -> MeterAttributes {
        MeterAttributes {
            current_power_w: format!("{:.2}", self.current_power_w),
            total_energy_kwh: format!("{:.3}", self.total_energy_kwh),
            voltage: format!("{:.1}", self.voltage),
            current_a: format!("{:.2}", self.current_a),
            today_energy_kwh: self.today_energy_kwh.map(|kwh| format!("{kwh:.3}")),
        }
    }
}

/// Display rendering of [`MeterReadings`], keyed by the state attribute names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeterAttributes {
    pub current_power_w: String,
    pub total_energy_kwh: String,
    pub voltage: String,
    pub current_a: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub today_energy_kwh: Option<String>,
}
