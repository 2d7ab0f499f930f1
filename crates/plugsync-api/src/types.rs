// ── Device payloads ──
//
// Shapes reported by the device. Field names follow the device's own
// JSON keys so the types deserialize straight from a sysinfo dump.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Value of [`PlugClient::state`](crate::PlugClient::state) when the relay is closed.
pub const SWITCH_STATE_ON: &str = "ON";
/// Value of [`PlugClient::state`](crate::PlugClient::state) when the relay is open.
pub const SWITCH_STATE_OFF: &str = "OFF";

/// System information block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SysInfo {
    pub alias: String,
    pub model: String,
    pub mac: String,
    pub sw_ver: String,
    #[serde(default)]
    pub hw_ver: Option<String>,
    /// Present only on multi-outlet strips.
    #[serde(default)]
    pub children: Vec<ChildOutlet>,
}

/// One outlet of a power strip, as listed in the parent's sysinfo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildOutlet {
    pub id: String,
    pub alias: String,
    /// `1` when the outlet relay is on.
    pub state: u8,
}

impl ChildOutlet {
    pub fn is_on(&self) -> bool {
        self.state == 1
    }
}

/// Instantaneous energy-meter reading.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RealtimeMeter {
    /// Watts.
    pub power: f64,
    /// Cumulative kWh.
    pub total: f64,
    /// Volts.
    pub voltage: f64,
    /// Amperes.
    pub current: f64,
}

/// Daily energy history for the current month: day-of-month -> kWh.
pub type DailyHistory = BTreeMap<u32, f64>;
