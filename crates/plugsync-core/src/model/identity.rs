// ── Device identity ──
//
// Resolved once from the first successful sysinfo fetch and treated as
// static for the lifetime of the synchronizer.

use serde::{Deserialize, Serialize};

use super::mac::MacAddress;

pub const MANUFACTURER: &str = "TP-Link";

/// Static description of a synchronized plug or outlet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub host: String,
    /// Hardware address of the physical device (the parent, for strip outlets).
    pub mac: MacAddress,
    pub model: String,
    pub firmware_version: String,
    /// Display name: the device alias, or the outlet alias for strip outlets.
    pub alias: String,
    /// Stable id: the MAC for single plugs, the child context id for outlets.
    pub unique_id: String,
    /// Addressed child outlet, if any.
    pub outlet_id: Option<String>,
}

impl DeviceIdentity {
    pub fn manufacturer(&self) -> &'static str {
        MANUFACTURER
    }

    pub fn is_outlet(&self) -> bool {
        self.outlet_id.is_some()
    }
}
