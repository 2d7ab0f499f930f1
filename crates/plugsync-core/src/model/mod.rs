// ── Domain model ──
//
// Canonical representations of a synchronized plug. Everything here is
// plain data: the synchronizer produces it, the host reads it.

pub mod identity;
pub mod mac;
pub mod snapshot;

use serde::Serialize;

pub use identity::{DeviceIdentity, MANUFACTURER};
pub use mac::MacAddress;
pub use snapshot::{MeterAttributes, MeterReadings, PlugSnapshot};

/// Everything a host needs to render one plug.
///
/// Published by the poller after every refresh or command.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlugState {
    pub identity: Option<DeviceIdentity>,
    pub snapshot: Option<PlugSnapshot>,
    pub available: bool,
    /// Completed refresh cycles; zero until the first one ends.
    pub cycles: u64,
}

impl PlugState {
    /// Last-known relay state; `false` before the first successful refresh.
    pub fn is_on(&self) -> bool {
        self.snapshot.as_ref().is_some_and(|s| s.is_on)
    }

    pub fn meter(&self) -> Option<&MeterReadings> {
        self.snapshot.as_ref().and_then(|s| s.meter.as_ref())
    }

    /// Whether at least one refresh cycle has finished. Before that the
    /// state carries no information about the device.
    pub fn has_refreshed(&self) -> bool {
        self.cycles > 0
    }

    pub fn name(&self) -> Option<&str> {
        self.identity.as_ref().map(|i| i.alias.as_str())
    }
}
