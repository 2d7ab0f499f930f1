//! Device client construction from config entries.

use std::sync::Arc;

use tracing::debug;

use plugsync_api::{ChildOutlet, FaultKind, PlugClient, RealtimeMeter, SimulatedPlug, SysInfo};
use plugsync_config::ConfigError;
use plugsync_core::CoreError;

use crate::config::{Backend, PlugEntry};

const PLUG_MODEL: &str = "HS100(US)";
const METERING_PLUG_MODEL: &str = "HS110(US)";
const STRIP_MODEL: &str = "HS300(US)";

/// Build the client for one configured plug.
pub fn connect(name: &str, entry: &PlugEntry) -> Result<Arc<dyn PlugClient>, CoreError> {
    let backend = entry.backend().map_err(config_error)?;
    debug!(plug = name, host = %entry.host, %backend, "building client");
    match backend {
        Backend::Simulated => Ok(Arc::new(simulate(name, entry).map_err(config_error)?)),
    }
}

fn config_error(err: ConfigError) -> CoreError {
    CoreError::Config {
        message: err.to_string(),
    }
}

/// An in-memory device seeded from `entry`.
fn simulate(name: &str, entry: &PlugEntry) -> Result<SimulatedPlug, ConfigError> {
    let children: Vec<ChildOutlet> = entry
        .children
        .iter()
        .map(|c| ChildOutlet {
            id: c.id.clone(),
            alias: c.alias.clone(),
            state: u8::from(c.on),
        })
        .collect();

    let model = entry.model.clone().unwrap_or_else(|| {
        let default = match (children.is_empty(), entry.meter.is_some()) {
            (false, _) => STRIP_MODEL,
            (true, true) => METERING_PLUG_MODEL,
            (true, false) => PLUG_MODEL,
        };
        default.to_owned()
    });

    let device = SimulatedPlug::new(
        entry.host.clone(),
        SysInfo {
            alias: entry.alias.clone().unwrap_or_else(|| name.to_owned()),
            model,
            mac: entry.mac.clone(),
            sw_ver: entry.firmware.clone(),
            hw_ver: None,
            children,
        },
    )
    .with_relay(entry.on)
    .with_daily(entry.daily_history()?);

    if let Some(m) = entry.meter {
        device.set_meter(Some(RealtimeMeter {
            power: m.power,
            total: m.total,
            voltage: m.voltage,
            current: m.current,
        }));
    }
    device.set_offline(entry.offline);
    device.fail_next(entry.fail_first, FaultKind::Io);

    Ok(match entry.outlet.as_deref() {
        Some(id) => device.outlet(id),
        None => device,
    })
}
