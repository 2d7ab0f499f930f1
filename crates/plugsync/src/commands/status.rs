//! `plugsync status`: one refresh cycle per plug, then a report.

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::Serialize;
use tabled::Tabled;
use tracing::debug;

use plugsync_core::{Fleet, MeterAttributes, PlugState, PlugSynchronizer};

use crate::backend;
use crate::cli::StatusArgs;
use crate::config::Session;
use crate::error::CliError;
use crate::output;

// ── Report model ────────────────────────────────────────────────────

/// One plug as printed by `status`, `watch`, `on` and `off`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlugStatus {
    pub name: String,
    pub host: String,
    pub alias: Option<String>,
    pub model: Option<String>,
    pub unique_id: Option<String>,
    pub on: bool,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meter: Option<MeterAttributes>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl PlugStatus {
    pub fn new(name: &str, host: &str, state: &PlugState) -> Self {
        let identity = state.identity.as_ref();
        Self {
            name: name.to_owned(),
            host: host.to_owned(),
            alias: identity.map(|i| i.alias.clone()),
            model: identity.map(|i| i.model.clone()),
            unique_id: identity.map(|i| i.unique_id.clone()),
            on: state.is_on(),
            available: state.available,
            meter: state.meter().map(plugsync_core::MeterReadings::attributes),
            updated_at: state.snapshot.as_ref().map(|s| s.updated_at),
        }
    }

    pub fn from_synchronizer(name: &str, sync: &PlugSynchronizer) -> Self {
        Self::new(name, sync.host(), &sync.state())
    }

    /// Single-line rendering for plain output and `watch`.
    pub fn line(&self, color: bool) -> String {
        let mut line = format!(
            "{} {}",
            self.name,
            output::power_label(self.on, self.available, color)
        );
        if let Some(ref meter) = self.meter {
            line.push_str(&format!(" {} W", meter.current_power_w));
            if let Some(ref today) = meter.today_energy_kwh {
                line.push_str(&format!(" {today} kWh today"));
            }
        }
        line
    }
}

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Host")]
    host: String,
    #[tabled(rename = "Alias")]
    alias: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Power (W)")]
    power: String,
    #[tabled(rename = "Total (kWh)")]
    total: String,
    #[tabled(rename = "Today (kWh)")]
    today: String,
    #[tabled(rename = "Voltage")]
    voltage: String,
    #[tabled(rename = "Current (A)")]
    current: String,
}

impl StatusRow {
    fn new(s: &PlugStatus, color: bool) -> Self {
        let meter = s.meter.as_ref();
        let text = |v: Option<&String>| v.cloned().unwrap_or_else(|| "-".into());
        Self {
            name: s.name.clone(),
            host: s.host.clone(),
            alias: s.alias.clone().unwrap_or_default(),
            state: output::power_label(s.on, s.available, color),
            power: text(meter.map(|m| &m.current_power_w)),
            total: text(meter.map(|m| &m.total_energy_kwh)),
            today: text(meter.and_then(|m| m.today_energy_kwh.as_ref())),
            voltage: text(meter.map(|m| &m.voltage)),
            current: text(meter.map(|m| &m.current_a)),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: &StatusArgs, session: &Session) -> Result<(), CliError> {
    let names: Vec<String> = args.name.iter().cloned().collect();
    let selected = session.select(&names)?;

    let mut fleet = Fleet::new(session.fleet.clone());
    let mut plugs = Vec::with_capacity(selected.len());
    for (name, entry) in selected {
        let client = backend::connect(name, entry).map_err(|e| CliError::from(e).for_plug(name))?;
        plugs.push((name, fleet.synchronizer(client)));
    }

    debug!(plugs = plugs.len(), "refreshing");
    join_all(plugs.iter_mut().map(|(_, sync)| sync.refresh())).await;
    fleet.shutdown().await;

    let statuses: Vec<PlugStatus> = plugs
        .iter()
        .map(|(name, sync)| PlugStatus::from_synchronizer(name, sync))
        .collect();

    let rendered = output::render_list(
        session.output,
        &statuses,
        |s| StatusRow::new(s, session.color),
        |s| s.line(session.color),
    )?;
    output::print_output(&rendered, session.quiet);
    Ok(())
}
