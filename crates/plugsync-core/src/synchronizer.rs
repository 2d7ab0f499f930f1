// ── Plug state synchronizer ──
//
// Mirrors one device's relay and meter state. `refresh()` runs a bounded
// retry cycle: each attempt ships its device I/O to the worker pool, and
// the wait between attempts is a tokio sleep so sibling devices keep
// making progress while this one is down.

use std::fmt;
use std::sync::Arc;

use chrono::{Datelike, Local, Utc};
use tracing::{debug, warn};

use plugsync_api::{ChildOutlet, PlugClient};

use crate::config::SyncConfig;
use crate::error::CoreError;
use crate::model::{
    DeviceIdentity, MacAddress, MeterAttributes, MeterReadings, PlugSnapshot, PlugState,
};
use crate::worker::WorkerPool;

/// Supplies the day-of-month used to pick today's entry from the daily
/// energy history.
pub type DaySource = fn() -> u32;

/// Day of month from the local clock. Best-effort around midnight and DST
/// transitions.
pub fn local_day_of_month() -> u32 {
    Local::now().day()
}

/// Result of a single [`PlugSynchronizer::attempt_update`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Ready,
    Failed,
}

impl AttemptOutcome {
    pub fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// Local mirror of one smart plug (or one outlet of a strip).
///
/// `refresh()` and `turn_off()` take `&mut self`; a synchronizer can never
/// run two refresh cycles at once. Hosts that share one across tasks wrap
/// it in a mutex or hand it to a [`PlugHandle`](crate::PlugHandle).
pub struct PlugSynchronizer {
    client: Arc<dyn PlugClient>,
    pool: WorkerPool,
    config: SyncConfig,
    day_source: DaySource,
    identity: Option<DeviceIdentity>,
    snapshot: Option<PlugSnapshot>,
    available: bool,
    cycles: u64,
}

impl PlugSynchronizer {
    /// Create a synchronizer. Nothing is fetched until the first
    /// [`refresh()`](Self::refresh); the plug starts unavailable.
    ///
    /// A `max_attempts` of zero is clamped to one so every cycle reaches
    /// the device at least once.
    pub fn new(client: Arc<dyn PlugClient>, pool: WorkerPool, mut config: SyncConfig) -> Self {
        config.max_attempts = config.max_attempts.max(1);
        Self {
            client,
            pool,
            config,
            day_source: local_day_of_month,
            identity: None,
            snapshot: None,
            available: false,
            cycles: 0,
        }
    }

    /// Override the clock used to look up today's energy.
    pub fn with_day_source(mut self, day_source: DaySource) -> Self {
        self.day_source = day_source;
        self
    }

    // ── Accessors ────────────────────────────────────────────────

    pub fn host(&self) -> &str {
        self.client.host()
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// `None` until the first attempt that reaches the device resolves it.
    pub fn identity(&self) -> Option<&DeviceIdentity> {
        self.identity.as_ref()
    }

    pub fn name(&self) -> Option<&str> {
        self.identity.as_ref().map(|i| i.alias.as_str())
    }

    pub fn unique_id(&self) -> Option<&str> {
        self.identity.as_ref().map(|i| i.unique_id.as_str())
    }

    pub fn snapshot(&self) -> Option<&PlugSnapshot> {
        self.snapshot.as_ref()
    }

    /// Last-known relay state; `false` before the first successful refresh.
    pub fn is_on(&self) -> bool {
        self.snapshot.as_ref().is_some_and(|s| s.is_on)
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Number of refresh cycles run to completion.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Formatted meter attributes, if the device meters energy.
    pub fn attributes(&self) -> Option<MeterAttributes> {
        self.snapshot
            .as_ref()
            .and_then(|s| s.meter.as_ref())
            .map(MeterReadings::attributes)
    }

    pub fn state(&self) -> PlugState {
        PlugState {
            identity: self.identity.clone(),
            snapshot: self.snapshot.clone(),
            available: self.available,
            cycles: self.cycles,
        }
    }

    // ── Refresh protocol ─────────────────────────────────────────

    /// Run one bounded-retry reconciliation cycle.
    ///
    /// Stops at the first successful attempt and marks the plug available.
    /// Only when every attempt fails does the plug become unavailable; the
    /// transition from available is logged once. Never returns an error.
    pub async fn refresh(&mut self) {
        let attempts = self.config.max_attempts;

        for attempt in 1..=attempts {
            if self.attempt_update().await.is_ready() {
                debug!(host = %self.host(), attempt, "refresh succeeded");
                self.available = true;
                self.cycles += 1;
                return;
            }
            tokio::time::sleep(self.config.retry_delay).await;
        }

        if self.available {
            let host = self.host();
            let alias = self.alias_label();
            warn!(host = %host, alias = %alias, "Could not read state for {host}|{alias}");
        }
        self.available = false;
        self.cycles += 1;
    }

    /// A single, unretried update attempt.
    ///
    /// Resolves the identity if still unknown, then replaces the snapshot.
    /// Device, transport and lookup failures are logged and reported as
    /// [`AttemptOutcome::Failed`]; nothing propagates.
    pub async fn attempt_update(&mut self) -> AttemptOutcome {
        let client = Arc::clone(&self.client);
        let known = self.identity.is_some();
        let today = (self.day_source)();

        let fetched = self
            .pool
            .run(move || fetch(client.as_ref(), known, today))
            .await
            .unwrap_or_else(|e| Fetched {
                identity: None,
                result: Err(e),
            });

        if self.identity.is_none() {
            self.identity = fetched.identity;
        }

        match fetched.result {
            Ok(snapshot) => {
                self.snapshot = Some(snapshot);
                AttemptOutcome::Ready
            }
            Err(e) => {
                let host = self.host();
                let alias = self.alias_label();
                let delay = self.config.retry_delay;
                warn!(
                    host = %host,
                    alias = %alias,
                    retry_in = ?delay,
                    error = %e,
                    "Retrying in {delay:?} for {host}|{alias} due to: {e}"
                );
                AttemptOutcome::Failed
            }
        }
    }

    // ── Control ──────────────────────────────────────────────────

    /// Switch the plug on. The cached state catches up on the next refresh.
    pub async fn turn_on(&self) -> Result<(), CoreError> {
        let client = Arc::clone(&self.client);
        self.pool.run(move || client.turn_on()).await??;
        debug!(host = %self.host(), "turned on");
        Ok(())
    }

    /// Switch the plug off, then re-read the relay state once so the cache
    /// reflects the change immediately.
    pub async fn turn_off(&mut self) -> Result<(), CoreError> {
        let client = Arc::clone(&self.client);
        let is_on = self
            .pool
            .run(move || -> Result<bool, CoreError> {
                client.turn_off()?;
                derive_is_on(client.as_ref())
            })
            .await??;

        match self.snapshot.as_mut() {
            Some(snapshot) => {
                snapshot.is_on = is_on;
                snapshot.updated_at = Utc::now();
            }
            None => self.snapshot = Some(PlugSnapshot::state_only(is_on)),
        }
        debug!(host = %self.host(), is_on, "turned off");
        Ok(())
    }

    fn alias_label(&self) -> &str {
        self.name().unwrap_or("unknown")
    }
}

impl fmt::Debug for PlugSynchronizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlugSynchronizer")
            .field("host", &self.host())
            .field("identity", &self.identity)
            .field("snapshot", &self.snapshot)
            .field("available", &self.available)
            .finish_non_exhaustive()
    }
}

// ── Blocking side ────────────────────────────────────────────────
//
// Everything below runs on a worker thread and only touches the client.

/// What one attempt learned. `identity` is set when this attempt resolved
/// it, even if reading the state afterwards failed.
struct Fetched {
    identity: Option<DeviceIdentity>,
    result: Result<PlugSnapshot, CoreError>,
}

fn fetch(client: &dyn PlugClient, identity_known: bool, today: u32) -> Fetched {
    let identity = if identity_known {
        None
    } else {
        match resolve_identity(client) {
            Ok(identity) => Some(identity),
            Err(e) => {
                return Fetched {
                    identity: None,
                    result: Err(e),
                };
            }
        }
    };

    Fetched {
        identity,
        result: read_snapshot(client, today),
    }
}

fn resolve_identity(client: &dyn PlugClient) -> Result<DeviceIdentity, CoreError> {
    let info = client.sys_info()?;
    let host = client.host().to_owned();
    let mac = MacAddress::new(client.mac()?);
    let model = client.model()?;

    let (alias, unique_id, outlet_id) = match client.context() {
        None => (client.alias()?, mac.to_string(), None),
        Some(outlet) => {
            let child = find_outlet(&info.children, client.host(), outlet)?;
            (child.alias.clone(), outlet.to_owned(), Some(outlet.to_owned()))
        }
    };

    debug!(host = %host, %unique_id, %alias, "resolved device identity");
    Ok(DeviceIdentity {
        host,
        mac,
        model,
        firmware_version: info.sw_ver,
        alias,
        unique_id,
        outlet_id,
    })
}

fn read_snapshot(client: &dyn PlugClient, today: u32) -> Result<PlugSnapshot, CoreError> {
    let is_on = derive_is_on(client)?;

    let meter = if client.has_emeter()? {
        let realtime = client.emeter_realtime()?;
        let daily = client.emeter_daily()?;
        let today_kwh = daily.get(&today).copied();
        if today_kwh.is_none() {
            debug!(host = %client.host(), day = today, "no daily energy entry for today");
        }
        Some(MeterReadings::from_realtime(realtime, today_kwh))
    } else {
        None
    };

    Ok(PlugSnapshot {
        is_on,
        meter,
        updated_at: Utc::now(),
    })
}

/// Parent devices compare the top-level state to the on sentinel; an
/// addressed outlet reads its own child record.
fn derive_is_on(client: &dyn PlugClient) -> Result<bool, CoreError> {
    match client.context() {
        None => Ok(client.state()? == client.on_state()),
        Some(outlet) => {
            let children = client.children()?;
            Ok(find_outlet(&children, client.host(), outlet)?.is_on())
        }
    }
}

fn find_outlet<'a>(
    children: &'a [ChildOutlet],
    host: &str,
    outlet: &str,
) -> Result<&'a ChildOutlet, CoreError> {
    children
        .iter()
        .find(|c| c.id == outlet)
        .ok_or_else(|| CoreError::OutletNotFound {
            host: host.to_owned(),
            outlet_id: outlet.to_owned(),
        })
}
