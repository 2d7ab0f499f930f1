// ── Simulated device ──
//
// In-memory stand-in for a physical plug or power strip. Clones share
// the same device state, so `outlet()` views of one strip observe each
// other's switching just like child contexts of a real strip.

use std::collections::{BTreeMap, VecDeque};
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::trace;

use crate::client::PlugClient;
use crate::error::{Error, Result};
use crate::types::{
    ChildOutlet, DailyHistory, RealtimeMeter, SWITCH_STATE_OFF, SWITCH_STATE_ON, SysInfo,
};

/// Client operations, for call accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    SysInfo,
    Mac,
    Model,
    Alias,
    State,
    Children,
    HasEmeter,
    EmeterRealtime,
    EmeterDaily,
    TurnOn,
    TurnOff,
}

/// Kind of failure injected by [`SimulatedPlug::fail_next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    Device,
    Io,
}

#[derive(Debug)]
struct SimState {
    info: SysInfo,
    relay_on: bool,
    meter: Option<RealtimeMeter>,
    daily: DailyHistory,
    offline: bool,
    faults: VecDeque<FaultKind>,
    calls: BTreeMap<Operation, usize>,
}

/// A cloneable in-memory smart plug implementing [`PlugClient`].
#[derive(Debug, Clone)]
pub struct SimulatedPlug {
    host: String,
    context: Option<String>,
    state: Arc<Mutex<SimState>>,
}

impl SimulatedPlug {
    /// Create a device from a full sysinfo block. The relay starts off and
    /// metering is disabled.
    pub fn new(host: impl Into<String>, info: SysInfo) -> Self {
        Self {
            host: host.into(),
            context: None,
            state: Arc::new(Mutex::new(SimState {
                info,
                relay_on: false,
                meter: None,
                daily: DailyHistory::new(),
                offline: false,
                faults: VecDeque::new(),
                calls: BTreeMap::new(),
            })),
        }
    }

    /// Shorthand for a single-outlet plug.
    pub fn plug(host: impl Into<String>, mac: impl Into<String>, alias: impl Into<String>) -> Self {
        Self::new(
            host,
            SysInfo {
                alias: alias.into(),
                model: "HS100(US)".into(),
                mac: mac.into(),
                sw_ver: "1.0.0".into(),
                hw_ver: None,
                children: Vec::new(),
            },
        )
    }

    /// Shorthand for a multi-outlet strip. Address an outlet with [`outlet()`](Self::outlet).
    pub fn strip(
        host: impl Into<String>,
        mac: impl Into<String>,
        alias: impl Into<String>,
        children: Vec<ChildOutlet>,
    ) -> Self {
        Self::new(
            host,
            SysInfo {
                alias: alias.into(),
                model: "HS300(US)".into(),
                mac: mac.into(),
                sw_ver: "1.0.0".into(),
                hw_ver: None,
                children,
            },
        )
    }

    pub fn with_relay(self, on: bool) -> Self {
        self.set_relay(on);
        self
    }

    /// Enable metering with the given realtime reading.
    pub fn with_meter(self, meter: RealtimeMeter) -> Self {
        self.set_meter(Some(meter));
        self
    }

    pub fn with_daily(self, daily: DailyHistory) -> Self {
        self.set_daily(daily);
        self
    }

    /// A view of this device addressing one child outlet. Shares state
    /// with `self`.
    pub fn outlet(&self, id: impl Into<String>) -> Self {
        Self {
            host: self.host.clone(),
            context: Some(id.into()),
            state: Arc::clone(&self.state),
        }
    }

    // ── Scenario controls ────────────────────────────────────────

    pub fn set_relay(&self, on: bool) {
        self.lock().relay_on = on;
    }

    /// `None` turns metering off entirely.
    pub fn set_meter(&self, meter: Option<RealtimeMeter>) {
        self.lock().meter = meter;
    }

    pub fn set_daily(&self, daily: DailyHistory) {
        self.lock().daily = daily;
    }

    /// While offline, every call fails with `ConnectionRefused`.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Fail the next `count` calls (of any operation) with `kind`.
    pub fn fail_next(&self, count: usize, kind: FaultKind) {
        let mut state = self.lock();
        state.faults.extend(std::iter::repeat_n(kind, count));
    }

    /// Number of times `op` has been invoked, including failed calls.
    pub fn calls(&self, op: Operation) -> usize {
        self.lock().calls.get(&op).copied().unwrap_or_default()
    }

    pub fn relay_on(&self) -> bool {
        self.lock().relay_on
    }

    /// State field of child outlet `id`, if it exists.
    pub fn child_state(&self, id: &str) -> Option<u8> {
        self.lock()
            .info
            .children
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.state)
    }

    // ── Internals ────────────────────────────────────────────────

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the call and apply any pending fault before handing out state.
    fn enter(&self, op: Operation) -> Result<MutexGuard<'_, SimState>> {
        let mut state = self.lock();
        *state.calls.entry(op).or_default() += 1;
        trace!(host = %self.host, ?op, "simulated call");

        if state.offline {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                format!("{} is unreachable", self.host),
            )));
        }
        match state.faults.pop_front() {
            Some(FaultKind::Io) => Err(Error::Io(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("{} timed out", self.host),
            ))),
            Some(FaultKind::Device) => Err(Error::device(format!(
                "{} rejected {op:?}",
                self.host
            ))),
            None => Ok(state),
        }
    }

    fn switch(&self, op: Operation, on: bool) -> Result<()> {
        let mut state = self.enter(op)?;
        match self.context.as_deref() {
            None => state.relay_on = on,
            Some(id) => {
                let child = state
                    .info
                    .children
                    .iter_mut()
                    .find(|c| c.id == id)
                    .ok_or_else(|| Error::device(format!("no outlet with id {id}")))?;
                child.state = u8::from(on);
            }
        }
        Ok(())
    }

    fn meter_or_reject(state: &SimState) -> Result<RealtimeMeter> {
        state
            .meter
            .ok_or_else(|| Error::device("device has no energy meter"))
    }
}

impl PlugClient for SimulatedPlug {
    fn host(&self) -> &str {
        &self.host
    }

    fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    fn sys_info(&self) -> Result<SysInfo> {
        Ok(self.enter(Operation::SysInfo)?.info.clone())
    }

    fn mac(&self) -> Result<String> {
        Ok(self.enter(Operation::Mac)?.info.mac.clone())
    }

    fn model(&self) -> Result<String> {
        Ok(self.enter(Operation::Model)?.info.model.clone())
    }

    fn alias(&self) -> Result<String> {
        Ok(self.enter(Operation::Alias)?.info.alias.clone())
    }

    fn state(&self) -> Result<String> {
        let state = self.enter(Operation::State)?;
        let raw = if state.relay_on {
            SWITCH_STATE_ON
        } else {
            SWITCH_STATE_OFF
        };
        Ok(raw.to_owned())
    }

    fn children(&self) -> Result<Vec<ChildOutlet>> {
        Ok(self.enter(Operation::Children)?.info.children.clone())
    }

    fn has_emeter(&self) -> Result<bool> {
        Ok(self.enter(Operation::HasEmeter)?.meter.is_some())
    }

    fn emeter_realtime(&self) -> Result<RealtimeMeter> {
        let state = self.enter(Operation::EmeterRealtime)?;
        Self::meter_or_reject(&state)
    }

    fn emeter_daily(&self) -> Result<DailyHistory> {
        let state = self.enter(Operation::EmeterDaily)?;
        Self::meter_or_reject(&state)?;
        Ok(state.daily.clone())
    }

    fn turn_on(&self) -> Result<()> {
        self.switch(Operation::TurnOn, true)
    }

    fn turn_off(&self) -> Result<()> {
        self.switch(Operation::TurnOff, false)
    }
}
