// Shared fixtures for plugsync-core integration tests.
#![allow(dead_code, clippy::unwrap_used)]

use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

use plugsync_api::{ChildOutlet, DailyHistory, RealtimeMeter, SimulatedPlug};
use plugsync_core::{PlugSynchronizer, SyncConfig, WorkerPool};

pub const TODAY: u32 = 17;

pub fn today() -> u32 {
    TODAY
}

// ── Warning capture ─────────────────────────────────────────────────

/// Records the message of every WARN event on the current thread.
#[derive(Clone, Default)]
pub struct WarnCapture {
    lines: Arc<Mutex<Vec<String>>>,
}

impl WarnCapture {
    /// Install as the thread-local default subscriber. Keep the guard alive
    /// for the duration of the test.
    pub fn install() -> (Self, DefaultGuard) {
        let capture = Self::default();
        let subscriber = tracing_subscriber::registry().with(capture.clone());
        let guard = tracing::subscriber::set_default(subscriber);
        (capture, guard)
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn count_containing(&self, needle: &str) -> usize {
        self.lines().iter().filter(|l| l.contains(needle)).count()
    }

    pub fn clear(&self) {
        self.lines.lock().unwrap().clear();
    }
}

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S: Subscriber> Layer<S> for WarnCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            let mut visitor = MessageVisitor(String::new());
            event.record(&mut visitor);
            self.lines.lock().unwrap().push(visitor.0);
        }
    }
}

// ── Devices ─────────────────────────────────────────────────────────

pub fn meter() -> RealtimeMeter {
    RealtimeMeter {
        power: 12.34,
        total: 1.234,
        voltage: 120.1,
        current: 0.12,
    }
}

pub fn metering_plug() -> SimulatedPlug {
    let mut daily = DailyHistory::new();
    daily.insert(TODAY - 1, 0.789);
    daily.insert(TODAY, 0.456);
    SimulatedPlug::plug("192.168.1.20", "50:C7:BF:12:34:56", "Kitchen")
        .with_relay(true)
        .with_meter(meter())
        .with_daily(daily)
}

pub fn plain_plug() -> SimulatedPlug {
    SimulatedPlug::plug("192.168.1.21", "50:C7:BF:12:34:57", "Hallway")
}

pub fn strip() -> SimulatedPlug {
    SimulatedPlug::strip(
        "192.168.1.30",
        "50:C7:BF:AA:BB:CC",
        "Desk strip",
        vec![
            ChildOutlet {
                id: "79".into(),
                alias: "Monitor".into(),
                state: 0,
            },
            ChildOutlet {
                id: "80".into(),
                alias: "Lamp".into(),
                state: 1,
            },
            ChildOutlet {
                id: "81".into(),
                alias: "Speaker".into(),
                state: 0,
            },
        ],
    )
}

// ── Synchronizers ───────────────────────────────────────────────────

pub fn synchronizer(plug: &SimulatedPlug) -> PlugSynchronizer {
    PlugSynchronizer::new(
        Arc::new(plug.clone()),
        WorkerPool::new(2),
        SyncConfig::default(),
    )
    .with_day_source(today)
}
