//! Local mirror of smart-plug state over an unreliable blocking client.
//!
//! - **[`PlugSynchronizer`]**: Owns one device's cached identity, snapshot
//!   and availability. [`refresh()`](PlugSynchronizer::refresh) runs a
//!   bounded retry cycle (20 attempts, 2 s apart by default); availability
//!   drops only when the whole cycle fails.
//!
//! - **[`WorkerPool`]**: Bounded dispatcher that runs blocking device calls
//!   on tokio's blocking pool so one stuck plug cannot stall the rest.
//!
//! - **[`PlugHandle`]**: A poller task per device: scheduled refreshes plus
//!   a command channel for on/off, serialized against each other.
//!   State is published through a [`StateStream`].
//!
//! - **[`Fleet`]**: Named registry of pollers sharing one pool.
//!
//! - **Domain model** ([`model`]): [`DeviceIdentity`], [`PlugSnapshot`],
//!   [`MeterReadings`] and the host-facing [`PlugState`].

pub mod command;
pub mod config;
pub mod error;
pub mod fleet;
pub mod model;
pub mod poller;
pub mod stream;
pub mod synchronizer;
pub mod worker;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{Command, CommandResult};
pub use config::{
    DEFAULT_POLL_INTERVAL, DEFAULT_WORKERS, FleetConfig, MAX_ATTEMPTS, SLEEP_TIME, SyncConfig,
};
pub use error::CoreError;
pub use fleet::Fleet;
pub use poller::PlugHandle;
pub use stream::{StateStream, StateWatchStream};
pub use synchronizer::{AttemptOutcome, DaySource, PlugSynchronizer, local_day_of_month};
pub use worker::WorkerPool;

pub use model::{
    DeviceIdentity, MacAddress, MeterAttributes, MeterReadings, PlugSnapshot, PlugState,
};
