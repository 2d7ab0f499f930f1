//! Device-side contract for smart-plug synchronization.
//!
//! - **[`PlugClient`]**: Blocking RPC surface for one addressed plug (or one
//!   outlet of a power strip). Every call may fail with a device rejection or
//!   a transport error; callers are expected to run it off the async runtime.
//!
//! - **Payload types** ([`SysInfo`], [`ChildOutlet`], [`RealtimeMeter`],
//!   [`DailyHistory`]): The raw shapes a device reports.
//!
//! - **[`SimulatedPlug`]**: In-memory device with fault injection, used by
//!   the CLI's `simulated` backend and by tests across the workspace.

pub mod client;
pub mod error;
pub mod sim;
pub mod types;

pub use client::PlugClient;
pub use error::{Error, Result};
pub use sim::{FaultKind, Operation, SimulatedPlug};
pub use types::{
    ChildOutlet, DailyHistory, RealtimeMeter, SWITCH_STATE_OFF, SWITCH_STATE_ON, SysInfo,
};
