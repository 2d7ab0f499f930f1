// ── Blocking device client ──
//
// The synchronizer treats the device as an opaque, synchronous RPC
// endpoint. Implementations may block for as long as the transport
// allows; callers dispatch them onto a worker pool.

use crate::error::Result;
use crate::types::{ChildOutlet, DailyHistory, RealtimeMeter, SWITCH_STATE_ON, SysInfo};

/// Synchronous client for one addressed plug.
///
/// When [`context()`](Self::context) is `Some`, the client addresses a single
/// outlet of a multi-outlet strip; `sys_info`, `mac` and friends still
/// describe the parent device.
pub trait PlugClient: Send + Sync + 'static {
    /// Network address of the device. Infallible so it can label diagnostics
    /// while the device is unreachable.
    fn host(&self) -> &str;

    /// Addressed child-outlet id, if any.
    fn context(&self) -> Option<&str>;

    /// Sentinel that [`state()`](Self::state) returns when the relay is on.
    fn on_state(&self) -> &str {
        SWITCH_STATE_ON
    }

    fn sys_info(&self) -> Result<SysInfo>;

    fn mac(&self) -> Result<String>;

    fn model(&self) -> Result<String>;

    fn alias(&self) -> Result<String>;

    /// Top-level relay state of the parent device.
    fn state(&self) -> Result<String>;

    fn children(&self) -> Result<Vec<ChildOutlet>> {
        Ok(self.sys_info()?.children)
    }

    /// Whether the device advertises energy metering.
    fn has_emeter(&self) -> Result<bool>;

    fn emeter_realtime(&self) -> Result<RealtimeMeter>;

    fn emeter_daily(&self) -> Result<DailyHistory>;

    fn turn_on(&self) -> Result<()>;

    fn turn_off(&self) -> Result<()>;
}
