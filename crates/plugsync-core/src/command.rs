// ── Command API ──
//
// Control and on-demand refresh requests travel through the poller's
// command channel, so they are serialized with scheduled refreshes of
// the same device.

use tokio::sync::oneshot;

use crate::error::CoreError;
use crate::model::PlugState;

/// A command envelope sent through the command channel.
/// Contains the command and a oneshot response channel.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: oneshot::Sender<Result<CommandResult, CoreError>>,
}

/// Operations a host can request from a running poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Run a full refresh cycle now.
    Refresh,
    /// Switch on. The cached state follows on the next refresh.
    TurnOn,
    /// Switch off and re-read the relay state immediately.
    TurnOff,
}

/// Result of a successfully executed [`Command`].
#[derive(Debug, Clone)]
pub enum CommandResult {
    Ok,
    /// State published after the command ran.
    State(PlugState),
}
