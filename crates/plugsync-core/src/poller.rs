// ── Per-device poller ──
//
// One task owns one synchronizer. It refreshes on a fixed schedule and
// executes host commands in between, so a device's refresh cycles and
// control actions never overlap. Every outcome is published on a watch
// channel for readers.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::command::{Command, CommandEnvelope, CommandResult};
use crate::error::CoreError;
use crate::model::PlugState;
use crate::stream::StateStream;
use crate::synchronizer::PlugSynchronizer;

const COMMAND_CHANNEL_SIZE: usize = 16;

/// Host-side handle to a running poller.
///
/// Cheaply cloneable via `Arc<HandleInner>`.
#[derive(Clone)]
pub struct PlugHandle {
    inner: Arc<HandleInner>,
}

struct HandleInner {
    name: String,
    state: watch::Receiver<PlugState>,
    command_tx: mpsc::Sender<CommandEnvelope>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl PlugHandle {
    /// Spawn the poller task. The first refresh starts immediately; later
    /// cycles follow `poll_interval` from the synchronizer's config.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        name: impl Into<String>,
        synchronizer: PlugSynchronizer,
        cancel: CancellationToken,
    ) -> Self {
        let name = name.into();
        let (state_tx, state_rx) = watch::channel(synchronizer.state());
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let period = synchronizer.config().poll_interval;

        let task = tokio::spawn(poll_task(
            name.clone(),
            synchronizer,
            period,
            state_tx,
            command_rx,
            cancel.clone(),
        ));

        Self {
            inner: Arc::new(HandleInner {
                name,
                state: state_rx,
                command_tx,
                cancel,
                task: Mutex::new(Some(task)),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Most recently published state.
    pub fn state(&self) -> PlugState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> StateStream {
        StateStream::new(self.inner.state.clone())
    }

    /// Run a refresh cycle now and return the resulting state. Waits for
    /// any cycle already in progress.
    pub async fn refresh(&self) -> Result<PlugState, CoreError> {
        match self.send(Command::Refresh).await? {
            CommandResult::State(state) => Ok(state),
            CommandResult::Ok => Ok(self.state()),
        }
    }

    pub async fn turn_on(&self) -> Result<(), CoreError> {
        self.send(Command::TurnOn).await.map(|_| ())
    }

    pub async fn turn_off(&self) -> Result<(), CoreError> {
        self.send(Command::TurnOff).await.map(|_| ())
    }

    /// Send a command to the poller and wait for its result.
    pub async fn send(&self, command: Command) -> Result<CommandResult, CoreError> {
        let (response_tx, response_rx) = oneshot::channel();
        self.inner
            .command_tx
            .send(CommandEnvelope {
                command,
                response_tx,
            })
            .await
            .map_err(|_| self.stopped())?;
        response_rx.await.map_err(|_| self.stopped())?
    }

    /// Stop the poller and wait for its task to exit.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let task = self.inner.task.lock().await.take();
        if let Some(task) = task {
            let _ = task.await;
        }
    }

    pub fn is_running(&self) -> bool {
        !self.inner.command_tx.is_closed()
    }

    fn stopped(&self) -> CoreError {
        CoreError::PollerStopped {
            name: self.inner.name.clone(),
        }
    }
}

impl std::fmt::Debug for PlugHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlugHandle")
            .field("name", &self.inner.name)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

// ── Background task ──────────────────────────────────────────────

async fn poll_task(
    name: String,
    mut synchronizer: PlugSynchronizer,
    period: Duration,
    state_tx: watch::Sender<PlugState>,
    mut rx: mpsc::Receiver<CommandEnvelope>,
    cancel: CancellationToken,
) {
    info!(plug = %name, host = %synchronizer.host(), "poller started");

    // Refresh before the plug is first exposed.
    if !refresh_or_cancel(&mut synchronizer, &cancel).await {
        return;
    }
    state_tx.send_replace(synchronizer.state());

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                debug!(plug = %name, command = ?envelope.command, "executing command");
                let result =
                    route_command(&name, &mut synchronizer, envelope.command, &cancel).await;
                state_tx.send_replace(synchronizer.state());
                let _ = envelope.response_tx.send(result);
            }
            _ = interval.tick() => {
                if !refresh_or_cancel(&mut synchronizer, &cancel).await {
                    break;
                }
                state_tx.send_replace(synchronizer.state());
            }
        }
    }

    debug!(plug = %name, "poller stopped");
}

/// Returns `false` if cancelled before the cycle finished.
async fn refresh_or_cancel(
    synchronizer: &mut PlugSynchronizer,
    cancel: &CancellationToken,
) -> bool {
    tokio::select! {
        biased;
        () = cancel.cancelled() => false,
        () = synchronizer.refresh() => true,
    }
}

async fn route_command(
    name: &str,
    synchronizer: &mut PlugSynchronizer,
    command: Command,
    cancel: &CancellationToken,
) -> Result<CommandResult, CoreError> {
    match command {
        Command::Refresh => {
            if refresh_or_cancel(synchronizer, cancel).await {
                Ok(CommandResult::State(synchronizer.state()))
            } else {
                Err(CoreError::PollerStopped {
                    name: name.to_owned(),
                })
            }
        }
        Command::TurnOn => synchronizer.turn_on().await.map(|()| CommandResult::Ok),
        Command::TurnOff => synchronizer.turn_off().await.map(|()| CommandResult::Ok),
    }
}
