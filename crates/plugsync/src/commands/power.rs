//! `plugsync on` / `plugsync off`.

use tracing::info;

use plugsync_core::{CoreError, Fleet, PlugSynchronizer};

use crate::backend;
use crate::cli::PowerArgs;
use crate::config::Session;
use crate::error::CliError;
use crate::output;

use super::status::PlugStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Switch {
    On,
    Off,
}

pub async fn handle(args: &PowerArgs, switch: Switch, session: &Session) -> Result<(), CliError> {
    let (name, entry) = session.plug(&args.name)?;
    let client = backend::connect(name, entry).map_err(|e| CliError::from(e).for_plug(name))?;

    let mut fleet = Fleet::new(session.fleet.clone());
    let mut sync = fleet.synchronizer(client);
    let result = apply(&mut sync, switch).await;
    fleet.shutdown().await;
    result.map_err(|e| CliError::from(e).for_plug(name))?;

    info!(plug = name, ?switch, "switched");
    let status = PlugStatus::from_synchronizer(name, &sync);
    let rendered = output::render_single(session.output, &status, |s| s.line(session.color))?;
    output::print_output(&rendered, session.quiet);
    Ok(())
}

/// Resolve the plug, switch it, and leave the synchronizer holding the
/// resulting state. `turn_on` leaves the cache stale, so it is followed by
/// a refresh; `turn_off` re-reads the relay itself.
async fn apply(sync: &mut PlugSynchronizer, switch: Switch) -> Result<(), CoreError> {
    sync.refresh().await;
    match switch {
        Switch::On => {
            sync.turn_on().await?;
            sync.refresh().await;
        }
        Switch::Off => sync.turn_off().await?,
    }
    Ok(())
}
