//! Command handlers.

pub mod config_cmd;
pub mod power;
pub mod status;
pub mod watch;

use crate::cli::Command;
use crate::config::Session;
use crate::error::CliError;

/// Route a device command to its handler.
pub async fn dispatch(cmd: Command, session: &Session) -> Result<(), CliError> {
    match cmd {
        Command::Status(args) => status::handle(&args, session).await,
        Command::Watch(args) => watch::handle(&args, session).await,
        Command::On(args) => power::handle(&args, power::Switch::On, session).await,
        Command::Off(args) => power::handle(&args, power::Switch::Off, session).await,
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal {
            message: "command does not need a plug session".into(),
        }),
    }
}
