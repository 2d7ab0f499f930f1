//! `plugsync watch`: run a poller per plug until Ctrl-C.

use std::collections::BTreeMap;

use futures_util::StreamExt;
use futures_util::stream::{self, BoxStream};
use tracing::info;

use plugsync_core::Fleet;

use crate::backend;
use crate::cli::{OutputFormat, WatchArgs};
use crate::config::Session;
use crate::error::CliError;
use crate::output;

use super::status::PlugStatus;

pub async fn handle(args: &WatchArgs, session: &Session) -> Result<(), CliError> {
    let selected = session.select(&args.names)?;

    let mut fleet = Fleet::new(session.fleet.clone());
    let mut updates: Vec<BoxStream<'static, PlugStatus>> = Vec::with_capacity(selected.len());
    for (name, entry) in selected {
        let client = backend::connect(name, entry).map_err(|e| CliError::from(e).for_plug(name))?;
        let handle = fleet.add(name, client)?;
        let (name, host) = (name.to_owned(), entry.host.clone());
        updates.push(
            handle
                .subscribe()
                .into_stream()
                .filter(|state| std::future::ready(state.has_refreshed()))
                .map(move |state| PlugStatus::new(&name, &host, &state))
                .boxed(),
        );
    }
    info!(plugs = fleet.len(), "watching; press Ctrl-C to stop");

    let result = print_changes(stream::select_all(updates), args.count, session).await;
    fleet.shutdown().await;
    result
}

/// Print each status that differs from the last one printed for that plug.
async fn print_changes(
    mut updates: stream::SelectAll<BoxStream<'static, PlugStatus>>,
    limit: Option<usize>,
    session: &Session,
) -> Result<(), CliError> {
    let mut last: BTreeMap<String, PlugStatus> = BTreeMap::new();
    let mut printed = 0usize;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                return Ok(());
            }
            update = updates.next() => {
                let Some(status) = update else { return Ok(()) };
                if last.get(&status.name).is_some_and(|prev| same_state(prev, &status)) {
                    continue;
                }

                output::print_output(&render(&status, session)?, session.quiet);
                last.insert(status.name.clone(), status);
                printed += 1;
                if limit.is_some_and(|n| printed >= n) {
                    return Ok(());
                }
            }
        }
    }
}

/// Timestamps aside, nothing changed.
fn same_state(a: &PlugStatus, b: &PlugStatus) -> bool {
    a.on == b.on && a.available == b.available && a.meter == b.meter && a.alias == b.alias
}

fn render(status: &PlugStatus, session: &Session) -> Result<String, CliError> {
    match session.output {
        OutputFormat::Table | OutputFormat::Plain => {
            let stamp = status
                .updated_at
                .map(|t| t.format("%H:%M:%S").to_string())
                .unwrap_or_else(|| "--:--:--".into());
            Ok(format!("{stamp} {}", status.line(session.color)))
        }
        // One document per line keeps the stream machine-readable.
        OutputFormat::Json | OutputFormat::JsonCompact => output::render_json(status, true),
        OutputFormat::Yaml => Ok(format!("---\n{}", output::render_yaml(status)?.trim_end())),
    }
}

#[cfg(test)]
mod tests {
    use plugsync_core::PlugState;

    use super::*;

    #[test]
    fn timestamps_do_not_count_as_changes() {
        let a = PlugStatus::new("kitchen", "10.0.0.1", &PlugState::default());
        let mut b = a.clone();
        b.updated_at = Some(chrono::Utc::now());
        assert!(same_state(&a, &b));

        b.available = true;
        assert!(!same_state(&a, &b));
    }
}
