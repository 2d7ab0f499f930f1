//! CLI configuration: thin wrapper around `plugsync_config`.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--config, --output, etc.).

use std::path::PathBuf;

use clap::ValueEnum;

use plugsync_core::FleetConfig;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

// ── Re-exports from shared crate ────────────────────────────────────

pub use plugsync_config::{Backend, Config, PlugEntry, config_path, fleet_config, load_config};

// ── Resolved session ────────────────────────────────────────────────

/// Everything a device command needs, resolved once from file, env and flags.
#[derive(Debug)]
pub struct Session {
    pub config: Config,
    pub fleet: FleetConfig,
    pub path: PathBuf,
    pub output: OutputFormat,
    pub color: bool,
    pub quiet: bool,
}

impl Session {
    pub fn load(global: &GlobalOpts) -> Result<Self, CliError> {
        let config = load_config(global.config.as_deref())?;
        let fleet = fleet_config(&config)?;
        let output = resolve_output(global, &config)?;
        Ok(Self {
            config,
            fleet,
            path: effective_path(global),
            output,
            color: output::should_color(global.color),
            quiet: global.quiet,
        })
    }

    /// Select plugs by name, or every configured plug when `names` is empty.
    pub fn select<'a>(
        &'a self,
        names: &[String],
    ) -> Result<Vec<(&'a str, &'a PlugEntry)>, CliError> {
        if names.is_empty() {
            if self.config.plugs.is_empty() {
                return Err(CliError::NoPlugs {
                    path: self.path.display().to_string(),
                });
            }
            return Ok(self
                .config
                .plugs
                .iter()
                .map(|(name, entry)| (name.as_str(), entry))
                .collect());
        }

        names.iter().map(|name| self.plug(name)).collect()
    }

    pub fn plug<'a>(&'a self, name: &str) -> Result<(&'a str, &'a PlugEntry), CliError> {
        self.config
            .plugs
            .get_key_value(name)
            .map(|(name, entry)| (name.as_str(), entry))
            .ok_or_else(|| CliError::PlugNotFound {
                name: name.to_owned(),
                available: self.available(),
            })
    }

    fn available(&self) -> String {
        if self.config.plugs.is_empty() {
            return "(none)".into();
        }
        self.config
            .plugs
            .keys()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// ── CLI-specific helpers ────────────────────────────────────────────

/// Config file in effect: `--config` / `PLUGSYNC_CONFIG`, else the platform default.
pub fn effective_path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config_path)
}

/// `--output` wins over `defaults.output`.
pub fn resolve_output(global: &GlobalOpts, config: &Config) -> Result<OutputFormat, CliError> {
    if let Some(format) = global.output {
        return Ok(format);
    }
    OutputFormat::from_str(&config.defaults.output, true).map_err(|reason| CliError::InvalidConfig {
        field: "defaults.output".into(),
        reason,
    })
}
