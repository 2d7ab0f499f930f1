//! Configuration for the plugsync CLI.
//!
//! A TOML file describing the plug fleet, layered under `PLUGSYNC_`
//! environment overrides, and translation to `plugsync_core::FleetConfig`.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use plugsync_core::{
    DEFAULT_POLL_INTERVAL, DEFAULT_WORKERS, FleetConfig, MAX_ATTEMPTS, SLEEP_TIME, SyncConfig,
};

/// Output formats the CLI understands. Kept in sync with its `--output` flag.
pub const OUTPUT_FORMATS: &[&str] = &["table", "json", "json-compact", "yaml", "plain"];

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl ConfigError {
    fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,

    /// Plugs keyed by the name used on the command line.
    #[serde(default)]
    pub plugs: BTreeMap<String, PlugEntry>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_workers")]
    pub workers: usize,

    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay_secs: default_retry_delay_secs(),
            poll_interval_secs: default_poll_interval_secs(),
            workers: default_workers(),
            output: default_output(),
        }
    }
}

fn default_max_attempts() -> u32 {
    MAX_ATTEMPTS
}
fn default_retry_delay_secs() -> u64 {
    SLEEP_TIME.as_secs()
}
fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL.as_secs()
}
fn default_workers() -> usize {
    DEFAULT_WORKERS
}
fn default_output() -> String {
    "table".into()
}

/// One configured plug, or one outlet of a strip when `outlet` is set.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlugEntry {
    /// Device address, e.g. "192.168.1.20".
    pub host: String,

    /// Client backend. Only "simulated" ships today.
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Child outlet id on a power strip.
    pub outlet: Option<String>,

    #[serde(default = "default_mac")]
    pub mac: String,

    /// Device alias; the plug name is used when unset.
    pub alias: Option<String>,

    /// Model string; defaults to a plug or strip model depending on `children`.
    pub model: Option<String>,

    #[serde(default = "default_firmware")]
    pub firmware: String,

    /// Initial relay state.
    #[serde(default)]
    pub on: bool,

    /// Realtime readings; metering is disabled when absent.
    pub meter: Option<MeterEntry>,

    /// Daily energy history: day of month → kWh.
    #[serde(default)]
    pub daily: BTreeMap<String, f64>,

    #[serde(default)]
    pub children: Vec<ChildEntry>,

    /// Every call fails as if the device were unreachable.
    #[serde(default)]
    pub offline: bool,

    /// Number of calls that fail before the device starts answering.
    #[serde(default)]
    pub fail_first: usize,
}

fn default_backend() -> String {
    Backend::Simulated.to_string()
}
fn default_mac() -> String {
    "00:00:00:00:00:00".into()
}
fn default_firmware() -> String {
    "1.0.0".into()
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct MeterEntry {
    pub power: f64,
    pub total: f64,
    pub voltage: f64,
    pub current: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ChildEntry {
    pub id: String,
    pub alias: String,
    #[serde(default)]
    pub on: bool,
}

/// Device client implementations a plug can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Simulated,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simulated => f.write_str("simulated"),
        }
    }
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simulated" => Ok(Self::Simulated),
            other => Err(ConfigError::invalid(
                "backend",
                format!("expected 'simulated', got '{other}'"),
            )),
        }
    }
}

impl PlugEntry {
    pub fn backend(&self) -> Result<Backend, ConfigError> {
        self.backend.parse()
    }

    /// Daily history with numeric day keys.
    pub fn daily_history(&self) -> Result<BTreeMap<u32, f64>, ConfigError> {
        self.daily
            .iter()
            .map(|(day, kwh)| match day.parse::<u32>() {
                Ok(d) if (1..=31).contains(&d) => Ok((d, *kwh)),
                _ => Err(ConfigError::invalid(
                    "daily",
                    format!("'{day}' is not a day of month"),
                )),
            })
            .collect()
    }
}

impl Config {
    /// Look up a plug by name.
    pub fn plug(&self, name: &str) -> Result<&PlugEntry, ConfigError> {
        self.plugs
            .get(name)
            .ok_or_else(|| ConfigError::invalid("plug", format!("no plug named '{name}'")))
    }

    /// Check everything `fleet_config()` and plug construction rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.defaults;
        if d.max_attempts < 1 {
            return Err(ConfigError::invalid("max_attempts", "must be at least 1"));
        }
        if d.workers < 1 {
            return Err(ConfigError::invalid("workers", "must be at least 1"));
        }
        if d.poll_interval_secs < 1 {
            return Err(ConfigError::invalid("poll_interval_secs", "must be at least 1"));
        }
        if !OUTPUT_FORMATS.contains(&d.output.as_str()) {
            return Err(ConfigError::invalid(
                "output",
                format!("expected one of {}, got '{}'", OUTPUT_FORMATS.join(", "), d.output),
            ));
        }

        for (name, plug) in &self.plugs {
            if plug.host.trim().is_empty() {
                return Err(ConfigError::invalid(
                    format!("plugs.{name}.host"),
                    "must not be empty",
                ));
            }
            plug.backend().map_err(|e| prefix_field(e, name))?;
            plug.daily_history().map_err(|e| prefix_field(e, name))?;
        }
        Ok(())
    }

    /// Render as pretty TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn prefix_field(err: ConfigError, plug: &str) -> ConfigError {
    match err {
        ConfigError::Validation { field, reason } => ConfigError::Validation {
            field: format!("plugs.{plug}.{field}"),
            reason,
        },
        other => other,
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "plugsync", "plugsync").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("plugsync");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
///
/// An explicit `path` must exist; the default location may be absent, in
/// which case only defaults and environment apply.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = match path {
        Some(p) if !p.exists() => {
            return Err(ConfigError::NotFound {
                path: p.to_path_buf(),
            });
        }
        Some(p) => p.to_path_buf(),
        None => config_path(),
    };

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("PLUGSYNC_").split("__"));

    let config: Config = figment.extract()?;
    config.validate()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config(None).unwrap_or_default()
}

// ── Translation to core ─────────────────────────────────────────────

/// Validate and build the runtime fleet configuration.
pub fn fleet_config(config: &Config) -> Result<FleetConfig, ConfigError> {
    config.validate()?;
    let d = &config.defaults;
    Ok(FleetConfig {
        workers: d.workers,
        sync: SyncConfig {
            max_attempts: d.max_attempts,
            retry_delay: Duration::from_secs(d.retry_delay_secs),
            poll_interval: Duration::from_secs(d.poll_interval_secs),
        },
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use figment::Jail;
    use pretty_assertions::assert_eq;

    use super::*;

    const FLEET: &str = r#"
        [defaults]
        poll_interval_secs = 10

        [plugs.kitchen]
        host = "192.168.1.20"
        mac = "50:C7:BF:12:34:56"
        on = true
        meter = { power = 12.34, total = 1.234, voltage = 120.1, current = 0.12 }
        daily = { "17" = 0.456 }

        [plugs.lamp]
        host = "192.168.1.30"
        outlet = "80"
        children = [
            { id = "79", alias = "Monitor" },
            { id = "80", alias = "Lamp", on = true },
        ]
    "#;

    #[test]
    fn defaults_match_core() {
        let cfg = Config::default();
        let fleet = fleet_config(&cfg).unwrap();
        assert_eq!(fleet, FleetConfig::default());
        assert!(cfg.plugs.is_empty());
    }

    #[test]
    fn loads_file_with_defaults_filled_in() {
        Jail::expect_with(|jail| {
            jail.create_file("plugsync.toml", FLEET)?;
            let cfg = load_config(Some(Path::new("plugsync.toml"))).map_err(|e| e.to_string())?;

            assert_eq!(cfg.defaults.poll_interval_secs, 10);
            assert_eq!(cfg.defaults.max_attempts, 20);
            assert_eq!(cfg.plugs.len(), 2);

            let kitchen = cfg.plug("kitchen").unwrap();
            assert_eq!(kitchen.backend().unwrap(), Backend::Simulated);
            assert!(kitchen.on);
            assert_eq!(kitchen.meter.unwrap().power, 12.34);
            assert_eq!(kitchen.daily_history().unwrap().get(&17), Some(&0.456));
            assert_eq!(kitchen.firmware, "1.0.0");

            let lamp = cfg.plug("lamp").unwrap();
            assert_eq!(lamp.outlet.as_deref(), Some("80"));
            assert!(lamp.children[1].on);
            assert!(!lamp.children[0].on);
            assert_eq!(lamp.mac, "00:00:00:00:00:00");
            Ok(())
        });
    }

    #[test]
    fn env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("plugsync.toml", FLEET)?;
            jail.set_env("PLUGSYNC_DEFAULTS__WORKERS", "8");
            jail.set_env("PLUGSYNC_DEFAULTS__POLL_INTERVAL_SECS", "45");

            let cfg = load_config(Some(Path::new("plugsync.toml"))).map_err(|e| e.to_string())?;
            let fleet = fleet_config(&cfg).map_err(|e| e.to_string())?;

            assert_eq!(fleet.workers, 8);
            assert_eq!(fleet.sync.poll_interval, Duration::from_secs(45));
            assert_eq!(fleet.sync.retry_delay, Duration::from_secs(2));
            Ok(())
        });
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        Jail::expect_with(|_jail| {
            let err = load_config(Some(Path::new("nope.toml"))).unwrap_err();
            assert!(matches!(err, ConfigError::NotFound { .. }));
            Ok(())
        });
    }

    #[test]
    fn rejects_unknown_backend() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "plugsync.toml",
                r#"
                [plugs.kettle]
                host = "10.0.0.5"
                backend = "zigbee"
                "#,
            )?;
            let err = load_config(Some(Path::new("plugsync.toml"))).unwrap_err();
            assert!(matches!(
                err,
                ConfigError::Validation { ref field, .. } if field == "plugs.kettle.backend"
            ));
            Ok(())
        });
    }

    #[test]
    fn rejects_zero_limits() {
        let mut cfg = Config::default();
        cfg.defaults.max_attempts = 0;
        assert!(matches!(
            fleet_config(&cfg),
            Err(ConfigError::Validation { ref field, .. }) if field == "max_attempts"
        ));

        let mut cfg = Config::default();
        cfg.defaults.workers = 0;
        assert!(fleet_config(&cfg).is_err());

        let mut cfg = Config::default();
        cfg.defaults.poll_interval_secs = 0;
        assert!(fleet_config(&cfg).is_err());

        let mut cfg = Config::default();
        cfg.defaults.output = "xml".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_bad_daily_keys() {
        let mut cfg = Config::default();
        let mut entry: PlugEntry = toml::from_str(r#"host = "10.0.0.5""#).unwrap();
        entry.daily.insert("32".into(), 1.0);
        cfg.plugs.insert("kettle".into(), entry);
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Validation { ref field, .. }) if field == "plugs.kettle.daily"
        ));
    }

    #[test]
    fn missing_default_file_falls_back_to_defaults() {
        Jail::expect_with(|jail| {
            let dir = jail.directory().display().to_string();
            jail.set_env("XDG_CONFIG_HOME", dir);
            assert_eq!(load_config_or_default(), Config::default());
            assert!(config_path().starts_with(jail.directory()));
            Ok(())
        });
    }

    #[test]
    fn unknown_plug_lookup() {
        assert!(Config::default().plug("attic").is_err());
    }

    #[test]
    fn round_trips_through_toml() {
        let cfg: Config = toml::from_str(FLEET).unwrap();
        let rendered = cfg.to_toml().unwrap();
        let back: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(back, cfg);
    }
}
