//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use plugsync_config::ConfigError;
use plugsync_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const CONFIG: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const DEVICE: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Devices ──────────────────────────────────────────────────────
    #[error("Could not reach {name}")]
    #[diagnostic(
        code(plugsync::unreachable),
        help(
            "The device did not answer: {reason}\n\
             Check that it is powered and on the network."
        )
    )]
    Unreachable { name: String, reason: String },

    #[error("Device rejected the request: {message}")]
    #[diagnostic(code(plugsync::device))]
    Device { message: String },

    #[error("Outlet '{outlet_id}' not found on {host}")]
    #[diagnostic(
        code(plugsync::outlet_not_found),
        help("Check the `outlet` setting against the strip's children.")
    )]
    OutletNotFound { host: String, outlet_id: String },

    // ── Plugs ────────────────────────────────────────────────────────
    #[error("Plug '{name}' not found")]
    #[diagnostic(
        code(plugsync::not_found),
        help("Configured plugs: {available}")
    )]
    PlugNotFound { name: String, available: String },

    #[error("Plug '{name}' is configured twice")]
    #[diagnostic(code(plugsync::conflict))]
    Conflict { name: String },

    #[error("No plugs configured")]
    #[diagnostic(
        code(plugsync::no_plugs),
        help(
            "Add a [plugs.<name>] table to your config file.\n\
             Expected at: {path}"
        )
    )]
    NoPlugs { path: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(plugsync::no_config),
        help("Pass an existing file with --config, or run `plugsync config path`.")
    )]
    NoConfig { path: String },

    #[error("Invalid configuration for {field}: {reason}")]
    #[diagnostic(code(plugsync::invalid_config))]
    InvalidConfig { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(code(plugsync::config))]
    Config(Box<ConfigError>),

    // ── Runtime ──────────────────────────────────────────────────────
    #[error("Internal error: {message}")]
    #[diagnostic(code(plugsync::internal))]
    Internal { message: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(plugsync::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    #[diagnostic(code(plugsync::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Unreachable { .. } => exit_code::CONNECTION,
            Self::Device { .. } | Self::OutletNotFound { .. } => exit_code::DEVICE,
            Self::PlugNotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::NoPlugs { .. }
            | Self::NoConfig { .. }
            | Self::InvalidConfig { .. }
            | Self::Config(_) => exit_code::CONFIG,
            Self::Internal { .. } | Self::Io(_) | Self::Json(_) | Self::Yaml(_) => {
                exit_code::GENERAL
            }
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NotFound { path } => CliError::NoConfig {
                path: path.display().to_string(),
            },
            ConfigError::Validation { field, reason } => CliError::InvalidConfig { field, reason },
            other => CliError::Config(Box::new(other)),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Transport { reason } => CliError::Unreachable {
                name: "device".into(),
                reason,
            },

            CoreError::Device { message } => CliError::Device { message },

            CoreError::OutletNotFound { host, outlet_id } => {
                CliError::OutletNotFound { host, outlet_id }
            }

            CoreError::PlugNotFound { name } => CliError::PlugNotFound {
                name,
                available: String::new(),
            },

            CoreError::DuplicatePlug { name } => CliError::Conflict { name },

            CoreError::Config { message } => CliError::InvalidConfig {
                field: "plug".into(),
                reason: message,
            },

            CoreError::Worker { reason } => CliError::Internal { message: reason },

            CoreError::PollerStopped { name } => CliError::Internal {
                message: format!("poller for {name} stopped"),
            },
        }
    }
}

impl CliError {
    /// Attach the plug name to errors that only know the device.
    pub fn for_plug(self, plug: &str) -> Self {
        match self {
            Self::Unreachable { reason, .. } => Self::Unreachable {
                name: plug.to_owned(),
                reason,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_stable() {
        let unreachable = CliError::from(CoreError::Transport {
            reason: "timed out".into(),
        });
        assert_eq!(unreachable.exit_code(), exit_code::CONNECTION);

        let device = CliError::from(CoreError::Device {
            message: "nope".into(),
        });
        assert_eq!(device.exit_code(), exit_code::DEVICE);

        let missing = CliError::from(ConfigError::NotFound {
            path: "/nope.toml".into(),
        });
        assert_eq!(missing.exit_code(), exit_code::CONFIG);

        let invalid = CliError::from(ConfigError::Validation {
            field: "workers".into(),
            reason: "must be at least 1".into(),
        });
        assert!(matches!(invalid, CliError::InvalidConfig { .. }));
    }

    #[test]
    fn for_plug_names_unreachable_device() {
        let err = CliError::from(CoreError::Transport {
            reason: "refused".into(),
        })
        .for_plug("kettle");
        assert_eq!(err.to_string(), "Could not reach kettle");
    }
}
