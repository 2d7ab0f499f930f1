// ── Core error types ──
//
// User-facing errors from plugsync-core. Consumers never match on raw
// transport failures; the `From<plugsync_api::Error>` impl folds them
// into domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Device errors ────────────────────────────────────────────────
    #[error("Device rejected request: {message}")]
    Device { message: String },

    #[error("Device unreachable: {reason}")]
    Transport { reason: String },

    #[error("Outlet {outlet_id} not found on {host}")]
    OutletNotFound { host: String, outlet_id: String },

    // ── Runtime errors ───────────────────────────────────────────────
    #[error("Worker pool failure: {reason}")]
    Worker { reason: String },

    #[error("Poller for {name} has stopped")]
    PollerStopped { name: String },

    // ── Fleet errors ─────────────────────────────────────────────────
    #[error("Plug not found: {name}")]
    PlugNotFound { name: String },

    #[error("Plug already registered: {name}")]
    DuplicatePlug { name: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Errors the refresh loop swallows and retries.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Device { .. }
                | Self::Transport { .. }
                | Self::OutletNotFound { .. }
                | Self::Worker { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<plugsync_api::Error> for CoreError {
    fn from(err: plugsync_api::Error) -> Self {
        match err {
            plugsync_api::Error::Device { message } => CoreError::Device { message },
            plugsync_api::Error::Io(e) => CoreError::Transport {
                reason: e.to_string(),
            },
        }
    }
}
