use thiserror::Error;

/// Failure modes of a [`PlugClient`](crate::PlugClient) call.
///
/// Both variants are considered transient by the synchronizer: they are
/// logged and retried, never surfaced from a refresh.
#[derive(Debug, Error)]
pub enum Error {
    /// The device answered but rejected or could not serve the request.
    #[error("Device error: {message}")]
    Device { message: String },

    /// Connection refused, reset, timed out, etc.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn device(message: impl Into<String>) -> Self {
        Self::Device {
            message: message.into(),
        }
    }

    /// Returns `true` if the failure happened below the device protocol.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
