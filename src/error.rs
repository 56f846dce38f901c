// Error types for collectors, collaborators and alert delivery

use std::time::Duration;
use thiserror::Error;

/// Failure of a host or container collection call. Surfaced to the caller:
/// the one-shot CLI exits non-zero, the exporter loop logs and skips the cycle.
#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("Permission denied: insufficient privileges, retry with elevated access (e.g. sudo)")]
    PermissionDenied,

    #[error("Failed to fetch server health: underlying metric source failed: {0}")]
    Source(String),

    #[error(
        "Failed to fetch container health: {0}. Ensure the container runtime is running and accessible."
    )]
    Runtime(String),

    #[error("{operation} timed out after {}s", timeout.as_secs())]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },
}

/// Error raised by a `HostSource` implementation.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("{0}")]
    Failed(String),
}

impl From<std::io::Error> for SourceError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::PermissionDenied => SourceError::PermissionDenied(e.to_string()),
            _ => SourceError::Failed(e.to_string()),
        }
    }
}

impl From<SourceError> for CollectionError {
    fn from(e: SourceError) -> Self {
        match e {
            SourceError::PermissionDenied(_) => CollectionError::PermissionDenied,
            SourceError::Failed(detail) => CollectionError::Source(detail),
        }
    }
}

/// Error raised by a `ContainerRuntime` implementation.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Daemon unreachable, socket missing, or permission denied on the socket.
    #[error("container runtime unavailable: {0}")]
    Unavailable(String),

    /// The container went away between listing and sampling.
    #[error("container not found: {0}")]
    NotFound(String),

    #[error("container runtime API error: {0}")]
    Api(String),
}

impl From<RuntimeError> for CollectionError {
    fn from(e: RuntimeError) -> Self {
        CollectionError::Runtime(e.to_string())
    }
}

/// Error raised while building or delivering an alert email.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("invalid address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("could not build alert message: {0}")]
    Message(String),

    #[error("mail transport failed: {0}")]
    Transport(String),
}
