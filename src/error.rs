use thiserror::Error;

/// Failures the dashboard knows how to surface.
///
/// Backend errors are opaque text from the daemon; the dashboard never looks
/// past success/failure, it only shows the message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The runtime client could not be built or the worker talking to it is gone.
    #[error("container runtime unavailable: {0}")]
    BackendUnavailable(String),

    /// A list/lifecycle/exec/logs/inspect call was rejected or failed.
    #[error("{0}")]
    BackendOperationFailed(String),

    /// A record came back without a usable name or id.
    #[error("malformed container record: {0}")]
    MalformedRecord(String),

    /// The current view already waits on a background action.
    #[error("an action is already in flight for this view: {0}")]
    ActionPending(String),
}

impl From<bollard::errors::Error> for Error {
    fn from(e: bollard::errors::Error) -> Self {
        Error::BackendOperationFailed(e.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::BackendOperationFailed(e.to_string())
    }
}
