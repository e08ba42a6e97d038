//! Error types for the typeahead runtime.

use std::fmt;

/// The main error type for runtime operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The worker thread could not be spawned.
    WorkerSpawn(String),
    /// The worker has been stopped and no longer accepts tasks.
    WorkerStopped,
    /// The worker's task queue is full.
    QueueFull,
    /// The receiving side of a mailbox has been dropped.
    MailboxClosed,
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WorkerSpawn(msg) => write!(f, "Failed to spawn worker thread: {msg}"),
            Self::WorkerStopped => write!(f, "Worker has been stopped"),
            Self::QueueFull => write!(f, "Worker task queue is full"),
            Self::MailboxClosed => write!(f, "Mailbox receiver has been dropped"),
        }
    }
}

impl std::error::Error for CoreError {}

/// A specialized Result type for runtime operations.
pub type Result<T> = std::result::Result<T, CoreError>;
