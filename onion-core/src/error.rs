//! Error types for the coordination engine

use thiserror::Error;

/// Errors that can occur in the coordination engine
#[derive(Error, Debug)]
pub enum OnionError {
    #[error("unknown node: {0}")]
    UnknownNode(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("socket error: {0}")]
    Socket(#[from] std::io::Error),

    #[error("receive timed out")]
    Timeout,

    #[error("local node address {0} is not one of the configured cluster nodes")]
    LocalNodeNotInCluster(String),

    #[error("failed to bind UDP socket on {0}: {1}")]
    BindFailed(String, std::io::Error),

    #[error("pid file {0} is already held by a running process (pid {1})")]
    AlreadyRunning(String, u32),
}

impl OnionError {
    /// Classify the error for choosing a process exit code at the CLI boundary.
    pub fn kind(&self) -> ErrorKind {
        match self {
            OnionError::UnknownNode(_) => ErrorKind::Recoverable,
            OnionError::Config(_) => ErrorKind::Recoverable,
            OnionError::Socket(_) => ErrorKind::Recoverable,
            OnionError::Timeout => ErrorKind::Recoverable,
            OnionError::LocalNodeNotInCluster(_) => ErrorKind::Recoverable,
            OnionError::BindFailed(_, _) => ErrorKind::Privilege,
            OnionError::AlreadyRunning(_, _) => ErrorKind::Recoverable,
        }
    }
}

/// Coarse classification used to pick a process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Exit code 1: usage/config/other recoverable error.
    Recoverable,
    /// Exit code 2: insufficient privileges (e.g. cannot bind a low port).
    Privilege,
}

pub type Result<T> = std::result::Result<T, OnionError>;
