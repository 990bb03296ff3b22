//! Error types for controller configuration and platform hosts.

use thiserror::Error;

/// Controller error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    /// A key name that has no entry in the key code table.
    #[error("Unknown key '{0}': expected one of up, down, left, right or a numeric key code")]
    UnknownKey(String),
}

pub type ControllerResult<T> = Result<T, ControllerError>;

/// Errors raised while starting a platform host.
#[derive(Error, Debug)]
pub enum HostError {
    #[error("Failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("Failed to create window: {0}")]
    WindowCreation(#[from] winit::error::OsError),
    #[error("Host environment unavailable: {0}")]
    Unavailable(String),
}

pub type HostResult<T> = Result<T, HostError>;
