//! Port layer abstraction.
//!
//! Defines the `BinaryPort` trait for the binary management channel and the
//! `AtPort` trait for the text command channel, allowing different
//! implementations (real device nodes, mock, etc.).

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortError {
    #[error("Port {0} is not open")]
    NotOpen(String),

    #[error("Failed to open port {port}: {message}")]
    OpenFailed { port: String, message: String },

    #[error("Failed to close port {port}: {message}")]
    CloseFailed { port: String, message: String },

    #[error("Command {command} failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("Timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Binary management channel (MBIM control port).
///
/// Opening is asynchronous and may be abandoned by dropping the future.
/// Closing is synchronous so it can run from `Drop`.
#[async_trait]
pub trait BinaryPort: Send + Sync {
    /// Device node name, e.g. `cdc-wdm0`.
    fn name(&self) -> &str;

    fn is_open(&self) -> bool;

    async fn open(&self) -> Result<(), PortError>;

    fn close(&self) -> Result<(), PortError>;
}

/// Text command channel.
#[async_trait]
pub trait AtPort: Send + Sync {
    fn name(&self) -> &str;

    /// Send `AT<command>` and return the final reply text.
    async fn command(&self, command: &str) -> Result<String, PortError>;
}
