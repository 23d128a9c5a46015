//! Connection layer for NETCONF transports.
//!
//! This module provides the byte-level plumbing between a Junos session and
//! the device. A [`Transport`] moves whole NETCONF messages (one message per
//! frame, NETCONF 1.0 end-of-message framing); a [`Connector`] opens new
//! transports so that each provider operation gets its own session.
//!
//! # Supported Transports
//!
//! - **SSH** (via `russh`, default feature): the `netconf` SSH subsystem on
//!   the device (port 830 by default)
//! - Anything else implementing [`Connector`]; the test suite plugs in an
//!   in-memory device this way
//!
//! # Example
//!
//! ```rust,ignore
//! use junos_provider::connection::{Connector, SshOptions};
//! use junos_provider::connection::russh::SshConnector;
//!
//! let connector = SshConnector::new(SshOptions::new("192.0.2.1", 830, "netconf"));
//! let mut transport = connector.connect().await?;
//! let hello = transport.receive().await?;
//! ```

/// Connection configuration types.
pub mod config;

/// NETCONF 1.0 end-of-message framing.
pub mod framing;

/// Pure Rust SSH implementation using russh.
#[cfg(feature = "russh")]
pub mod russh;

use async_trait::async_trait;
use thiserror::Error;

pub use config::{SshAuth, SshOptions, DEFAULT_CIPHERS, SUPPORTED_CIPHERS};
pub use framing::{EomCodec, EOM_DELIMITER};

/// Russh-related error type - wraps russh::Error for the Handler trait
#[cfg(feature = "russh")]
#[derive(Debug)]
pub struct RusshError(pub ::russh::Error);

#[cfg(feature = "russh")]
impl From<::russh::Error> for RusshError {
    fn from(err: ::russh::Error) -> Self {
        RusshError(err)
    }
}

#[cfg(feature = "russh")]
impl std::fmt::Display for RusshError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Russh error: {}", self.0)
    }
}

#[cfg(feature = "russh")]
impl std::error::Error for RusshError {}

#[cfg(feature = "russh")]
impl From<::russh::Error> for ConnectionError {
    fn from(err: ::russh::Error) -> Self {
        ConnectionError::SshError(format!("Russh error: {}", err))
    }
}

/// Errors that can occur while talking to a device.
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// Failed to establish initial connection to the device.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Authentication was rejected by the device.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The `netconf` subsystem could not be started.
    #[error("NETCONF subsystem unavailable: {0}")]
    SubsystemFailed(String),

    /// Connection or operation timed out.
    #[error("Connection timeout after {0} seconds")]
    Timeout(u64),

    /// Configuration is invalid or incomplete.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// SSH-specific error from the underlying implementation.
    #[error("SSH error: {0}")]
    SshError(String),

    /// A received frame was not valid UTF-8 or exceeded limits.
    #[error("Framing error: {0}")]
    Framing(String),

    /// I/O error during connection operations.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Connection was closed unexpectedly.
    #[error("Connection closed")]
    ConnectionClosed,
}

/// Result type for connection operations.
pub type ConnectionResult<T> = Result<T, ConnectionError>;

/// A bidirectional NETCONF message pipe.
///
/// Implementations own the framing: `send` takes one message without the
/// end-of-message marker and `receive` yields one message with the marker
/// stripped.
#[async_trait]
pub trait Transport: Send {
    /// Short identifier for logging (`user@host:port`).
    fn identifier(&self) -> &str;

    /// Send one NETCONF message.
    async fn send(&mut self, message: &str) -> ConnectionResult<()>;

    /// Wait for the next NETCONF message.
    async fn receive(&mut self) -> ConnectionResult<String>;

    /// Close the underlying channel and connection.
    async fn close(&mut self) -> ConnectionResult<()>;
}

/// Opens transports to one device.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open a new transport; no NETCONF message has been exchanged yet.
    async fn connect(&self) -> ConnectionResult<Box<dyn Transport>>;
}
