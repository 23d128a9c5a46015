//! Telemetry for the provider.
//!
//! Only structured logging lives here; see [`logging::LoggingBuilder`].
//!
//! ```rust,ignore
//! use junos_provider::telemetry::LoggingBuilder;
//!
//! LoggingBuilder::new()
//!     .with_verbosity(2)
//!     .with_netconf_log(Some("/tmp/netconf.log"))
//!     .init()?;
//! ```

pub mod logging;

pub use logging::{LogFormat, LoggingBuilder, NETCONF_TARGET};
