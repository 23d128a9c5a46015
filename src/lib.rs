//! # junos-provider - Junos configuration as declarative resources
//!
//! Resources and data sources over Junos devices. A resource maps a typed
//! set of attributes to the `set` statements under one configuration path;
//! every create, update and delete goes through a locked, committed
//! configuration session on the device.
//!
//! ## Core Concepts
//!
//! - **Session client**: opens one NETCONF session per operation, locks the
//!   candidate configuration, loads set lines, commits, clears and unlocks
//! - **Resources**: `junos_vlan`, `junos_static_route`, ... with
//!   create/read/update/delete/import and state upgrades
//! - **Data sources**: read-only queries of operational data
//! - **Diagnostics**: errors and warnings reported to the user instead of
//!   aborting the run
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                  CLI (schema/plan/apply/read/import)                │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                    │
//!                                    ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │          Provider (resource + data source registries)               │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                    │
//!                                    ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │   Session client (process mutex, lock retry, commit, fake mode)     │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                    │
//!                                    ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │          NETCONF 1.0 over the SSH `netconf` subsystem               │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use junos_provider::prelude::*;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut provider = Provider::new();
//!     provider.configure(ProviderBlock::from_file("provider.toml")?)?;
//!
//!     let vlan = provider.resource("junos_vlan")?;
//!     let resp = vlan
//!         .create(provider.client()?, json!({"name": "v100", "vlan_id": "100"}))
//!         .await;
//!     for diag in &resp.diagnostics {
//!         eprintln!("{}", diag);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

// Re-export commonly used items in prelude
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    pub use crate::config::{ProviderBlock, ProviderConfig};
    pub use crate::connection::{ConnectionError, Connector, Transport};
    pub use crate::data_sources::{DataSource, DataSourceRegistry, DeviceQuery};
    pub use crate::error::{Error, Result};
    pub use crate::junos::{mutex_lock, Client, Session};
    pub use crate::provider::Provider;
    pub use crate::resources::{ConfigResource, Resource, ResourceRegistry};
    pub use crate::schema::{Diagnostic, Response, Schema, Severity};
}

pub mod error;

pub mod config;

pub mod connection;

pub mod netconf;

pub mod retry;

pub mod junos;

pub mod schema;

pub mod resources;

pub mod data_sources;

pub mod provider;

pub mod telemetry;

/// Crate version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Build information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        version: env!("CARGO_PKG_VERSION"),
        target: std::env::consts::ARCH,
        profile: if cfg!(debug_assertions) {
            "debug"
        } else {
            "release"
        },
    }
}

/// Version, target and build profile
#[derive(Debug, Clone)]
pub struct VersionInfo {
    pub version: &'static str,
    pub target: &'static str,
    pub profile: &'static str,
}

impl std::fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "junos-provider {} ({}, {})",
            self.version, self.target, self.profile
        )
    }
}
