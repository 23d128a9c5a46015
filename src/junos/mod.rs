//! Junos session client.
//!
//! [`Client`] holds the resolved provider configuration and a
//! [`Connector`]; every provider operation opens its own [`Session`] with
//! [`Client::start_new_session`] and closes it when done.
//!
//! Configuration access is serialized inside the process by a single async
//! mutex (see [`mutex_lock`]): a session holds it from `config_lock` until
//! `config_unlock` or `close`, and top-level reads and fake set-file
//! appends take it for their duration.

pub mod fake;
pub mod session;
pub mod setline;

use once_cell::sync::Lazy;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::config::ProviderConfig;
use crate::connection::{ConnectionError, Connector};
use crate::error::{Error, Result};
use crate::netconf::NetconfSession;
use crate::retry::RetryPolicy;

pub use session::{Session, CLEAR_UNLOCK_WARNING, COMMIT_WARNING};
pub use setline::{join_id, split_id, SetLines, ID_SEPARATOR};

static CONFIG_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Take the process-wide configuration mutex
pub async fn mutex_lock() -> MutexGuard<'static, ()> {
    CONFIG_MUTEX.lock().await
}

/// Client for one Junos device
#[derive(Clone)]
pub struct Client {
    config: Arc<ProviderConfig>,
    connector: Arc<dyn Connector>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Client reaching the device over SSH
    #[cfg(feature = "russh")]
    pub fn new(config: ProviderConfig) -> Self {
        let connector = crate::connection::russh::SshConnector::new(config.ssh_options());
        Self::with_connector(config, Arc::new(connector))
    }

    /// Client using an arbitrary connector
    pub fn with_connector(config: ProviderConfig, connector: Arc<dyn Connector>) -> Self {
        Self {
            config: Arc::new(config),
            connector,
        }
    }

    /// Resolved provider configuration
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Connect and open a NETCONF session.
    ///
    /// Connection attempts are repeated up to `ssh_retry_to_establish`
    /// times, waiting 1s, 2s, ... in between. Authentication failures are
    /// not retried.
    pub async fn start_new_session(&self) -> Result<Session> {
        let policy = RetryPolicy::linear(self.config.ssh_retry_to_establish, Duration::from_secs(1));
        let connector = &self.connector;

        let netconf = policy
            .execute(
                move || async move {
                    let transport = connector.connect().await?;
                    NetconfSession::open(transport).await
                },
                is_retryable,
            )
            .await?;

        debug!(device = %netconf.device(), "New session started");
        Ok(Session::new(netconf, Arc::clone(&self.config)))
    }

    /// Set file receiving lines in fake mode
    pub fn fake_create_setfile(&self) -> Option<&Path> {
        self.config.fake_create_with_setfile.as_deref()
    }

    /// Whether updates are written to the set file
    pub fn fake_update_also(&self) -> bool {
        self.config.fake_update_also && self.config.fake_create_with_setfile.is_some()
    }

    /// Whether deletes are written to the set file
    pub fn fake_delete_also(&self) -> bool {
        self.config.fake_delete_also && self.config.fake_create_with_setfile.is_some()
    }

    /// Append lines to the fake set file under the process mutex
    pub async fn append_fake_set_lines(&self, lines: &[String]) -> Result<()> {
        let path = self.fake_create_setfile().ok_or_else(|| {
            Error::Config("fake_create_with_setfile is not configured".to_string())
        })?;
        let _guard = mutex_lock().await;
        fake::append_set_lines(path, lines, self.config.file_permission).await?;
        info!(file = %path.display(), lines = lines.len(), "Wrote set lines to fake file");
        Ok(())
    }
}

fn is_retryable(error: &Error) -> bool {
    match error {
        Error::Connection(
            ConnectionError::AuthenticationFailed(_) | ConnectionError::InvalidConfig(_),
        ) => false,
        Error::Connection(_) => true,
        _ => false,
    }
}
