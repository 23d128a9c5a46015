//! Configuration session on one device.
//!
//! A [`Session`] wraps one NETCONF session and adds the Junos editing
//! workflow: lock the candidate, load set lines, commit, then clear and
//! unlock. While the candidate is locked the session also holds the
//! process-wide configuration mutex.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::MutexGuard;
use tracing::{debug, info, warn};

use super::{mutex_lock, setline};
use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use crate::netconf::{rpc, NetconfSession, RpcErrors, RpcReply};
use crate::schema::Diagnostic;

/// Summary of commit warnings
pub const COMMIT_WARNING: &str = "Config Commit Warning";
/// Summary of clear/unlock failures
pub const CLEAR_UNLOCK_WARNING: &str = "Config Clear/Unlock Warning";

/// One NETCONF session with the Junos editing workflow on top
pub struct Session {
    netconf: NetconfSession,
    config: Arc<ProviderConfig>,
    guard: Option<MutexGuard<'static, ()>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("netconf", &self.netconf)
            .field("locked", &self.guard.is_some())
            .finish()
    }
}

impl Session {
    pub(crate) fn new(netconf: NetconfSession, config: Arc<ProviderConfig>) -> Self {
        Self {
            netconf,
            config,
            guard: None,
        }
    }

    /// Device identifier for logging
    pub fn device(&self) -> &str {
        self.netconf.device()
    }

    /// Whether this session holds the candidate lock
    pub fn is_locked(&self) -> bool {
        self.guard.is_some()
    }

    /// Send one RPC; error-severity replies fail.
    pub async fn rpc(&mut self, body: &str) -> Result<RpcReply> {
        let reply = self.netconf.rpc(body).await;
        pause(self.config.sleep_short()).await;
        reply?.check()
    }

    /// Run a text command and return its output
    pub async fn command(&mut self, cmd: &str) -> Result<String> {
        let reply = self.rpc(&rpc::command(cmd)).await?;
        if let Some(text) = reply.text_of("configuration-output")? {
            return Ok(text);
        }
        Ok(reply.text_of("output")?.unwrap_or_default())
    }

    /// Statements under `path` relative to it, `None` when not configured
    pub async fn show_set_lines(&mut self, path: &str) -> Result<Option<Vec<String>>> {
        let output = self
            .command(&format!("show configuration {} | display set relative", path))
            .await?;
        if !setline::stanza_exists(&output) {
            return Ok(None);
        }
        Ok(Some(setline::parse_relative(&output)))
    }

    /// Lock the candidate configuration.
    ///
    /// Takes the process mutex first, then retries `<lock>` every
    /// `cmd_sleep_lock` while another user holds the candidate, up to
    /// `config_lock_timeout`.
    pub async fn config_lock(&mut self) -> Result<()> {
        if self.guard.is_none() {
            self.guard = Some(mutex_lock().await);
        }

        let started = Instant::now();
        let timeout = self.config.lock_timeout();
        loop {
            match self.rpc(&rpc::lock_candidate()).await {
                Ok(_) => {
                    debug!(device = %self.device(), "Candidate configuration locked");
                    return Ok(());
                }
                Err(Error::Rpc(errors)) if is_lock_busy(&errors) => {
                    let remaining = timeout.saturating_sub(started.elapsed());
                    if remaining.is_zero() {
                        self.guard = None;
                        warn!(device = %self.device(), error = %errors, "Giving up on configuration lock");
                        return Err(Error::LockTimeout(timeout));
                    }
                    info!(
                        device = %self.device(),
                        error = %errors,
                        "Configuration database locked, retrying"
                    );
                    // last attempt lands on the deadline
                    tokio::time::sleep(self.config.sleep_lock().min(remaining)).await;
                }
                Err(e) => {
                    self.guard = None;
                    return Err(e);
                }
            }
        }
    }

    /// Load set/delete lines into the candidate
    pub async fn config_set(&mut self, lines: &[String]) -> Result<()> {
        if lines.is_empty() {
            return Ok(());
        }
        let reply = self.rpc(&rpc::load_set(lines)).await?;
        for warning in reply.warnings() {
            debug!(device = %self.device(), warning = %warning, "Load warning");
        }
        Ok(())
    }

    /// Commit the candidate.
    ///
    /// With `commit_confirmed` set, issues `commit confirmed`, waits its
    /// share of the timeout and confirms with `commit check`. Returns the
    /// commit warnings as diagnostics.
    pub async fn commit_conf(&mut self, log: &str) -> Result<Vec<Diagnostic>> {
        let mut warnings = Vec::new();
        match self.config.commit_confirmed {
            Some(minutes) => {
                let reply = self.rpc(&rpc::commit_confirmed(minutes, Some(log))).await?;
                warnings.extend(reply.warnings());

                let wait = self.config.commit_confirmed_wait(minutes);
                info!(
                    device = %self.device(),
                    minutes,
                    wait_secs = wait.as_secs(),
                    "Commit confirmed, waiting before confirmation"
                );
                tokio::time::sleep(wait).await;

                let reply = self.rpc(&rpc::commit_check()).await?;
                warnings.extend(reply.warnings());
            }
            None => {
                let reply = self.rpc(&rpc::commit(Some(log))).await?;
                warnings.extend(reply.warnings());
            }
        }
        info!(device = %self.device(), log, "Configuration committed");

        Ok(warnings
            .into_iter()
            .map(|w| Diagnostic::warning(COMMIT_WARNING, w.to_string()))
            .collect())
    }

    /// Discard uncommitted changes
    pub async fn config_clear(&mut self) -> Result<()> {
        self.rpc(&rpc::discard_changes()).await.map(|_| ())
    }

    /// Unlock the candidate and release the process mutex
    pub async fn config_unlock(&mut self) -> Result<()> {
        let result = self.rpc(&rpc::unlock_candidate()).await.map(|_| ());
        self.guard = None;
        debug!(device = %self.device(), "Candidate configuration unlocked");
        result
    }

    /// Clear and unlock, reporting failures as warnings
    pub async fn clear_and_unlock(&mut self) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        if let Err(e) = self.config_clear().await {
            diagnostics.push(Diagnostic::warning(CLEAR_UNLOCK_WARNING, e.to_string()));
        }
        if let Err(e) = self.config_unlock().await {
            diagnostics.push(Diagnostic::warning(CLEAR_UNLOCK_WARNING, e.to_string()));
        }
        diagnostics
    }

    /// Close the NETCONF session and the transport
    pub async fn close(mut self) -> Result<()> {
        self.guard = None;
        let result = self.netconf.close().await;
        pause(self.config.sleep_ssh_closed()).await;
        result
    }
}

/// Sleep between device operations; a zero duration skips the timer.
async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

/// Lock failures worth waiting for
fn is_lock_busy(errors: &RpcErrors) -> bool {
    errors.has_tag("lock-denied") || errors.message_contains("configuration database locked")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netconf::{ErrorSeverity, RpcError};

    fn rpc_error(tag: Option<&str>, message: &str) -> RpcErrors {
        RpcErrors(vec![RpcError {
            severity: ErrorSeverity::Error,
            error_type: None,
            tag: tag.map(str::to_string),
            message: message.to_string(),
            path: None,
            bad_element: None,
        }])
    }

    fn require_send<T: Send>(_: T) {}

    // Checked at compile time; resources await these inside `Send` futures.
    #[allow(dead_code)]
    fn session_futures_are_send(mut session: Session) {
        require_send(session.rpc("<get-system-information/>"));
        require_send(session.config_lock());
        require_send(session.commit_conf("log"));
        require_send(session.close());
    }

    #[test]
    fn test_lock_busy_classification() {
        assert!(is_lock_busy(&rpc_error(Some("lock-denied"), "")));
        assert!(is_lock_busy(&rpc_error(
            None,
            "configuration database locked by: admin"
        )));
        assert!(!is_lock_busy(&rpc_error(
            Some("operation-failed"),
            "syntax error"
        )));
    }
}
