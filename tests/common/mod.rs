//! Shared test utilities for the junos-provider test suite.
//!
//! This module provides:
//! - [`FakeDevice`], an in-memory Junos device answering NETCONF RPCs through
//!   the [`Connector`]/[`Transport`] traits
//! - Helpers building a [`Client`] and provider configurations for tests
//!
//! # Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::*;
//! ```

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use junos_provider::config::{ProviderBlock, ProviderConfig};
use junos_provider::connection::{ConnectionError, ConnectionResult, Connector, Transport};
use junos_provider::junos::Client;
use junos_provider::provider::Provider;

/// Hello sent by the fake device
pub const DEVICE_HELLO: &str = r#"<hello xmlns="urn:ietf:params:xml:ns:netconf:base:1.0">
  <capabilities>
    <capability>urn:ietf:params:netconf:base:1.0</capability>
    <capability>urn:ietf:params:netconf:capability:candidate:1.0</capability>
    <capability>urn:ietf:params:netconf:capability:confirmed-commit:1.0</capability>
    <capability>http://xml.juniper.net/netconf/junos/1.0</capability>
  </capabilities>
  <session-id>4242</session-id>
</hello>"#;

// ============================================================================
// Device State
// ============================================================================

/// Everything the fake device knows and records
#[derive(Debug, Default)]
pub struct DeviceState {
    /// Committed configuration, statements without the leading `set `
    pub config: Vec<String>,
    /// Candidate configuration
    pub candidate: Vec<String>,
    /// Whether a session holds the candidate lock
    pub locked: bool,
    /// Number of lock attempts still to deny as if another user held it
    pub lock_busy: u32,
    /// Number of connection attempts still to refuse
    pub refuse_connections: u32,
    /// Error returned by the next plain commits
    pub commit_error: Option<String>,
    /// Warning attached to successful commits
    pub commit_warning: Option<String>,
    /// Error returned when loading set lines
    pub load_error: Option<String>,
    /// Accept loaded lines without applying them
    pub ignore_loads: bool,
    /// Error returned by `<discard-changes>`
    pub discard_error: Option<String>,
    /// Successful connections
    pub connections: u32,
    /// Operation element names in arrival order
    pub operations: Vec<String>,
    /// Every batch of loaded lines
    pub loaded: Vec<Vec<String>>,
    /// Commit kinds and logs: `commit: <log>`, `confirmed <min>: <log>`, `check`
    pub commits: Vec<String>,
    /// Text commands received
    pub commands: Vec<String>,
    /// Canned replies for operational RPCs, by operation element name
    pub replies: HashMap<String, String>,
}

impl DeviceState {
    fn apply(&mut self, line: &str) {
        if let Some(statement) = line.strip_prefix("set ") {
            let statement = statement.trim().to_string();
            if !self.candidate.contains(&statement) {
                self.candidate.push(statement);
            }
        } else if let Some(statement) = line.strip_prefix("delete ") {
            let statement = statement.trim();
            let below = format!("{} ", statement);
            self.candidate
                .retain(|l| l != statement && !l.starts_with(&below));
        }
    }

    /// `show configuration <path> | display set relative`
    fn show_relative(&self, path: &str) -> String {
        let below = format!("{} ", path);
        let mut out = Vec::new();
        for line in &self.config {
            if line == path {
                out.push("set".to_string());
            } else if let Some(rest) = line.strip_prefix(&below) {
                out.push(format!("set {}", rest));
            }
        }
        out.join("\n")
    }
}

// ============================================================================
// Fake Device
// ============================================================================

/// In-memory Junos device; cheap to clone, clones share state
#[derive(Debug, Clone, Default)]
pub struct FakeDevice {
    state: Arc<Mutex<DeviceState>>,
}

impl FakeDevice {
    /// Empty device
    pub fn new() -> Self {
        Self::default()
    }

    /// Device with committed configuration (`set ...` lines)
    pub fn with_config(lines: &[&str]) -> Self {
        let device = Self::new();
        {
            let mut state = device.state.lock();
            for line in lines {
                state.apply(line);
            }
            state.config = state.candidate.clone();
        }
        device
    }

    /// Inspect or change the device state
    pub fn state(&self) -> parking_lot::MutexGuard<'_, DeviceState> {
        self.state.lock()
    }

    /// Committed configuration as `set` lines
    pub fn committed(&self) -> Vec<String> {
        self.state
            .lock()
            .config
            .iter()
            .map(|l| format!("set {}", l))
            .collect()
    }

    /// Whether a committed statement is present
    pub fn has(&self, statement: &str) -> bool {
        self.state.lock().config.iter().any(|l| l == statement)
    }

    /// Register a canned reply body for an operational RPC
    pub fn reply_to(&self, operation: &str, body: &str) {
        self.state
            .lock()
            .replies
            .insert(operation.to_string(), body.to_string());
    }

    /// Provider configured for this device
    pub fn provider(&self) -> Provider {
        self.provider_with(ProviderBlock::default())
    }

    /// Provider configured for this device with extra settings
    pub fn provider_with(&self, block: ProviderBlock) -> Provider {
        let mut provider = Provider::new();
        provider.configure_with_connector(test_config(block), Arc::new(self.clone()));
        provider
    }

    /// Client of this device
    pub fn client(&self) -> Client {
        self.client_with(ProviderBlock::default())
    }

    /// Client of this device with extra provider settings
    pub fn client_with(&self, block: ProviderBlock) -> Client {
        Client::with_connector(test_config(block), Arc::new(self.clone()))
    }
}

#[async_trait]
impl Connector for FakeDevice {
    async fn connect(&self) -> ConnectionResult<Box<dyn Transport>> {
        let mut state = self.state.lock();
        if state.refuse_connections > 0 {
            state.refuse_connections -= 1;
            return Err(ConnectionError::ConnectionFailed(
                "connection refused".to_string(),
            ));
        }
        state.connections += 1;

        Ok(Box::new(FakeTransport {
            state: Arc::clone(&self.state),
            outbox: VecDeque::from([DEVICE_HELLO.to_string()]),
            holds_lock: false,
        }))
    }
}

// ============================================================================
// Fake Transport
// ============================================================================

/// One session on the fake device
struct FakeTransport {
    state: Arc<Mutex<DeviceState>>,
    outbox: VecDeque<String>,
    holds_lock: bool,
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn ok_reply(id: &str) -> String {
    format!(r#"<rpc-reply message-id="{}"><ok/></rpc-reply>"#, id)
}

fn error_reply(id: &str, tag: &str, message: &str) -> String {
    format!(
        r#"<rpc-reply message-id="{}"><rpc-error><error-type>protocol</error-type><error-tag>{}</error-tag><error-severity>error</error-severity><error-message>{}</error-message></rpc-error></rpc-reply>"#,
        id,
        tag,
        escape(message)
    )
}

fn warning_reply(id: &str, message: &str) -> String {
    format!(
        r#"<rpc-reply message-id="{}"><rpc-error><error-type>application</error-type><error-tag>warning</error-tag><error-severity>warning</error-severity><error-message>{}</error-message></rpc-error><ok/></rpc-reply>"#,
        id,
        escape(message)
    )
}

impl FakeTransport {
    fn handle(&mut self, message: &str) -> Option<String> {
        let doc = roxmltree::Document::parse(message).ok()?;
        let root = doc.root_element();
        if root.has_tag_name("hello") {
            return None;
        }
        let id = root.attribute("message-id").unwrap_or("0").to_string();
        let operation = root.children().find(|n| n.is_element())?;
        let name = operation.tag_name().name().to_string();
        let text = |node: roxmltree::Node<'_, '_>, child: &str| {
            node.descendants()
                .find(|n| n.has_tag_name(child))
                .and_then(|n| n.text())
                .unwrap_or_default()
                .to_string()
        };

        let mut state = self.state.lock();
        state.operations.push(name.clone());

        let reply = match name.as_str() {
            "lock" => {
                if state.lock_busy > 0 || (state.locked && !self.holds_lock) {
                    state.lock_busy = state.lock_busy.saturating_sub(1);
                    error_reply(
                        &id,
                        "lock-denied",
                        "configuration database locked by:\n  admin terminal p0 (pid 1234) on since 2024-01-01",
                    )
                } else {
                    state.locked = true;
                    self.holds_lock = true;
                    state.candidate = state.config.clone();
                    ok_reply(&id)
                }
            }
            "unlock" => {
                state.locked = false;
                self.holds_lock = false;
                ok_reply(&id)
            }
            "discard-changes" => match state.discard_error.clone() {
                Some(error) => error_reply(&id, "operation-failed", &error),
                None => {
                    state.candidate = state.config.clone();
                    ok_reply(&id)
                }
            },
            "load-configuration" => match state.load_error.clone() {
                Some(error) => error_reply(&id, "invalid-value", &error),
                None => {
                    let lines: Vec<String> = text(operation, "configuration-set")
                        .lines()
                        .map(str::to_string)
                        .collect();
                    if !state.ignore_loads {
                        for line in &lines {
                            state.apply(line);
                        }
                    }
                    state.loaded.push(lines);
                    ok_reply(&id)
                }
            },
            "commit-configuration" => {
                let log = text(operation, "log");
                if operation.children().any(|n| n.has_tag_name("check")) {
                    state.commits.push("check".to_string());
                    ok_reply(&id)
                } else if let Some(error) = state.commit_error.clone() {
                    error_reply(&id, "operation-failed", &error)
                } else {
                    if operation.children().any(|n| n.has_tag_name("confirmed")) {
                        let minutes = text(operation, "confirm-timeout");
                        state.commits.push(format!("confirmed {}: {}", minutes, log));
                    } else {
                        state.commits.push(format!("commit: {}", log));
                    }
                    state.config = state.candidate.clone();
                    match state.commit_warning.clone() {
                        Some(warning) => warning_reply(&id, &warning),
                        None => ok_reply(&id),
                    }
                }
            }
            "command" => {
                let command = operation.text().unwrap_or_default().trim().to_string();
                state.commands.push(command.clone());
                let shown = command
                    .strip_prefix("show configuration ")
                    .and_then(|c| c.strip_suffix(" | display set relative"));
                match shown {
                    Some(path) => format!(
                        "<rpc-reply message-id=\"{}\"><configuration-output>\n{}\n</configuration-output></rpc-reply>",
                        id,
                        escape(&state.show_relative(path))
                    ),
                    None => format!(
                        "<rpc-reply message-id=\"{}\"><output>\nfake output of {}\n</output></rpc-reply>",
                        id,
                        escape(&command)
                    ),
                }
            }
            "close-session" => {
                if self.holds_lock {
                    state.locked = false;
                    self.holds_lock = false;
                }
                ok_reply(&id)
            }
            other => match state.replies.get(other) {
                Some(body) => format!("<rpc-reply message-id=\"{}\">{}</rpc-reply>", id, body),
                None => error_reply(&id, "operation-not-supported", &format!("syntax error: {}", other)),
            },
        };
        Some(reply)
    }
}

#[async_trait]
impl Transport for FakeTransport {
    fn identifier(&self) -> &str {
        "netconf@fake-device:830"
    }

    async fn send(&mut self, message: &str) -> ConnectionResult<()> {
        if let Some(reply) = self.handle(message) {
            self.outbox.push_back(reply);
        }
        Ok(())
    }

    async fn receive(&mut self) -> ConnectionResult<String> {
        self.outbox
            .pop_front()
            .ok_or(ConnectionError::ConnectionClosed)
    }

    async fn close(&mut self) -> ConnectionResult<()> {
        if self.holds_lock {
            self.state.lock().locked = false;
            self.holds_lock = false;
        }
        Ok(())
    }
}

// ============================================================================
// Configuration Helpers
// ============================================================================

/// Provider configuration without pauses, resolved without the environment
pub fn test_config(mut block: ProviderBlock) -> ProviderConfig {
    block.ip.get_or_insert_with(|| "192.0.2.1".to_string());
    block.cmd_sleep_short.get_or_insert(0);
    block.cmd_sleep_lock.get_or_insert(0);
    block.config_lock_timeout.get_or_insert(30);
    ProviderConfig::from_block_with_env(block, |_| None).expect("valid test configuration")
}

/// Block writing set lines to `path` instead of the device
pub fn fake_setfile_block(path: &Path) -> ProviderBlock {
    ProviderBlock {
        fake_create_with_setfile: Some(path.display().to_string()),
        ..Default::default()
    }
}
