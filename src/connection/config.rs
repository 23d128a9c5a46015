//! Connection configuration module
//!
//! SSH settings used to reach the device: address, authentication material,
//! cipher preference and the establishment timeout.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::ConnectionError;

/// Default NETCONF over SSH port
pub const DEFAULT_NETCONF_PORT: u16 = 830;

/// Default username when none is configured
pub const DEFAULT_USERNAME: &str = "netconf";

/// Ciphers the SSH transport knows how to negotiate
pub const SUPPORTED_CIPHERS: &[&str] = &[
    "chacha20-poly1305@openssh.com",
    "aes256-gcm@openssh.com",
    "aes128-ctr",
    "aes192-ctr",
    "aes256-ctr",
];

/// Cipher preference used when the provider block sets none
pub const DEFAULT_CIPHERS: &[&str] = SUPPORTED_CIPHERS;

/// Authentication material, tried in declaration order
#[derive(Clone, Default)]
pub struct SshAuth {
    /// Private key in PEM/OpenSSH format
    pub key_pem: Option<String>,
    /// Path to a private key file
    pub key_file: Option<PathBuf>,
    /// Passphrase for the private key
    pub key_passphrase: Option<String>,
    /// Password for keyboard/password authentication
    pub password: Option<String>,
    /// Try identities from the running ssh-agent last
    pub use_agent: bool,
}

impl fmt::Debug for SshAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SshAuth")
            .field("key_pem", &self.key_pem.as_ref().map(|_| "<redacted>"))
            .field("key_file", &self.key_file)
            .field(
                "key_passphrase",
                &self.key_passphrase.as_ref().map(|_| "<redacted>"),
            )
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("use_agent", &self.use_agent)
            .finish()
    }
}

/// Everything needed to open an SSH connection to one device
#[derive(Debug, Clone)]
pub struct SshOptions {
    /// Device address (hostname or IP)
    pub host: String,
    /// SSH port of the NETCONF service
    pub port: u16,
    /// Login user
    pub username: String,
    /// Authentication material
    pub auth: SshAuth,
    /// Cipher names, most preferred first
    pub ciphers: Vec<String>,
    /// Timeout for TCP connect plus SSH handshake, `None` waits forever
    pub timeout: Option<Duration>,
}

impl SshOptions {
    /// Create options with default port semantics and cipher list
    pub fn new(host: impl Into<String>, port: u16, username: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            auth: SshAuth::default(),
            ciphers: DEFAULT_CIPHERS.iter().map(|c| c.to_string()).collect(),
            timeout: None,
        }
    }

    /// Identifier used in logs
    pub fn identifier(&self) -> String {
        format!("{}@{}:{}", self.username, self.host, self.port)
    }

    /// Check the cipher list against what the transport supports
    pub fn validate(&self) -> Result<(), ConnectionError> {
        if self.host.is_empty() {
            return Err(ConnectionError::InvalidConfig(
                "device address is empty".to_string(),
            ));
        }
        if self.ciphers.is_empty() {
            return Err(ConnectionError::InvalidConfig(
                "at least one ssh cipher is required".to_string(),
            ));
        }
        validate_ciphers(&self.ciphers)
    }
}

/// Reject cipher names the transport cannot negotiate
pub fn validate_ciphers(ciphers: &[String]) -> Result<(), ConnectionError> {
    for cipher in ciphers {
        if !SUPPORTED_CIPHERS.contains(&cipher.as_str()) {
            return Err(ConnectionError::InvalidConfig(format!(
                "unsupported ssh cipher '{}' (supported: {})",
                cipher,
                SUPPORTED_CIPHERS.join(", ")
            )));
        }
    }
    Ok(())
}

/// Expand a leading `~/` to the home directory
pub fn expand_path(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}
