//! Provider configuration
//!
//! Every attribute of the provider block is optional and resolved from:
//! - The explicit value in the block (or TOML file)
//! - The matching `JUNOS_*` environment variable
//! - The built-in default
//!
//! The resolved [`ProviderConfig`] is what the session client consumes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use validator::Validate;

use crate::connection::config::{
    expand_path, validate_ciphers, DEFAULT_CIPHERS, DEFAULT_NETCONF_PORT, DEFAULT_USERNAME,
};
use crate::connection::{SshAuth, SshOptions};
use crate::error::{Error, ErrorContext, Result};

/// Default pause after each RPC, in milliseconds
pub const DEFAULT_SLEEP_SHORT_MS: u64 = 100;
/// Default pause between lock attempts, in seconds
pub const DEFAULT_SLEEP_LOCK_SECS: u64 = 10;
/// Default share of the confirm timeout to wait before confirming
pub const DEFAULT_COMMIT_CONFIRMED_WAIT_PERCENT: u32 = 90;
/// Default permission of files written by the provider
pub const DEFAULT_FILE_PERMISSION: u32 = 0o644;
/// Default bound on waiting for the configuration lock, in seconds
pub const DEFAULT_LOCK_TIMEOUT_SECS: u64 = 1200;

/// Provider block as written by the user; every attribute is optional.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderBlock {
    /// Device address
    pub ip: Option<String>,
    /// NETCONF SSH port
    pub port: Option<u16>,
    /// Login user
    pub username: Option<String>,
    /// Login password
    pub password: Option<String>,
    /// Private key content
    pub sshkey_pem: Option<String>,
    /// Private key file
    pub sshkey_file: Option<String>,
    /// Private key passphrase
    pub keypass: Option<String>,
    /// Pause after each RPC (ms)
    pub cmd_sleep_short: Option<u64>,
    /// Pause between lock attempts (s)
    pub cmd_sleep_lock: Option<u64>,
    /// Use `commit confirmed` with this timeout (min)
    pub commit_confirmed: Option<u32>,
    /// Wait this percentage of the confirm timeout before confirming
    pub commit_confirmed_wait_percent: Option<u32>,
    /// Pause after closing a session (s)
    pub ssh_sleep_closed: Option<u64>,
    /// SSH ciphers, most preferred first
    pub ssh_ciphers: Option<Vec<String>>,
    /// Timeout to establish the SSH connection (s), 0 for none
    pub ssh_timeout_to_establish: Option<u64>,
    /// Number of connection attempts
    pub ssh_retry_to_establish: Option<u32>,
    /// Octal permission of written files (e.g. "0644")
    pub file_permission: Option<String>,
    /// Write every NETCONF exchange to this file
    pub debug_netconf_log_path: Option<String>,
    /// Append set lines to this file instead of creating on the device
    pub fake_create_with_setfile: Option<String>,
    /// Also fake updates
    pub fake_update_also: Option<bool>,
    /// Also fake deletes
    pub fake_delete_also: Option<bool>,
    /// Bound on waiting for the configuration lock (s)
    pub config_lock_timeout: Option<u64>,
}

impl fmt::Debug for ProviderBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderBlock")
            .field("ip", &self.ip)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("sshkey_pem", &self.sshkey_pem.as_ref().map(|_| "<redacted>"))
            .field("sshkey_file", &self.sshkey_file)
            .field("keypass", &self.keypass.as_ref().map(|_| "<redacted>"))
            .field("commit_confirmed", &self.commit_confirmed)
            .field("fake_create_with_setfile", &self.fake_create_with_setfile)
            .finish_non_exhaustive()
    }
}

impl ProviderBlock {
    /// Parse a provider block from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a provider block from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read provider config {}", path.display()))?;
        Self::from_toml_str(&content)
    }
}

/// Fully resolved provider configuration
#[derive(Clone, PartialEq, Validate)]
pub struct ProviderConfig {
    /// Device address
    #[validate(length(min = 1, message = "must not be empty"))]
    pub ip: String,
    /// NETCONF SSH port
    #[validate(range(min = 1, message = "must be between 1 and 65535"))]
    pub port: u16,
    /// Login user
    pub username: String,
    /// Login password
    pub password: Option<String>,
    /// Private key content
    pub sshkey_pem: Option<String>,
    /// Private key file, `~` expanded
    pub sshkey_file: Option<PathBuf>,
    /// Private key passphrase
    pub keypass: Option<String>,
    /// Pause after each RPC (ms)
    pub cmd_sleep_short: u64,
    /// Pause between lock attempts (s)
    pub cmd_sleep_lock: u64,
    /// `commit confirmed` timeout (min)
    #[validate(range(min = 1, max = 65535, message = "must be between 1 and 65535"))]
    pub commit_confirmed: Option<u32>,
    /// Percentage of the confirm timeout to wait before confirming
    #[validate(range(max = 99, message = "must be between 0 and 99"))]
    pub commit_confirmed_wait_percent: u32,
    /// Pause after closing a session (s)
    pub ssh_sleep_closed: u64,
    /// SSH ciphers, most preferred first
    #[validate(length(min = 1, message = "at least one cipher is required"))]
    pub ssh_ciphers: Vec<String>,
    /// Timeout to establish the SSH connection (s), 0 for none
    pub ssh_timeout_to_establish: u64,
    /// Number of connection attempts
    #[validate(range(min = 1, max = 10, message = "must be between 1 and 10"))]
    pub ssh_retry_to_establish: u32,
    /// Permission of written files
    pub file_permission: u32,
    /// Write every NETCONF exchange to this file
    pub debug_netconf_log_path: Option<PathBuf>,
    /// Append set lines to this file instead of creating on the device
    pub fake_create_with_setfile: Option<PathBuf>,
    /// Also fake updates
    pub fake_update_also: bool,
    /// Also fake deletes
    pub fake_delete_also: bool,
    /// Bound on waiting for the configuration lock (s)
    pub config_lock_timeout: u64,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("ip", &self.ip)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("sshkey_pem", &self.sshkey_pem.as_ref().map(|_| "<redacted>"))
            .field("sshkey_file", &self.sshkey_file)
            .field("keypass", &self.keypass.as_ref().map(|_| "<redacted>"))
            .field("cmd_sleep_short", &self.cmd_sleep_short)
            .field("cmd_sleep_lock", &self.cmd_sleep_lock)
            .field("commit_confirmed", &self.commit_confirmed)
            .field(
                "commit_confirmed_wait_percent",
                &self.commit_confirmed_wait_percent,
            )
            .field("ssh_sleep_closed", &self.ssh_sleep_closed)
            .field("ssh_ciphers", &self.ssh_ciphers)
            .field("ssh_timeout_to_establish", &self.ssh_timeout_to_establish)
            .field("ssh_retry_to_establish", &self.ssh_retry_to_establish)
            .field("file_permission", &format_args!("{:04o}", self.file_permission))
            .field("debug_netconf_log_path", &self.debug_netconf_log_path)
            .field("fake_create_with_setfile", &self.fake_create_with_setfile)
            .field("fake_update_also", &self.fake_update_also)
            .field("fake_delete_also", &self.fake_delete_also)
            .field("config_lock_timeout", &self.config_lock_timeout)
            .finish()
    }
}

/// Reads environment overrides; injectable so resolution can be tested
/// without touching the process environment.
struct EnvSource<F: Fn(&str) -> Option<String>> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> EnvSource<F> {
    fn string(&self, var: &str) -> Option<String> {
        (self.lookup)(var).filter(|v| !v.is_empty())
    }

    fn parsed<T: std::str::FromStr>(&self, key: &str, var: &str) -> Result<Option<T>> {
        match self.string(var) {
            Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
                Error::invalid_config(key, format!("cannot parse {}='{}'", var, raw))
            }),
            None => Ok(None),
        }
    }

    fn boolean(&self, key: &str, var: &str) -> Result<Option<bool>> {
        match self.string(var) {
            Some(raw) => parse_bool(&raw).map(Some).ok_or_else(|| {
                Error::invalid_config(key, format!("cannot parse {}='{}' as bool", var, raw))
            }),
            None => Ok(None),
        }
    }
}

/// Accepts the same spellings as the usual `true`/`false` env conventions
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim() {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

/// Parse an octal permission such as `0644` or `0o600`
pub fn parse_file_permission(raw: &str) -> Result<u32> {
    let digits = raw.trim().trim_start_matches("0o");
    let mode = u32::from_str_radix(digits, 8).map_err(|_| {
        Error::invalid_config("file_permission", format!("'{}' is not an octal mode", raw))
    })?;
    if mode > 0o777 {
        return Err(Error::invalid_config(
            "file_permission",
            format!("'{}' is out of range (max 0777)", raw),
        ));
    }
    Ok(mode)
}

impl ProviderConfig {
    /// Resolve a block against the process environment
    pub fn from_block(block: ProviderBlock) -> Result<Self> {
        Self::from_block_with_env(block, |var| std::env::var(var).ok())
    }

    /// Resolve a block against an arbitrary environment lookup
    pub fn from_block_with_env<F>(block: ProviderBlock, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvSource { lookup };

        let ip = block
            .ip
            .or_else(|| env.string("JUNOS_HOST"))
            .ok_or_else(|| {
                Error::invalid_config("ip", "required (set it or export JUNOS_HOST)")
            })?;

        let port = match block.port {
            Some(port) => port,
            None => env
                .parsed("port", "JUNOS_PORT")?
                .unwrap_or(DEFAULT_NETCONF_PORT),
        };

        let ssh_ciphers = match block.ssh_ciphers {
            Some(ciphers) => ciphers,
            None => match env.string("JUNOS_SSH_CIPHERS") {
                Some(raw) => raw
                    .split(',')
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty())
                    .collect(),
                None => DEFAULT_CIPHERS.iter().map(|c| c.to_string()).collect(),
            },
        };

        let file_permission = match block
            .file_permission
            .or_else(|| env.string("JUNOS_FILE_PERMISSION"))
        {
            Some(raw) => parse_file_permission(&raw)?,
            None => DEFAULT_FILE_PERMISSION,
        };

        let config = ProviderConfig {
            ip,
            port,
            username: block
                .username
                .or_else(|| env.string("JUNOS_USERNAME"))
                .unwrap_or_else(|| DEFAULT_USERNAME.to_string()),
            password: block.password.or_else(|| env.string("JUNOS_PASSWORD")),
            sshkey_pem: block.sshkey_pem.or_else(|| env.string("JUNOS_KEYPEM")),
            sshkey_file: block
                .sshkey_file
                .or_else(|| env.string("JUNOS_KEYFILE"))
                .map(|f| expand_path(Path::new(&f))),
            keypass: block.keypass.or_else(|| env.string("JUNOS_KEYPASS")),
            cmd_sleep_short: resolve(
                block.cmd_sleep_short,
                || env.parsed("cmd_sleep_short", "JUNOS_SLEEP_SHORT"),
                DEFAULT_SLEEP_SHORT_MS,
            )?,
            cmd_sleep_lock: resolve(
                block.cmd_sleep_lock,
                || env.parsed("cmd_sleep_lock", "JUNOS_SLEEP_LOCK"),
                DEFAULT_SLEEP_LOCK_SECS,
            )?,
            commit_confirmed: match block.commit_confirmed {
                Some(minutes) => Some(minutes),
                None => env.parsed("commit_confirmed", "JUNOS_COMMIT_CONFIRMED")?,
            },
            commit_confirmed_wait_percent: resolve(
                block.commit_confirmed_wait_percent,
                || env.parsed(
                    "commit_confirmed_wait_percent",
                    "JUNOS_COMMIT_CONFIRMED_WAIT_PERCENT",
                ),
                DEFAULT_COMMIT_CONFIRMED_WAIT_PERCENT,
            )?,
            ssh_sleep_closed: resolve(
                block.ssh_sleep_closed,
                || env.parsed("ssh_sleep_closed", "JUNOS_SLEEP_SSH_CLOSED"),
                0,
            )?,
            ssh_ciphers,
            ssh_timeout_to_establish: resolve(
                block.ssh_timeout_to_establish,
                || env.parsed("ssh_timeout_to_establish", "JUNOS_SSH_TIMEOUT_TO_ESTABLISH"),
                0,
            )?,
            ssh_retry_to_establish: resolve(
                block.ssh_retry_to_establish,
                || env.parsed("ssh_retry_to_establish", "JUNOS_SSH_RETRY_TO_ESTABLISH"),
                1,
            )?,
            file_permission,
            debug_netconf_log_path: block
                .debug_netconf_log_path
                .or_else(|| env.string("JUNOS_LOG_PATH"))
                .map(|p| expand_path(Path::new(&p))),
            fake_create_with_setfile: block
                .fake_create_with_setfile
                .or_else(|| env.string("JUNOS_FAKECREATE_SETFILE"))
                .map(|p| expand_path(Path::new(&p))),
            fake_update_also: resolve(
                block.fake_update_also,
                || env.boolean("fake_update_also", "JUNOS_FAKEUPDATE_ALSO"),
                false,
            )?,
            fake_delete_also: resolve(
                block.fake_delete_also,
                || env.boolean("fake_delete_also", "JUNOS_FAKEDELETE_ALSO"),
                false,
            )?,
            config_lock_timeout: resolve(
                block.config_lock_timeout,
                || env.parsed("config_lock_timeout", "JUNOS_LOCK_TIMEOUT"),
                DEFAULT_LOCK_TIMEOUT_SECS,
            )?,
        };

        config.check()?;
        Ok(config)
    }

    /// Range checks plus the cross-attribute rules
    fn check(&self) -> Result<()> {
        if let Err(errors) = self.validate() {
            let mut fields: Vec<(String, String)> = errors
                .field_errors()
                .into_iter()
                .map(|(field, errs)| {
                    let message = errs
                        .iter()
                        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .unwrap_or_else(|| "invalid value".to_string());
                    (field.to_string(), message)
                })
                .collect();
            fields.sort();
            if let Some((key, message)) = fields.into_iter().next() {
                return Err(Error::invalid_config(key, message));
            }
        }

        validate_ciphers(&self.ssh_ciphers)
            .map_err(|e| Error::invalid_config("ssh_ciphers", e.to_string()))?;

        if self.fake_create_with_setfile.is_none() {
            if self.fake_update_also {
                return Err(Error::invalid_config(
                    "fake_update_also",
                    "only works with fake_create_with_setfile",
                ));
            }
            if self.fake_delete_also {
                return Err(Error::invalid_config(
                    "fake_delete_also",
                    "only works with fake_create_with_setfile",
                ));
            }
        }
        Ok(())
    }

    /// SSH options derived from this configuration
    pub fn ssh_options(&self) -> SshOptions {
        let mut options = SshOptions::new(&self.ip, self.port, &self.username);
        options.auth = SshAuth {
            key_pem: self.sshkey_pem.clone(),
            key_file: self.sshkey_file.clone(),
            key_passphrase: self.keypass.clone(),
            password: self.password.clone(),
            use_agent: true,
        };
        options.ciphers = self.ssh_ciphers.clone();
        options.timeout = self.establish_timeout();
        options
    }

    /// Pause after each RPC
    pub fn sleep_short(&self) -> Duration {
        Duration::from_millis(self.cmd_sleep_short)
    }

    /// Pause between lock attempts
    pub fn sleep_lock(&self) -> Duration {
        Duration::from_secs(self.cmd_sleep_lock)
    }

    /// Pause after closing a session
    pub fn sleep_ssh_closed(&self) -> Duration {
        Duration::from_secs(self.ssh_sleep_closed)
    }

    /// Connection timeout, `None` when unbounded
    pub fn establish_timeout(&self) -> Option<Duration> {
        (self.ssh_timeout_to_establish > 0)
            .then(|| Duration::from_secs(self.ssh_timeout_to_establish))
    }

    /// Bound on waiting for the configuration lock
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_secs(self.config_lock_timeout)
    }

    /// How long to wait between `commit confirmed` and its confirmation
    pub fn commit_confirmed_wait(&self, minutes: u32) -> Duration {
        let secs = u64::from(minutes) * 60 * u64::from(self.commit_confirmed_wait_percent) / 100;
        Duration::from_secs(secs)
    }
}

/// Explicit value, else the environment, else the default. The environment
/// is only consulted when the block leaves the attribute unset.
fn resolve<T, F>(explicit: Option<T>, env: F, default: T) -> Result<T>
where
    F: FnOnce() -> Result<Option<T>>,
{
    match explicit {
        Some(value) => Ok(value),
        None => Ok(env()?.unwrap_or(default)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    fn block(ip: &str) -> ProviderBlock {
        ProviderBlock {
            ip: Some(ip.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = ProviderConfig::from_block_with_env(block("192.0.2.1"), env_of(&[])).unwrap();
        assert_eq!(config.port, 830);
        assert_eq!(config.username, "netconf");
        assert_eq!(config.cmd_sleep_short, 100);
        assert_eq!(config.cmd_sleep_lock, 10);
        assert_eq!(config.commit_confirmed, None);
        assert_eq!(config.commit_confirmed_wait_percent, 90);
        assert_eq!(config.ssh_retry_to_establish, 1);
        assert_eq!(config.file_permission, 0o644);
        assert_eq!(config.config_lock_timeout, 1200);
        assert_eq!(config.establish_timeout(), None);
        assert_eq!(config.ssh_ciphers.len(), DEFAULT_CIPHERS.len());
    }

    #[test]
    fn test_explicit_beats_env_beats_default() {
        let env = env_of(&[
            ("JUNOS_HOST", "198.51.100.1"),
            ("JUNOS_PORT", "2830"),
            ("JUNOS_USERNAME", "admin"),
        ]);
        let mut b = block("192.0.2.1");
        b.username = Some("ops".to_string());
        let config = ProviderConfig::from_block_with_env(b, env).unwrap();
        assert_eq!(config.ip, "192.0.2.1");
        assert_eq!(config.port, 2830);
        assert_eq!(config.username, "ops");
    }

    #[test]
    fn test_explicit_value_skips_unparsable_env() {
        let env = env_of(&[
            ("JUNOS_SLEEP_LOCK", "ten"),
            ("JUNOS_FAKEUPDATE_ALSO", "maybe"),
            ("JUNOS_COMMIT_CONFIRMED", "soon"),
        ]);
        let mut b = block("192.0.2.1");
        b.cmd_sleep_lock = Some(5);
        b.fake_update_also = Some(false);
        b.commit_confirmed = Some(3);
        let config = ProviderConfig::from_block_with_env(b, env).unwrap();
        assert_eq!(config.cmd_sleep_lock, 5);
        assert!(!config.fake_update_also);
        assert_eq!(config.commit_confirmed, Some(3));

        let env = env_of(&[("JUNOS_SLEEP_LOCK", "ten")]);
        let err = ProviderConfig::from_block_with_env(block("192.0.2.1"), env).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { ref key, .. } if key == "cmd_sleep_lock"));
    }

    #[test]
    fn test_ip_required() {
        let err = ProviderConfig::from_block_with_env(ProviderBlock::default(), env_of(&[]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { ref key, .. } if key == "ip"));
    }

    #[test]
    fn test_ranges_are_enforced() {
        let mut b = block("192.0.2.1");
        b.ssh_retry_to_establish = Some(11);
        let err = ProviderConfig::from_block_with_env(b, env_of(&[])).unwrap_err();
        assert!(
            matches!(err, Error::InvalidConfig { ref key, .. } if key == "ssh_retry_to_establish")
        );

        let mut b = block("192.0.2.1");
        b.commit_confirmed_wait_percent = Some(100);
        assert!(ProviderConfig::from_block_with_env(b, env_of(&[])).is_err());

        let mut b = block("192.0.2.1");
        b.commit_confirmed = Some(0);
        assert!(ProviderConfig::from_block_with_env(b, env_of(&[])).is_err());
    }

    #[test]
    fn test_fake_flags_need_setfile() {
        let mut b = block("192.0.2.1");
        b.fake_update_also = Some(true);
        let err = ProviderConfig::from_block_with_env(b, env_of(&[])).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { ref key, .. } if key == "fake_update_also"));

        let env = env_of(&[
            ("JUNOS_FAKECREATE_SETFILE", "/tmp/junos.set"),
            ("JUNOS_FAKEDELETE_ALSO", "true"),
        ]);
        let config = ProviderConfig::from_block_with_env(block("192.0.2.1"), env).unwrap();
        assert!(config.fake_delete_also);
        assert_eq!(
            config.fake_create_with_setfile,
            Some(PathBuf::from("/tmp/junos.set"))
        );
    }

    #[test]
    fn test_env_parse_error_names_attribute() {
        let env = env_of(&[("JUNOS_SLEEP_LOCK", "ten")]);
        let err = ProviderConfig::from_block_with_env(block("192.0.2.1"), env).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { ref key, .. } if key == "cmd_sleep_lock"));
    }

    #[test]
    fn test_cipher_list_from_env() {
        let env = env_of(&[("JUNOS_SSH_CIPHERS", "aes256-ctr, aes128-ctr")]);
        let config = ProviderConfig::from_block_with_env(block("192.0.2.1"), env).unwrap();
        assert_eq!(config.ssh_ciphers, vec!["aes256-ctr", "aes128-ctr"]);

        let env = env_of(&[("JUNOS_SSH_CIPHERS", "arcfour")]);
        assert!(ProviderConfig::from_block_with_env(block("192.0.2.1"), env).is_err());
    }

    #[test]
    fn test_file_permission() {
        assert_eq!(parse_file_permission("0600").unwrap(), 0o600);
        assert_eq!(parse_file_permission("0o755").unwrap(), 0o755);
        assert!(parse_file_permission("0999").is_err());
        assert!(parse_file_permission("1777").is_err());
    }

    #[test]
    fn test_commit_confirmed_wait() {
        let mut b = block("192.0.2.1");
        b.commit_confirmed = Some(2);
        b.commit_confirmed_wait_percent = Some(50);
        let config = ProviderConfig::from_block_with_env(b, env_of(&[])).unwrap();
        assert_eq!(config.commit_confirmed_wait(2), Duration::from_secs(60));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut b = block("192.0.2.1");
        b.password = Some("hunter2".to_string());
        b.keypass = Some("s3cret".to_string());
        assert!(!format!("{:?}", b).contains("hunter2"));
        let config = ProviderConfig::from_block_with_env(b, env_of(&[])).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("0644"));
    }

    #[test]
    fn test_toml_block() {
        let b = ProviderBlock::from_toml_str(
            r#"
ip = "192.0.2.1"
port = 22
cmd_sleep_short = 0
ssh_ciphers = ["aes256-ctr"]
"#,
        )
        .unwrap();
        assert_eq!(b.port, Some(22));
        assert_eq!(b.ssh_ciphers, Some(vec!["aes256-ctr".to_string()]));
        assert!(ProviderBlock::from_toml_str("unknown = 1").is_err());
    }
}
