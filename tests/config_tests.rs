//! Integration tests for provider configuration
//!
//! These tests resolve provider blocks against the real process
//! environment, so every test touching `JUNOS_*` variables is serialized.

use junos_provider::config::{ProviderBlock, ProviderConfig, DEFAULT_LOCK_TIMEOUT_SECS};
use junos_provider::error::Error;
use junos_provider::provider::Provider;
use serial_test::serial;
use std::path::PathBuf;
use tempfile::tempdir;

const VARS: &[&str] = &[
    "JUNOS_HOST",
    "JUNOS_PORT",
    "JUNOS_USERNAME",
    "JUNOS_SLEEP_LOCK",
    "JUNOS_LOCK_TIMEOUT",
    "JUNOS_SSH_CIPHERS",
    "JUNOS_FAKECREATE_SETFILE",
    "JUNOS_FAKEUPDATE_ALSO",
    "JUNOS_FAKEDELETE_ALSO",
];

/// Clears the variables on creation and again on drop
struct CleanEnv;

impl CleanEnv {
    fn new() -> Self {
        for var in VARS {
            std::env::remove_var(var);
        }
        CleanEnv
    }

    fn set(&self, var: &str, value: &str) {
        std::env::set_var(var, value);
    }
}

impl Drop for CleanEnv {
    fn drop(&mut self) {
        for var in VARS {
            std::env::remove_var(var);
        }
    }
}

// ============================================================================
// Environment Precedence
// ============================================================================

#[test]
#[serial]
fn test_host_from_environment() {
    let env = CleanEnv::new();
    env.set("JUNOS_HOST", "192.0.2.10");
    env.set("JUNOS_PORT", "2830");

    let config = ProviderConfig::from_block(ProviderBlock::default()).unwrap();
    assert_eq!(config.ip, "192.0.2.10");
    assert_eq!(config.port, 2830);
    assert_eq!(config.config_lock_timeout, DEFAULT_LOCK_TIMEOUT_SECS);
}

#[test]
#[serial]
fn test_explicit_value_beats_environment() {
    let env = CleanEnv::new();
    env.set("JUNOS_HOST", "192.0.2.10");
    env.set("JUNOS_LOCK_TIMEOUT", "60");
    env.set("JUNOS_USERNAME", "automation");

    let config = ProviderConfig::from_block(ProviderBlock {
        ip: Some("192.0.2.20".to_string()),
        config_lock_timeout: Some(5),
        ..Default::default()
    })
    .unwrap();
    assert_eq!(config.ip, "192.0.2.20");
    assert_eq!(config.config_lock_timeout, 5);
    assert_eq!(config.username, "automation");
}

#[test]
#[serial]
fn test_cipher_list_from_environment() {
    let env = CleanEnv::new();
    env.set("JUNOS_HOST", "192.0.2.10");
    env.set("JUNOS_SSH_CIPHERS", "aes256-ctr, aes128-ctr");

    let config = ProviderConfig::from_block(ProviderBlock::default()).unwrap();
    assert_eq!(config.ssh_ciphers, vec!["aes256-ctr", "aes128-ctr"]);
}

// ============================================================================
// Invalid Values
// ============================================================================

#[test]
#[serial]
fn test_missing_host() {
    let _env = CleanEnv::new();
    let err = ProviderConfig::from_block(ProviderBlock::default()).unwrap_err();
    assert!(matches!(err, Error::InvalidConfig { ref key, .. } if key == "ip"));
    assert_eq!(err.exit_code(), 5);
}

#[test]
#[serial]
fn test_unparsable_environment_value() {
    let env = CleanEnv::new();
    env.set("JUNOS_HOST", "192.0.2.10");
    env.set("JUNOS_SLEEP_LOCK", "ten");

    let err = ProviderConfig::from_block(ProviderBlock::default()).unwrap_err();
    assert!(matches!(err, Error::InvalidConfig { ref key, .. } if key == "cmd_sleep_lock"));
    assert!(err.to_string().contains("JUNOS_SLEEP_LOCK"));
}

#[test]
#[serial]
fn test_explicit_value_ignores_unparsable_environment() {
    let env = CleanEnv::new();
    env.set("JUNOS_HOST", "192.0.2.10");
    env.set("JUNOS_SLEEP_LOCK", "ten");
    env.set("JUNOS_LOCK_TIMEOUT", "forever");

    let config = ProviderConfig::from_block(ProviderBlock {
        cmd_sleep_lock: Some(5),
        config_lock_timeout: Some(30),
        ..Default::default()
    })
    .unwrap();
    assert_eq!(config.cmd_sleep_lock, 5);
    assert_eq!(config.config_lock_timeout, 30);
}

#[test]
#[serial]
fn test_fake_flags_without_setfile() {
    let env = CleanEnv::new();
    env.set("JUNOS_HOST", "192.0.2.10");
    env.set("JUNOS_FAKEDELETE_ALSO", "true");

    let err = ProviderConfig::from_block(ProviderBlock::default()).unwrap_err();
    assert!(matches!(err, Error::InvalidConfig { ref key, .. } if key == "fake_delete_also"));

    env.set("JUNOS_FAKECREATE_SETFILE", "/tmp/junos.set");
    let config = ProviderConfig::from_block(ProviderBlock::default()).unwrap();
    assert!(config.fake_delete_also);
    assert_eq!(
        config.fake_create_with_setfile,
        Some(PathBuf::from("/tmp/junos.set"))
    );
}

#[test]
#[serial]
fn test_out_of_range_retry() {
    let _env = CleanEnv::new();
    let err = ProviderConfig::from_block(ProviderBlock {
        ip: Some("192.0.2.10".to_string()),
        ssh_retry_to_establish: Some(11),
        ..Default::default()
    })
    .unwrap_err();
    assert!(err.to_string().contains("ssh_retry_to_establish"));
}

// ============================================================================
// Config Files and Provider
// ============================================================================

#[test]
#[serial]
fn test_block_from_toml_file() {
    let _env = CleanEnv::new();
    let dir = tempdir().unwrap();
    let path = dir.path().join("provider.toml");
    std::fs::write(
        &path,
        r#"
ip = "192.0.2.30"
username = "netconf"
commit_confirmed = 5
ssh_ciphers = ["aes256-gcm@openssh.com"]
file_permission = "0600"
"#,
    )
    .unwrap();

    let block = ProviderBlock::from_file(&path).unwrap();
    let config = ProviderConfig::from_block(block).unwrap();
    assert_eq!(config.username, "netconf");
    assert_eq!(config.commit_confirmed, Some(5));
    assert_eq!(config.file_permission, 0o600);
}

#[test]
fn test_unknown_key_in_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("provider.toml");
    std::fs::write(&path, "ip = \"192.0.2.30\"\nhostname = \"r1\"\n").unwrap();

    assert!(ProviderBlock::from_file(&path).is_err());
    assert!(ProviderBlock::from_file(dir.path().join("missing.toml")).is_err());
}

#[cfg(feature = "russh")]
#[test]
#[serial]
fn test_provider_configure() {
    let env = CleanEnv::new();
    let mut provider = Provider::new();
    assert!(provider.configure(ProviderBlock::default()).is_err());
    assert!(!provider.is_configured());

    env.set("JUNOS_HOST", "192.0.2.40");
    provider.configure(ProviderBlock::default()).unwrap();
    assert!(provider.is_configured());
    assert_eq!(provider.client().unwrap().config().ip, "192.0.2.40");
}
