//! junos-provider - Junos configuration as declarative resources
//!
//! This is the main entry point for the junos-provider CLI.

mod cli;

use anyhow::Result;
use cli::commands::{load_provider_block, CommandContext};
use cli::Cli;
use junos_provider::connection::config::expand_path;
use junos_provider::error::Error;
use junos_provider::telemetry::LoggingBuilder;
use std::path::{Path, PathBuf};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // NETCONF log path from the provider config, if it loads
    let netconf_log = netconf_log_path(&cli);

    LoggingBuilder::new()
        .with_verbosity(cli.verbosity())
        .with_format(cli.log_format.into())
        .with_ansi(!cli.no_color && std::env::var("NO_COLOR").is_err())
        .with_netconf_log(netconf_log)
        .init()?;

    if cli.verbosity() >= 2 {
        eprintln!("{}", junos_provider::version_info());
    }

    let mut ctx = CommandContext::new(&cli);

    let exit_code = match cli.command.runnable().run(&mut ctx).await {
        Ok(code) => code,
        Err(e) => {
            ctx.output.error(&format!("{:#}", e));
            e.downcast_ref::<Error>().map_or(1, Error::exit_code)
        }
    };

    ctx.output.flush();
    std::process::exit(exit_code);
}

/// `debug_netconf_log_path` from the config file, else `JUNOS_LOG_PATH`
fn netconf_log_path(cli: &Cli) -> Option<PathBuf> {
    let block = load_provider_block(cli.config.as_deref()).unwrap_or_else(|e| {
        if cli.verbosity() >= 1 {
            eprintln!("Warning: Failed to load config: {:#}", e);
        }
        Default::default()
    });
    block
        .debug_netconf_log_path
        .or_else(|| std::env::var("JUNOS_LOG_PATH").ok())
        .filter(|path| !path.is_empty())
        .map(|path| expand_path(Path::new(&path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_version() {
        assert!(!junos_provider::version().is_empty());
    }

    #[test]
    fn test_netconf_log_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("provider.toml");
        std::fs::write(&config, "debug_netconf_log_path = \"/tmp/netconf.log\"\n").unwrap();

        let cli = Cli::try_parse_from([
            "junos-provider",
            "-c",
            config.to_str().unwrap(),
            "schema",
        ])
        .unwrap();
        assert_eq!(netconf_log_path(&cli), Some(PathBuf::from("/tmp/netconf.log")));
    }
}
