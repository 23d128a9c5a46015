//! CLI module for junos-provider
//!
//! Argument parsing and subcommand dispatch. Every subcommand drives one
//! provider operation against the device named by the provider config.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand, ValueEnum};
use junos_provider::telemetry::LogFormat;
use std::path::PathBuf;

/// Junos configuration as declarative resources
#[derive(Parser, Debug, Clone)]
#[command(name = "junos-provider")]
#[command(version)]
#[command(about = "Manage Junos configuration as declarative resources", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the provider configuration (TOML)
    #[arg(short = 'c', long, global = true, env = "JUNOS_PROVIDER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Format of log events on stderr
    #[arg(long, global = true, default_value = "compact")]
    pub log_format: LogFormatArg,
}

/// Log event format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormatArg {
    /// One line per event
    #[default]
    Compact,
    /// One JSON object per event
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Print the schema of resource and data source types
    Schema(commands::schema::SchemaArgs),

    /// Validate a plan without contacting the device
    Validate(commands::resource::ValidateArgs),

    /// Print the set lines a plan would load
    Plan(commands::resource::PlanArgs),

    /// Create a resource, or update it when a state is given
    Apply(commands::resource::ApplyArgs),

    /// Refresh a resource state from the device
    Read(commands::resource::ReadArgs),

    /// Import an existing object by id
    Import(commands::resource::ImportArgs),

    /// Delete a resource
    Destroy(commands::resource::DestroyArgs),

    /// Read a data source
    Data(commands::data::DataArgs),

    /// Run an operational command on the device
    Command(commands::command::CommandArgs),

    /// Upgrade a stored state to the current schema version
    #[command(name = "upgrade-state")]
    UpgradeState(commands::resource::UpgradeStateArgs),
}

impl Commands {
    /// The command to run
    pub fn runnable(&self) -> &dyn commands::Runnable {
        match self {
            Commands::Schema(args) => args,
            Commands::Validate(args) => args,
            Commands::Plan(args) => args,
            Commands::Apply(args) => args,
            Commands::Read(args) => args,
            Commands::Import(args) => args,
            Commands::Destroy(args) => args,
            Commands::Data(args) => args,
            Commands::Command(args) => args,
            Commands::UpgradeState(args) => args,
        }
    }
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Get the effective verbosity level (0-3)
    pub fn verbosity(&self) -> u8 {
        self.verbose.min(3)
    }
}
