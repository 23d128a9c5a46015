//! Subcommands module for the junos-provider CLI
//!
//! This module contains all the subcommand implementations.

pub mod command;
pub mod data;
pub mod resource;
pub mod schema;

use crate::cli::output::OutputFormatter;
use anyhow::{Context, Result};
use junos_provider::config::ProviderBlock;
use junos_provider::provider::Provider;
use junos_provider::schema::Response;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Common context shared between commands
pub struct CommandContext {
    /// Output formatter
    pub output: OutputFormatter,
    /// Provider configuration path
    pub config_path: Option<PathBuf>,
    /// Provider, configured on first use
    pub provider: Provider,
}

impl CommandContext {
    /// Create a new command context from CLI arguments
    pub fn new(cli: &crate::cli::Cli) -> Self {
        Self {
            output: OutputFormatter::new(!cli.no_color, cli.verbosity()),
            config_path: cli.config.clone(),
            provider: Provider::new(),
        }
    }

    /// Configure the provider from the config file and environment
    pub fn ensure_configured(&mut self) -> Result<()> {
        if !self.provider.is_configured() {
            let block = load_provider_block(self.config_path.as_deref())?;
            self.configure(block)?;
            self.output.debug("Provider configured");
        }
        Ok(())
    }

    #[cfg(feature = "russh")]
    fn configure(&mut self, block: ProviderBlock) -> Result<()> {
        self.provider
            .configure(block)
            .context("Failed to configure the provider")
    }

    #[cfg(not(feature = "russh"))]
    fn configure(&mut self, _block: ProviderBlock) -> Result<()> {
        anyhow::bail!("built without SSH support (feature `russh`)")
    }

    /// Print diagnostics and state; the exit code reflects errors
    pub fn report(&self, response: &Response) -> Result<i32> {
        self.output.diagnostics(&response.diagnostics);
        if response.has_error() {
            return Ok(1);
        }
        self.output
            .json(response.state.as_ref().unwrap_or(&Value::Null))?;
        Ok(0)
    }
}

/// Load the provider block, or an empty one when no file is given
pub fn load_provider_block(path: Option<&Path>) -> Result<ProviderBlock> {
    match path {
        Some(path) => Ok(ProviderBlock::from_file(path)?),
        None => Ok(ProviderBlock::default()),
    }
}

/// Load a plan or state document; `.yaml`/`.yml` files are YAML, anything
/// else JSON
pub fn load_document(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let value = if is_yaml {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid YAML in {}", path.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?
    };
    Ok(value)
}

/// Trait for runnable commands
#[async_trait::async_trait]
pub trait Runnable: Send + Sync {
    /// Execute the command
    async fn run(&self, ctx: &mut CommandContext) -> Result<i32>;
}

/// Implement [`Runnable`] for argument types with an `execute` method
macro_rules! impl_runnable {
    ($($args:ty),+ $(,)?) => {
        $(
            #[async_trait::async_trait]
            impl $crate::cli::commands::Runnable for $args {
                async fn run(
                    &self,
                    ctx: &mut $crate::cli::commands::CommandContext,
                ) -> anyhow::Result<i32> {
                    self.execute(ctx).await
                }
            }
        )+
    };
}
pub(crate) use impl_runnable;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_load_document_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let yaml = dir.path().join("plan.yml");
        std::fs::File::create(&yaml)
            .unwrap()
            .write_all(b"name: v100\nvlan_id: \"100\"\n")
            .unwrap();
        assert_eq!(
            load_document(&yaml).unwrap(),
            json!({"name": "v100", "vlan_id": "100"})
        );

        let json_file = dir.path().join("state.json");
        std::fs::write(&json_file, r#"{"id": "v100"}"#).unwrap();
        assert_eq!(load_document(&json_file).unwrap(), json!({"id": "v100"}));

        std::fs::write(&json_file, "name: v100").unwrap();
        assert!(load_document(&json_file).is_err());
    }

    #[test]
    fn test_missing_provider_file() {
        assert!(load_provider_block(None).is_ok());
        assert!(load_provider_block(Some(Path::new("/nonexistent/provider.toml"))).is_err());
    }
}
