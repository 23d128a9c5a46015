//! Data command - read a data source

use super::{impl_runnable, load_document, CommandContext};
use anyhow::Result;
use clap::Parser;
use serde_json::Value;
use std::path::PathBuf;

/// Arguments for the data command
#[derive(Parser, Debug, Clone)]
pub struct DataArgs {
    /// Data source type (e.g. junos_routes)
    pub data_source: String,

    /// Arguments file (JSON or YAML)
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,
}

impl DataArgs {
    /// Execute the data command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let data_source = ctx.provider.data_source(&self.data_source)?;
        let input = match &self.input {
            Some(path) => load_document(path)?,
            None => Value::Null,
        };
        ctx.ensure_configured()?;

        let response = data_source.read(ctx.provider.client()?, input).await;
        ctx.report(&response)
    }
}

impl_runnable!(DataArgs);
