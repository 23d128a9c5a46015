//! Schema command - print resource and data source schemas

use super::{impl_runnable, CommandContext};
use anyhow::Result;
use clap::Parser;
use serde_json::{json, Map, Value};

/// Arguments for the schema command
#[derive(Parser, Debug, Clone)]
pub struct SchemaArgs {
    /// Only this type; resources take precedence over data sources of the
    /// same name
    pub type_name: Option<String>,
}

impl SchemaArgs {
    /// Execute the schema command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let provider = &ctx.provider;

        let Some(name) = &self.type_name else {
            let mut resources = Map::new();
            for name in provider.resources().names() {
                resources.insert(name.to_string(), json!(provider.resource(name)?.schema()));
            }
            let mut data_sources = Map::new();
            for name in provider.data_sources().names() {
                data_sources.insert(
                    name.to_string(),
                    json!(provider.data_source(name)?.schema()),
                );
            }
            ctx.output.json(&json!({
                "resources": Value::Object(resources),
                "data_sources": Value::Object(data_sources),
            }))?;
            return Ok(0);
        };

        let schema = if let Ok(resource) = provider.resource(name) {
            resource.schema()
        } else {
            provider.data_source(name)?.schema()
        };
        ctx.output.json(&schema)?;
        Ok(0)
    }
}

impl_runnable!(SchemaArgs);
