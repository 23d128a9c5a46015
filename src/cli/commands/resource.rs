//! Resource commands
//!
//! `validate`, `plan` and `upgrade-state` work offline; `apply`, `read`,
//! `import` and `destroy` configure the provider and talk to the device.

use super::{impl_runnable, load_document, CommandContext};
use anyhow::Result;
use clap::Parser;
use junos_provider::schema::Response;
use std::path::PathBuf;

/// Arguments for the validate command
#[derive(Parser, Debug, Clone)]
pub struct ValidateArgs {
    /// Resource type (e.g. junos_vlan)
    pub resource: String,

    /// Plan file (JSON or YAML)
    #[arg(long, short = 'p')]
    pub plan: PathBuf,
}

impl ValidateArgs {
    /// Execute the validate command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let resource = ctx.provider.resource(&self.resource)?;
        let plan = load_document(&self.plan)?;

        match resource.plan_lines(&plan) {
            Ok(_) => {
                ctx.output
                    .info(&format!("{} plan is valid", resource.type_name()));
                Ok(0)
            }
            Err(e) => {
                ctx.output.error(&e.to_string());
                Ok(e.exit_code())
            }
        }
    }
}

/// Arguments for the plan command
#[derive(Parser, Debug, Clone)]
pub struct PlanArgs {
    /// Resource type (e.g. junos_vlan)
    pub resource: String,

    /// Plan file (JSON or YAML)
    #[arg(long, short = 'p')]
    pub plan: PathBuf,

    /// Current state, to report replacements
    #[arg(long, short = 's')]
    pub state: Option<PathBuf>,
}

impl PlanArgs {
    /// Execute the plan command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let resource = ctx.provider.resource(&self.resource)?;
        let plan = load_document(&self.plan)?;

        let lines = match resource.plan_lines(&plan) {
            Ok(lines) => lines,
            Err(e) => {
                ctx.output.error(&e.to_string());
                return Ok(e.exit_code());
            }
        };

        if let Some(path) = &self.state {
            let state = load_document(path)?;
            if let Some(attribute) = resource.requires_replace(&state, &plan) {
                ctx.output.warning(&format!(
                    "{} changes, {} will be destroyed and created again",
                    attribute,
                    resource.type_name()
                ));
            }
        }

        ctx.output.lines(&lines);
        Ok(0)
    }
}

/// Arguments for the apply command
#[derive(Parser, Debug, Clone)]
pub struct ApplyArgs {
    /// Resource type (e.g. junos_vlan)
    pub resource: String,

    /// Plan file (JSON or YAML)
    #[arg(long, short = 'p')]
    pub plan: PathBuf,

    /// Current state; without it the resource is created
    #[arg(long, short = 's')]
    pub state: Option<PathBuf>,
}

impl ApplyArgs {
    /// Execute the apply command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let resource = ctx.provider.resource(&self.resource)?;
        let plan = load_document(&self.plan)?;
        let state = self.state.as_deref().map(load_document).transpose()?;
        ctx.ensure_configured()?;
        let client = ctx.provider.client()?;

        let response = match state {
            None => resource.create(client, plan).await,
            Some(state) => match resource.requires_replace(&state, &plan) {
                None => resource.update(client, state, plan).await,
                Some(attribute) => {
                    ctx.output.info(&format!(
                        "{} changes, replacing {}",
                        attribute,
                        resource.type_name()
                    ));
                    let deleted = resource.delete(client, state).await;
                    if deleted.has_error() {
                        deleted
                    } else {
                        let created = resource.create(client, plan).await;
                        let mut diagnostics = deleted.diagnostics;
                        diagnostics.extend(created.diagnostics);
                        Response {
                            state: created.state,
                            diagnostics,
                        }
                    }
                }
            },
        };

        ctx.report(&response)
    }
}

/// Arguments for the read command
#[derive(Parser, Debug, Clone)]
pub struct ReadArgs {
    /// Resource type (e.g. junos_vlan)
    pub resource: String,

    /// State file (JSON or YAML)
    #[arg(long, short = 's')]
    pub state: PathBuf,
}

impl ReadArgs {
    /// Execute the read command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let resource = ctx.provider.resource(&self.resource)?;
        let state = load_document(&self.state)?;
        ctx.ensure_configured()?;

        let response = resource.read(ctx.provider.client()?, state).await;
        if response.state.is_none() && !response.has_error() {
            ctx.output.warning(&format!(
                "{} no longer exists on the device",
                resource.type_name()
            ));
        }
        ctx.report(&response)
    }
}

/// Arguments for the import command
#[derive(Parser, Debug, Clone)]
pub struct ImportArgs {
    /// Resource type (e.g. junos_vlan)
    pub resource: String,

    /// Import id
    pub id: String,
}

impl ImportArgs {
    /// Execute the import command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let resource = ctx.provider.resource(&self.resource)?;
        ctx.ensure_configured()?;

        let response = resource.import(ctx.provider.client()?, &self.id).await;
        ctx.report(&response)
    }
}

/// Arguments for the destroy command
#[derive(Parser, Debug, Clone)]
pub struct DestroyArgs {
    /// Resource type (e.g. junos_vlan)
    pub resource: String,

    /// State file (JSON or YAML)
    #[arg(long, short = 's')]
    pub state: PathBuf,
}

impl DestroyArgs {
    /// Execute the destroy command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let resource = ctx.provider.resource(&self.resource)?;
        let state = load_document(&self.state)?;
        ctx.ensure_configured()?;

        let response = resource.delete(ctx.provider.client()?, state).await;
        ctx.report(&response)
    }
}

/// Arguments for the upgrade-state command
#[derive(Parser, Debug, Clone)]
pub struct UpgradeStateArgs {
    /// Resource type (e.g. junos_vlan)
    pub resource: String,

    /// Schema version the state was written with
    #[arg(long = "from-version")]
    pub from_version: u64,

    /// State file (JSON or YAML)
    #[arg(long, short = 's')]
    pub state: PathBuf,
}

impl UpgradeStateArgs {
    /// Execute the upgrade-state command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let resource = ctx.provider.resource(&self.resource)?;
        let state = load_document(&self.state)?;

        match resource.upgrade_state(self.from_version, state) {
            Ok(upgraded) => {
                ctx.output.json(&upgraded)?;
                Ok(0)
            }
            Err(e) => {
                ctx.output.error(&e.to_string());
                Ok(e.exit_code())
            }
        }
    }
}

impl_runnable!(
    ValidateArgs,
    PlanArgs,
    ApplyArgs,
    ReadArgs,
    ImportArgs,
    DestroyArgs,
    UpgradeStateArgs,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_args_parsing() {
        let args =
            ApplyArgs::try_parse_from(["apply", "junos_vlan", "--plan", "plan.json"]).unwrap();
        assert_eq!(args.resource, "junos_vlan");
        assert!(args.state.is_none());

        let args = ApplyArgs::try_parse_from([
            "apply",
            "junos_vlan",
            "-p",
            "plan.yaml",
            "-s",
            "state.json",
        ])
        .unwrap();
        assert_eq!(args.state, Some(PathBuf::from("state.json")));
    }

    #[test]
    fn test_plan_is_required() {
        assert!(ValidateArgs::try_parse_from(["validate", "junos_vlan"]).is_err());
    }

    #[test]
    fn test_import_args_parsing() {
        let args = ImportArgs::try_parse_from(["import", "junos_static_route", "0.0.0.0/0_-_default"])
            .unwrap();
        assert_eq!(args.id, "0.0.0.0/0_-_default");
    }
}
