//! Command command - run one operational command on the device

use super::{impl_runnable, CommandContext};
use anyhow::{Context, Result};
use clap::Parser;

/// Arguments for the command command
#[derive(Parser, Debug, Clone)]
pub struct CommandArgs {
    /// Command to run (e.g. "show version")
    #[arg(required = true)]
    pub command: String,
}

impl CommandArgs {
    /// Execute the command command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        ctx.ensure_configured()?;
        let client = ctx.provider.client()?;

        let mut session = client
            .start_new_session()
            .await
            .context("Failed to start a session")?;
        ctx.output
            .debug(&format!("Running '{}' on {}", self.command, session.device()));
        let result = session.command(&self.command).await;
        if let Err(e) = session.close().await {
            ctx.output
                .warning(&format!("Failed to close the session: {}", e));
        }

        match result {
            Ok(output) => {
                print!("{}", output);
                if !output.ends_with('\n') {
                    println!();
                }
                Ok(0)
            }
            Err(e) => {
                ctx.output.error(&e.to_string());
                Ok(e.exit_code())
            }
        }
    }
}

impl_runnable!(CommandArgs);
