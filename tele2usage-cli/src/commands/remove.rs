//! Remove command - delete an account.

use anyhow::Result;
use clap::Args;
use tele2usage_store::SettingsStore;

use crate::output::{AccountInfoOutput, JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the remove command.
#[derive(Args)]
pub struct RemoveArgs {
    /// Account name or subscription id.
    pub account: String,
}

/// Runs the remove command.
pub async fn run(args: &RemoveArgs, cli: &Cli) -> Result<()> {
    let settings = SettingsStore::load_default().await?;
    let removed = settings.remove_account(&args.account).await?;
    settings.save().await?;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_success(&format!("Removed {}", removed.name)));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&AccountInfoOutput::from(&removed))?);
        }
    }

    Ok(())
}
