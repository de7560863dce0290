//! Options command - change the poll interval of an account.

use anyhow::Result;
use clap::Args;
use tele2usage_store::SettingsStore;

use crate::output::{AccountInfoOutput, JsonFormatter, TextFormatter, format_duration};
use crate::{Cli, OutputFormat};

/// Arguments for the options command.
#[derive(Args)]
pub struct OptionsArgs {
    /// Account name or subscription id.
    pub account: String,

    /// New poll interval in seconds.
    #[arg(long)]
    pub interval: u64,
}

/// Runs the options command.
pub async fn run(args: &OptionsArgs, cli: &Cli) -> Result<()> {
    let settings = SettingsStore::load_default().await?;
    let account = settings.set_poll_interval(&args.account, args.interval).await?;
    settings.save().await?;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!(
                "{}",
                formatter.format_success(&format!(
                    "{} now polls every {}",
                    account.name,
                    format_duration(account.poll_interval())
                ))
            );
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&AccountInfoOutput::from(&account))?);
        }
    }

    Ok(())
}
