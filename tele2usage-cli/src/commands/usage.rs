//! Usage command - poll once and print every sensor.

use anyhow::Result;
use clap::Args;
use tele2usage_store::SettingsStore;
use tracing::debug;

use super::{select_accounts, start_accounts};
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the usage command.
#[derive(Args, Default)]
pub struct UsageArgs {
    /// Account name or subscription id (all accounts if omitted).
    pub account: Option<String>,
}

/// Runs the usage command.
pub async fn run(args: &UsageArgs, cli: &Cli) -> Result<()> {
    let settings = SettingsStore::load_default().await?;
    let configs = select_accounts(&settings, args.account.as_deref()).await?;
    let accounts = start_accounts(configs).await?;

    let mut outputs = Vec::with_capacity(accounts.len());
    let text = TextFormatter::new(!cli.no_color);
    let json = JsonFormatter::new(cli.pretty);

    for (i, account) in accounts.iter().enumerate() {
        let mut sensors = account.sensors();
        for sensor in &mut sensors {
            let outcome = sensor.update().await;
            debug!(sensor = sensor.unique_id(), ?outcome, "Sensor read");
        }
        let snapshot = account.store().snapshot();

        match cli.format {
            OutputFormat::Text => {
                if i > 0 {
                    println!();
                }
                println!("{}", text.format_account(account.config(), &snapshot));
                for sensor in &sensors {
                    println!("{}", text.format_sensor(sensor));
                }
            }
            OutputFormat::Json => {
                outputs.push(json.account_output(account.config(), &snapshot, &sensors, None));
            }
        }
    }

    if cli.format == OutputFormat::Json {
        println!("{}", json.format_list(&outputs)?);
    }

    Ok(())
}
