//! Setup command - add an account.

use anyhow::Result;
use clap::Args;
use tele2usage_fetch::Tele2Api;
use tele2usage_store::{SettingsStore, SetupInput, StoreError, configure_account};
use url::Url;

use crate::output::{AccountInfoOutput, JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the setup command.
#[derive(Args)]
pub struct SetupArgs {
    /// Tele2 login username.
    #[arg(long)]
    pub username: String,

    /// Tele2 login password.
    #[arg(long)]
    pub password: String,

    /// Display name of the account.
    #[arg(long)]
    pub name: Option<String>,

    /// Poll interval in seconds.
    #[arg(long)]
    pub interval: Option<u64>,

    /// Subscription to poll (defaults to the first one).
    #[arg(long)]
    pub subscription: Option<String>,

    /// Base URL of the Tele2 API.
    #[arg(long)]
    pub api_base: Option<String>,
}

/// Runs the setup command.
pub async fn run(args: &SetupArgs, cli: &Cli) -> Result<()> {
    let api = match &args.api_base {
        Some(base) => Tele2Api::new(
            Url::parse(base).map_err(|e| StoreError::Config(format!("invalid api base {base:?}: {e}")))?,
        ),
        None => Tele2Api::default(),
    };

    let settings = SettingsStore::load_default().await?;
    let input = SetupInput {
        name: args.name.clone(),
        username: args.username.clone(),
        password: args.password.clone(),
        poll_interval_secs: args.interval,
        subscription_id: args.subscription.clone(),
        api_base: args.api_base.clone(),
    };
    let account = configure_account(&api, &settings, input).await?;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!(
                "{}",
                formatter.format_success(&format!(
                    "Added {} (subscription {}, {})",
                    account.name, account.subscription_id, account.subscription_model
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
