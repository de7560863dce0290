//! Accounts command - list configured accounts.

use anyhow::Result;
use tele2usage_store::SettingsStore;

use crate::output::{AccountInfoOutput, JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Runs the accounts command.
pub async fn run(cli: &Cli) -> Result<()> {
    let settings = SettingsStore::load_default().await?;
    let accounts = settings.accounts().await;

    match cli.format {
        OutputFormat::Text => {
            if accounts.is_empty() {
                println!("No accounts configured. Run `tele2usage setup` first.");
                return Ok(());
            }
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_accounts_header());
            for account in &accounts {
                println!("{}", formatter.format_account_line(account));
            }
        }
        OutputFormat::Json => {
            let outputs: Vec<AccountInfoOutput> = accounts.iter().map(AccountInfoOutput::from).collect();
            println!("{}", JsonFormatter::new(cli.pretty).format(&outputs)?);
        }
    }

    Ok(())
}
