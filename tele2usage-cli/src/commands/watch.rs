//! Watch command - keep polling and redraw on every change.

use anyhow::Result;
use clap::Args;
use futures::FutureExt;
use futures::future::select_all;
use std::io::{Write, stdout};
use tele2usage_core::UsageSource;
use tele2usage_store::{Account, Sensor, SettingsStore};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::{debug, info};

use super::{select_accounts, start_accounts};
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for watch command.
#[derive(Args)]
pub struct WatchArgs {
    /// Account name or subscription id (all accounts if omitted).
    pub account: Option<String>,

    /// How often each sensor is updated, in seconds.
    #[arg(long, default_value = "30")]
    pub scan_interval: u64,
}

/// Runs the watch command.
pub async fn run(args: &WatchArgs, cli: &Cli) -> Result<()> {
    if args.scan_interval == 0 {
        anyhow::bail!("scan interval must be greater than zero");
    }
    let scan = Duration::from_secs(args.scan_interval);

    let settings = SettingsStore::load_default().await?;
    let configs = select_accounts(&settings, args.account.as_deref()).await?;
    let accounts = start_accounts(configs).await?;
    info!(accounts = accounts.len(), scan_secs = args.scan_interval, "Starting watch mode");

    // One task per sensor, like a host platform scanning entities.
    let mut tasks = JoinSet::new();
    let mut readers: Vec<Vec<_>> = accounts
        .iter()
        .map(|account| {
            account
                .sensors()
                .into_iter()
                .map(|sensor| spawn_sensor(&mut tasks, sensor, scan))
                .collect()
        })
        .collect();
    let mut stores: Vec<_> = accounts.iter().map(|a| a.store().subscribe()).collect();
    render(&accounts, &readers, args, cli)?;

    loop {
        let changed = select_all(
            stores
                .iter_mut()
                .map(|rx| rx.changed().boxed())
                .chain(readers.iter_mut().flatten().map(|rx| rx.changed().boxed())),
        );
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            (result, _, _) = changed => {
                if result.is_err() {
                    break;
                }
            }
        }
        render(&accounts, &readers, args, cli)?;
    }

    tasks.shutdown().await;
    Ok(())
}

/// Spawns a task updating `sensor` every `scan`.
///
/// The receiver holds the sensor as of its latest update and is marked
/// changed only when the value changes.
fn spawn_sensor<S: UsageSource + 'static>(
    tasks: &mut JoinSet<()>,
    mut sensor: Sensor<S>,
    scan: Duration,
) -> watch::Receiver<Sensor<S>> {
    let (tx, rx) = watch::channel(sensor.clone());
    tasks.spawn(async move {
        let mut ticker = interval(scan);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let outcome = sensor.update().await;
            debug!(sensor = sensor.unique_id(), ?outcome, "Sensor scanned");
            tx.send_if_modified(|current| {
                if current.value() == sensor.value() {
                    return false;
                }
                *current = sensor.clone();
                true
            });
        }
    });
    rx
}

/// Current state of the running sensors of one account.
fn current_sensors<S: UsageSource>(readers: &[watch::Receiver<Sensor<S>>]) -> Vec<Sensor<S>> {
    readers.iter().map(|rx| (*rx.borrow()).clone()).collect()
}

fn render<S: UsageSource>(
    accounts: &[Account<S>],
    readers: &[Vec<watch::Receiver<Sensor<S>>>],
    args: &WatchArgs,
    cli: &Cli,
) -> Result<()> {
    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);

            print!("\x1b[2J\x1b[H");
            println!(
                "tele2usage watch - {} (scan: {}s)",
                chrono::Local::now().format("%H:%M:%S"),
                args.scan_interval
            );
            println!("{}", "─".repeat(50));

            for (account, readers) in accounts.iter().zip(readers) {
                println!();
                println!("{}", formatter.format_account(account.config(), &account.store().snapshot()));
                for sensor in &current_sensors(readers) {
                    println!("{}", formatter.format_sensor(sensor));
                }
                println!("{}", formatter.format_poll_status(&account.coordinator().status()));
            }

            println!();
            println!("Press Ctrl+C to exit");
        }
        OutputFormat::Json => {
            // One compact line per redraw.
            let formatter = JsonFormatter::new(false);
            let outputs: Vec<_> = accounts
                .iter()
                .zip(readers)
                .map(|(account, readers)| {
                    let status = account.coordinator().status();
                    formatter.account_output(
                        account.config(),
                        &account.store().snapshot(),
                        &current_sensors(readers),
                        Some(&status),
                    )
                })
                .collect();
            println!("{}", formatter.format_list(&outputs)?);
        }
    }

    stdout().flush()?;
    Ok(())
}
