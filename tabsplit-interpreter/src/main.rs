#![warn(clippy::uninlined_format_args)]

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::{borrow::Cow, fs, path::PathBuf, process};
use tabsplit_application::{LedgerConfig, LedgerProcessor, LedgerSnapshot, Viewer};
use tabsplit_presentation::{LedgerPresenter, directory_from_bills};
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Cow<'static, str>>;

const LOG_FILTER_VAR: &str = "TABSPLIT_LOG";

/// Bill shares, balances and settlement plans from a ledger snapshot.
#[derive(Parser)]
#[command(name = "tabsplit", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Recompute and print every participant's share per bill.
    Share(SnapshotArgs),
    /// Owed-to-me / I-owe totals and the per-person breakdown for a viewer.
    Balances(ViewerArgs),
    /// Collapse the snapshot's debts (or debts derived from its bills) into payments.
    Simplify(SnapshotArgs),
    /// Balances and settlement plan together.
    Report(ViewerArgs),
}

#[derive(Args)]
struct SnapshotArgs {
    /// JSON snapshot with `bills` and/or `debts`.
    file: PathBuf,
    /// Emit JSON instead of tables.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ViewerArgs {
    #[command(flatten)]
    snapshot: SnapshotArgs,
    /// Viewer identity; defaults to the snapshot's `viewer`.
    #[arg(long)]
    viewer: Option<String>,
    /// Viewer email used to find shares the viewer owes.
    #[arg(long)]
    email: Option<String>,
}

impl ViewerArgs {
    fn viewer(&self) -> Option<Viewer> {
        self.viewer.as_ref().map(|identity| Viewer {
            identity: identity.clone(),
            email: self.email.clone(),
        })
    }
}

fn main() {
    init_logging();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_FILTER_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> CliResult<()> {
    let config = LedgerConfig::from_env().map_err(|err| err.to_string())?;
    tracing::debug!(email_match = ?config.email_match, currency = %config.currency, "Loaded configuration");
    let processor = LedgerProcessor::new(&config);

    match cli.command {
        Command::Share(args) => {
            let mut snapshot = load_snapshot(&args)?;
            processor.refresh_shares(&mut snapshot.bills);
            if args.json {
                return print_json(&snapshot.bills);
            }
            let directory = directory_from_bills(&snapshot.bills);
            let presenter = LedgerPresenter::new(&config.currency, &directory);
            for bill in &snapshot.bills {
                println!("{}", presenter.render_bill_shares(bill));
            }
        }
        Command::Balances(args) => {
            let mut snapshot = load_snapshot(&args.snapshot)?;
            let viewer = resolve_viewer(&args, &snapshot)?;
            processor.refresh_shares(&mut snapshot.bills);
            let summary = processor.balances(&viewer, &snapshot.bills);
            if args.snapshot.json {
                return print_json(&summary);
            }
            let directory = directory_from_bills(&snapshot.bills);
            let presenter = LedgerPresenter::new(&config.currency, &directory);
            print!("{}", presenter.render_summary(&summary));
            if !summary.balances.is_empty() {
                println!();
                print!("{}", presenter.render_person_balances(&summary.balances));
            }
        }
        Command::Simplify(args) => {
            let mut snapshot = load_snapshot(&args)?;
            processor.refresh_shares(&mut snapshot.bills);
            let (_, settlement) = processor.settle(&snapshot);
            if args.json {
                return print_json(&settlement);
            }
            let directory = directory_from_bills(&snapshot.bills);
            let presenter = LedgerPresenter::new(&config.currency, &directory);
            print!("{}", presenter.render_payments(&settlement.simplified_payments));
            println!("{}", settlement.savings_message);
        }
        Command::Report(args) => {
            let snapshot = load_snapshot(&args.snapshot)?;
            let viewer = resolve_viewer(&args, &snapshot)?;
            let directory = directory_from_bills(&snapshot.bills);
            let report = processor
                .process(snapshot, Some(viewer))
                .map_err(|err| err.to_string())?;
            if args.snapshot.json {
                return print_json(&report);
            }
            let presenter = LedgerPresenter::new(&config.currency, &directory);
            print!("{}", presenter.render_report(&report));
        }
    }

    Ok(())
}

fn load_snapshot(args: &SnapshotArgs) -> CliResult<LedgerSnapshot> {
    let path = args.file.display();
    let source =
        fs::read_to_string(&args.file).map_err(|err| format!("Failed to read '{path}': {err}"))?;
    serde_json::from_str(&source).map_err(|err| format!("Invalid snapshot '{path}': {err}").into())
}

fn resolve_viewer(args: &ViewerArgs, snapshot: &LedgerSnapshot) -> CliResult<Viewer> {
    let mut viewer = args
        .viewer()
        .or_else(|| snapshot.viewer.clone())
        .ok_or("No viewer given; pass --viewer or set `viewer` in the snapshot")?;
    if let Some(email) = &args.email {
        viewer.email = Some(email.clone());
    }
    Ok(viewer)
}

fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    let output =
        serde_json::to_string_pretty(value).map_err(|err| format!("Failed to encode JSON: {err}"))?;
    println!("{output}");
    Ok(())
}
