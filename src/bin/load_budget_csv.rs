use std::{error::Error, fs::File, path::PathBuf};

use clap::Parser;
use rusqlite::Connection;
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use budget_ledger::{LoadOptions, initialize_db, load_budget_csv};

/// Load a budget CSV file into the application database.
///
/// The CSV must have a header row followed by one row per budget item, with
/// the columns in table order.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the budget CSV file.
    csv_path: PathBuf,

    /// File path to the application SQLite database, created if it does not exist.
    #[arg(long, env = "BUDGET_DB_PATH")]
    db_path: PathBuf,

    /// Replace missing amounts with the mean of the row's other amounts.
    #[arg(long)]
    fill_missing: bool,

    /// Skip invalid rows instead of aborting the load.
    #[arg(long)]
    skip_invalid: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(filter::LevelFilter::INFO))
        .init();

    let args = Args::parse();

    let file = File::open(&args.csv_path)
        .map_err(|error| format!("could not open {}: {error}", args.csv_path.display()))?;
    let connection = Connection::open(&args.db_path)
        .map_err(|error| format!("could not open {}: {error}", args.db_path.display()))?;
    initialize_db(&connection)?;

    let options = LoadOptions {
        fill_missing: args.fill_missing,
        skip_invalid: args.skip_invalid,
    };
    tracing::info!(
        "Loading {} into {}",
        args.csv_path.display(),
        args.db_path.display()
    );
    let summary = load_budget_csv(file, &connection, options)?;

    println!(
        "Inserted {} rows, skipped {} rows.",
        summary.inserted, summary.skipped
    );

    Ok(())
}
