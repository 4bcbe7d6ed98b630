use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use momo_dashboard::{Error, import_backup};

/// Convert an SMS backup of MTN MoMo notifications into a JSON file of
/// transaction records that the dashboard server can load with
/// `--records-file`.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path of the SMS backup XML file.
    #[arg(long)]
    input: PathBuf,

    /// File path to write the transaction records to.
    #[arg(long, default_value = "parsed_sms_data.json")]
    output: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .pretty()
                .with_filter(filter::LevelFilter::INFO),
        )
        .init();

    let args = Args::parse();

    match run(&args) {
        Ok(count) => {
            tracing::info!(
                "Saved {count} transactions to {}",
                args.output.display()
            );
            ExitCode::SUCCESS
        }
        Err(error) => {
            tracing::error!("{error}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<usize, Error> {
    let xml = std::fs::read_to_string(&args.input).map_err(|error| {
        Error::SmsImport(format!("could not read {}: {error}", args.input.display()))
    })?;

    let backup = import_backup(&xml)?;

    std::fs::write(&args.output, backup.json).map_err(|error| {
        Error::SmsImport(format!("could not write {}: {error}", args.output.display()))
    })?;

    Ok(backup.count)
}
