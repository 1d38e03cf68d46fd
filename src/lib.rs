//! Raspberryset: fetcher and indexed reader for the RaspberrySet
//! object-detection dataset.
//!
//! Two independent pieces with no shared state: a downloader that
//! stages the published zip archive and extracts it under a
//! processed-data directory, and a dataset reader that indexes an
//! extracted tree and serves (tensor, label, index) samples for a
//! training loop.
//!
//! # Modules
//!
//! - [`fetch`]: archive download and extraction
//! - [`dataset`]: directory scan, annotation index, sample retrieval
//! - [`config`]: data directory layout
//! - [`error`]: error types for raspberryset operations

pub mod config;
pub mod dataset;
pub mod error;
pub mod fetch;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::{info, warn};

pub use error::RaspberrySetError;

/// The raspberryset CLI application.
#[derive(Parser)]
#[command(name = "raspberryset")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Download a dataset archive and extract it under the data root.
    Fetch(FetchArgs),
}

/// Arguments for the fetch subcommand.
#[derive(clap::Args)]
struct FetchArgs {
    /// Name of the dataset to download (e.g., 'raspberryset').
    #[arg(long, default_value = "raspberryset")]
    dataset: String,

    /// Root directory for staged archives and extracted trees.
    #[arg(long, env = "RASPBERRYSET_DATA_ROOT", default_value = "data")]
    data_root: PathBuf,
}

/// Run the raspberryset CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), RaspberrySetError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Fetch(args)) => run_fetch(args),
        None => {
            // No subcommand: print a usage hint and exit successfully.
            println!("raspberryset {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Fetcher and indexed reader for the RaspberrySet dataset.");
            println!();
            println!("Run 'raspberryset --help' for usage information.");
            Ok(())
        }
    }
}

/// Execute the fetch subcommand.
fn run_fetch(args: FetchArgs) -> Result<(), RaspberrySetError> {
    info!("processing dataset request: {}", args.dataset);

    if !args.dataset.eq_ignore_ascii_case("raspberryset") {
        warn!("dataset '{}' is not supported yet", args.dataset);
        return Ok(());
    }

    let dirs = config::DataDirs::under(&args.data_root);
    fetch::fetch_raspberryset(&args.dataset, &dirs)?;

    info!("dataset processing complete");
    Ok(())
}
