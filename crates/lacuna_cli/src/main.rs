//! Lacuna CLI
//!
//! Command-line tools for exercising sparse stores.
//!
//! # Commands
//!
//! - `exercise` - Run a scripted workload and print per-store statistics
//! - `report` - Run a workload and render the occupancy report
//! - `version` - Show version information

mod commands;

use clap::{Parser, Subcommand};
use lacuna_store::StoreConfig;
use tracing_subscriber::EnvFilter;

/// Lacuna command-line store tools.
#[derive(Parser)]
#[command(name = "lacuna")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Number of stores in the set
    #[arg(global = true, short, long, default_value = "4")]
    stores: usize,

    /// Bytes per block
    #[arg(global = true, short, long, default_value = "4000")]
    quantum: usize,

    /// Block slots per segment
    #[arg(global = true, long, default_value = "1000")]
    qset: usize,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted workload and print per-store statistics
    Exercise {
        /// Number of writes per store
        #[arg(short, long, default_value = "64")]
        writes: usize,

        /// Payload size per write in bytes
        #[arg(short, long, default_value = "256")]
        payload: usize,

        /// Gap between write offsets (0 = contiguous)
        #[arg(short = 'g', long, default_value = "0")]
        stride: u64,
    },

    /// Run a workload and render the occupancy report
    Report {
        /// Number of writes per store
        #[arg(short, long, default_value = "64")]
        writes: usize,

        /// Payload size per write in bytes
        #[arg(short, long, default_value = "256")]
        payload: usize,

        /// Gap between write offsets (0 = contiguous)
        #[arg(short = 'g', long, default_value = "0")]
        stride: u64,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = StoreConfig::new().quantum(cli.quantum).qset(cli.qset);

    match cli.command {
        Commands::Exercise {
            writes,
            payload,
            stride,
        } => {
            commands::exercise::run(cli.stores, config, writes, payload, stride)?;
        }
        Commands::Report {
            writes,
            payload,
            stride,
        } => {
            commands::report::run(cli.stores, config, writes, payload, stride)?;
        }
        Commands::Version => {
            println!("Lacuna CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Lacuna Store v{}", lacuna_store::VERSION);
        }
    }

    Ok(())
}
