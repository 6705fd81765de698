use std::path::PathBuf;
use clap::Parser;

/// Scan for nearby BLE peripherals by name and connect to one of them.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Only list peripherals whose name contains this text (case-insensitive). Overrides the config file.
    #[arg(long)]
    pub name_filter: Option<String>,

    /// Path of the JSON config file to use instead of the default location.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log debug messages.
    #[arg(short, long)]
    pub verbose: bool,
}
