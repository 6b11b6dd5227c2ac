use crate::utils::constants::{
    COMPRESSION_SNAPPY, DEFAULT_DATASET_FILE, DEFAULT_HUMIDITY_FILE, DEFAULT_TEMPERATURE_FILE,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "wetbulb-monitor")]
#[command(about = "Wet-bulb temperature monitor for coastal India")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Hide progress output")]
    pub quiet: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(
        short,
        long,
        global = true,
        help = "Configuration file [default: wetbulb.toml when present]"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch current conditions for every location and compare wet-bulb temperatures
    Snapshot {
        #[arg(
            short,
            long,
            value_delimiter = ',',
            help = "Comma-separated subset of locations [default: all]"
        )]
        locations: Vec<String>,

        #[arg(long, help = "Maximum concurrent requests [default: from config]")]
        max_concurrency: Option<usize>,
    },

    /// Show current conditions for a single location
    Reading {
        #[arg(short, long)]
        location: String,
    },

    /// Join historical temperature and humidity tables into the WBT dataset
    Reconcile {
        #[arg(short, long, default_value = DEFAULT_TEMPERATURE_FILE)]
        temperature: PathBuf,

        #[arg(short = 'H', long, default_value = DEFAULT_HUMIDITY_FILE)]
        humidity: PathBuf,

        #[arg(
            short,
            long,
            default_value = DEFAULT_DATASET_FILE,
            help = "Output dataset (.csv, or .parquet for Parquet)"
        )]
        output: PathBuf,

        #[arg(long, help = "Missing-value marker [default: from config]")]
        missing_marker: Option<String>,

        #[arg(long, help = "reject, clamp or passthrough [default: from config]")]
        input_policy: Option<String>,

        #[arg(long, default_value = COMPRESSION_SNAPPY)]
        compression: String,

        #[arg(long, default_value = "false")]
        validate_only: bool,

        #[arg(long, default_value_t = num_cpus::get())]
        max_workers: usize,
    },

    /// Show one location's WBT series for a year
    Series {
        #[arg(short, long, default_value = DEFAULT_DATASET_FILE)]
        dataset: PathBuf,

        #[arg(short, long, help = "Station name (e.g. Cochin) or code (e.g. VOCI)")]
        location: String,

        #[arg(short, long, help = "Year [default: earliest available]")]
        year: Option<i32>,
    },

    /// Summarize a derived dataset per station
    Info {
        #[arg(short, long, default_value = DEFAULT_DATASET_FILE)]
        dataset: PathBuf,

        #[arg(short, long, default_value = "5")]
        sample: usize,
    },

    /// List locations, coordinates and historical station mappings
    Locations,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconcile_defaults() {
        let cli = Cli::parse_from(["wetbulb-monitor", "reconcile"]);
        match cli.command {
            Commands::Reconcile {
                temperature,
                humidity,
                output,
                validate_only,
                ..
            } => {
                assert_eq!(temperature, PathBuf::from("temp.csv"));
                assert_eq!(humidity, PathBuf::from("humid.csv"));
                assert_eq!(output, PathBuf::from("combined_with_wbt.csv"));
                assert!(!validate_only);
            }
            _ => panic!("expected reconcile"),
        }
    }

    #[test]
    fn test_snapshot_location_list() {
        let cli = Cli::parse_from([
            "wetbulb-monitor",
            "--quiet",
            "snapshot",
            "--locations",
            "Goa,Kochi",
        ]);
        assert!(cli.quiet);
        match cli.command {
            Commands::Snapshot { locations, .. } => assert_eq!(locations, vec!["Goa", "Kochi"]),
            _ => panic!("expected snapshot"),
        }
    }
}
