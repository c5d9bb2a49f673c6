use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "krishi", version, about = "Crop advisory for Indian farms")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Recommend crops for a farm
    Recommend(RecommendArgs),
    /// Show the current and next growing season
    Season {
        /// Date to evaluate (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Resolve coordinates or an address to a place
    Locate(LocateArgs),
    /// Current weather and field conditions for a point
    Weather {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },
    /// Validate config and test connections
    Check,
    /// Re-run interactive setup
    Init,
}

#[derive(Args)]
pub struct RecommendArgs {
    /// JSON request body, or - for stdin. Flags below override its fields
    #[arg(long)]
    pub request: Option<PathBuf>,

    #[arg(long)]
    pub location: Option<String>,

    /// Kharif, Rabi or Zaid. Defaults to the current season
    #[arg(long)]
    pub season: Option<String>,

    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,

    #[arg(long)]
    pub soil: Option<String>,

    #[arg(long)]
    pub climate: Option<String>,

    /// e.g. "28°C"
    #[arg(long)]
    pub temperature: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args)]
#[group(required = true, multiple = true)]
pub struct LocateArgs {
    #[arg(long, requires = "lon", conflicts_with = "address", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    #[arg(long, requires = "lat", conflicts_with = "address", allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// Free-text address, searched within India
    #[arg(long)]
    pub address: Option<String>,
}
