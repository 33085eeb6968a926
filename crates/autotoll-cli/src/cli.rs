//! CLI definition using clap

use autotoll_types::{OutputFormat, VehicleType};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "autotoll")]
#[command(version)]
#[command(about = "Toll collection operations console")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Backend base URL. Uses config value if not specified.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Output format (json, table). Uses config value if not specified.
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a capture image and record the toll pass
    Analyze {
        /// Path to image file
        image: PathBuf,
    },

    /// Show recent toll passes
    History {
        /// Limit number of entries shown
        #[arg(long, short = 'n', default_value = "20")]
        limit: usize,

        /// Show only entries awaiting review
        #[arg(long)]
        review_only: bool,
    },

    /// Show the aggregate dashboard snapshot
    Summary,

    /// Show revenue, traffic, and distribution analytics
    Analytics,

    /// Work the manual review queue
    Review {
        #[command(subcommand)]
        action: ReviewAction,
    },

    /// Register an owner and vehicle
    Register {
        /// Owner name
        #[arg(long)]
        name: String,

        /// Owner contact info (email or phone)
        #[arg(long)]
        contact: String,

        /// License plate
        #[arg(long)]
        plate: String,

        /// Vehicle make and model
        #[arg(long)]
        model: String,

        /// Optional owner photo
        #[arg(long)]
        photo: Option<PathBuf>,
    },

    /// Bulk-import registry rows from a file
    Import {
        /// Path to import file
        file: PathBuf,
    },

    /// Look up a plate's registration and outstanding balance
    Lookup {
        /// License plate to look up
        plate: String,
    },

    /// List registered vehicles and owners
    Registry {
        /// Show owners instead of vehicles
        #[arg(long)]
        owners: bool,

        /// Show the trip log for one vehicle id
        #[arg(long, value_name = "VEHICLE_ID")]
        history: Option<i64>,
    },

    /// Continuously watch the summary and recent passes
    Watch {
        /// Poll interval in seconds. Uses config value if not specified.
        #[arg(long, short = 'i')]
        interval: Option<u64>,
    },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Set backend base URL
        #[arg(long)]
        set_base_url: Option<String>,

        /// Set default output format
        #[arg(long)]
        set_output: Option<OutputFormat>,

        /// Set a toll rate, e.g. --set-rate truck=12.50 (repeatable)
        #[arg(long, value_name = "TYPE=AMOUNT")]
        set_rate: Vec<String>,

        /// Set history/summary poll period in seconds
        #[arg(long)]
        set_history_poll: Option<u64>,

        /// Set analytics poll period in seconds
        #[arg(long)]
        set_analytics_poll: Option<u64>,

        /// Reset to defaults
        #[arg(long)]
        reset: bool,
    },
}

#[derive(Subcommand)]
pub enum ReviewAction {
    /// List records awaiting review
    List,

    /// Confirm a record, optionally correcting type and toll
    Confirm {
        /// Detection id
        id: i64,

        /// Corrected vehicle type. Keeps the recorded type if not specified.
        #[arg(long, short = 't')]
        vehicle_type: Option<VehicleType>,

        /// Corrected toll amount. Rated from the configured table if not specified.
        #[arg(long)]
        toll: Option<f64>,
    },

    /// Discard a record permanently
    Discard {
        /// Detection id
        id: i64,

        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}
