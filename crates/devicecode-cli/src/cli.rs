//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use devicecode::normalize::NoteKind;
use devicecode::Origin;

/// DeviceCode: normalize, reconcile and query device wiki data
#[derive(Parser)]
#[command(name = "devicecode")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build canonical records from a wiki dump or an OpenWrt table
    Build {
        /// MediaWiki XML dump, or OpenWrt table of hardware (CSV/TSV)
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Wiki the input comes from (techinfodepot, wikidevi, openwrt)
        #[arg(long)]
        origin: Origin,

        /// Directory to write the records to
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        /// JSON reference tables extending the built-in ones
        #[arg(short, long)]
        reference: Option<PathBuf>,

        /// Build pages one at a time instead of in parallel
        #[arg(long)]
        sequential: bool,

        /// Drop boot log helper pages instead of folding them into their parent
        #[arg(long)]
        skip_helper_pages: bool,

        /// List stored records the new build no longer produces
        #[arg(long)]
        report_stale: bool,
    },

    /// Search stored records with a filter query
    Search {
        /// Directory with stored records
        #[arg(short, long, value_name = "DIR")]
        directory: PathBuf,

        /// Filter query, e.g. "brand=asus serial=yes year=2010:2012"
        #[arg(short, long, default_value = "")]
        filter: String,

        /// Fail when a filter value never occurs in the data
        #[arg(long)]
        strict: bool,

        /// Ignore overlays when loading records
        #[arg(long)]
        no_overlays: bool,

        /// Output format (compact, json)
        #[arg(long, default_value = "compact")]
        format: SearchFormat,
    },

    /// Group records of different wikis that describe the same device
    Reconcile {
        /// Directory with stored records
        #[arg(short, long, value_name = "DIR")]
        directory: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Write one squashed record per merge group to this directory
        #[arg(long, value_name = "DIR")]
        squash: Option<PathBuf>,
    },

    /// List the values a filter name takes in the data
    Dump {
        /// Directory with stored records
        #[arg(short, long, value_name = "DIR")]
        directory: PathBuf,

        /// Filter name, e.g. "brand" or "chip_vendor"
        #[arg(long)]
        value: String,

        /// Output format (list, counter, json)
        #[arg(long, default_value = "list")]
        format: DumpFormat,
    },

    /// Find devices built on the same ODM board
    Nearest {
        /// Directory with stored records
        #[arg(short, long, value_name = "DIR")]
        directory: PathBuf,

        /// ODM model name
        #[arg(short, long)]
        model: String,
    },

    /// List data-quality notes per device
    Lint {
        /// Directory with stored records
        #[arg(short, long, value_name = "DIR")]
        directory: PathBuf,

        /// Only show notes of this kind, e.g. "unverified_chip"
        #[arg(short, long)]
        kind: Option<NoteKind>,
    },
}

/// Output format for search results
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SearchFormat {
    /// One line per device
    #[default]
    Compact,
    /// Full records as a JSON array
    Json,
}

impl std::str::FromStr for SearchFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(SearchFormat::Compact),
            "json" => Ok(SearchFormat::Json),
            _ => Err(format!("Unknown format: {}. Use compact or json.", s)),
        }
    }
}

impl std::fmt::Display for SearchFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchFormat::Compact => write!(f, "compact"),
            SearchFormat::Json => write!(f, "json"),
        }
    }
}

/// Output format for value dumps
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DumpFormat {
    /// Values only, sorted
    #[default]
    List,
    /// Values with their device counts, most frequent first
    Counter,
    /// Value to count map as JSON
    Json,
}

impl std::str::FromStr for DumpFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "list" => Ok(DumpFormat::List),
            "counter" | "count" => Ok(DumpFormat::Counter),
            "json" => Ok(DumpFormat::Json),
            _ => Err(format!("Unknown format: {}. Use list, counter, or json.", s)),
        }
    }
}

impl std::fmt::Display for DumpFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DumpFormat::List => write!(f, "list"),
            DumpFormat::Counter => write!(f, "counter"),
            DumpFormat::Json => write!(f, "json"),
        }
    }
}
