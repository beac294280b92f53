//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use pokedex_core::ThumbFormat;

#[derive(Parser)]
#[command(name = "pokedex")]
#[command(about = "Download Pokémon artwork and load it into a SQLite catalog", long_about = None)]
pub(crate) struct Cli {
    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write log output to a file (ANSI codes stripped)
    #[arg(long, global = true)]
    pub logfile: Option<PathBuf>,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Arguments for the download pass.
#[derive(Args, Clone)]
pub(crate) struct DownloadArgs {
    /// Output root for originals, thumbnails and metadata
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Entities processed at once (also caps requests in flight)
    #[arg(short = 'j', long, value_parser = clap::value_parser!(u32).range(1..))]
    pub concurrency: Option<u32>,

    /// First id to download
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub start: u32,

    /// Last id to download (inclusive)
    #[arg(long, default_value_t = 151, value_parser = clap::value_parser!(u32).range(1..))]
    pub end: u32,

    /// API base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Thumbnail encoding (webp or jpeg)
    #[arg(long)]
    pub thumb_format: Option<ThumbFormat>,
}

/// Filters for browsing the local catalog.
#[derive(Args, Clone)]
pub(crate) struct SearchArgs {
    /// Case-insensitive substring of the name
    #[arg(long)]
    pub name: Option<String>,

    /// Only entries of this type (e.g., fire, water)
    #[arg(long = "type")]
    pub type_name: Option<String>,

    /// Sort column
    #[arg(long, value_enum, default_value_t = SortArg::Id)]
    pub sort: SortArg,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,

    /// Maximum rows to show
    #[arg(short, long, default_value_t = 50)]
    pub limit: u32,

    /// Rows to skip
    #[arg(long, default_value_t = 0)]
    pub offset: u32,
}

#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum SortArg {
    Id,
    Name,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Download artwork, thumbnails and metadata for a range of ids
    Download(DownloadArgs),

    /// Load a metadata directory into the SQLite catalog
    Load {
        /// Metadata directory (defaults to <out_dir>/meta)
        #[arg(short, long)]
        meta_dir: Option<PathBuf>,

        /// Catalog database file
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// List entity names known to the API
    List {
        /// Page size
        #[arg(short, long, default_value_t = 20)]
        limit: u32,

        /// Entities to skip
        #[arg(long, default_value_t = 0)]
        offset: u32,

        /// Follow pagination and list everything
        #[arg(long)]
        all: bool,

        /// API base URL
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Browse entries in the local catalog
    Search {
        #[command(flatten)]
        filter: SearchArgs,

        /// Catalog database file
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Show one catalog entry
    Show {
        /// Entity id
        id: u32,

        /// Print the stored metadata JSON as well
        #[arg(long)]
        meta: bool,

        /// Catalog database file
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Show catalog statistics
    Stats {
        /// Catalog database file
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show the effective configuration
    Show,

    /// Print the config file path
    Path,
}
