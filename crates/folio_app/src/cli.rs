use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::logging::LogDestination;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Browse, import and search IIIF manifests on a folio server", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// RON configuration file (default: ./folio.ron if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Server root, overriding the configuration
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Where log output goes
    #[arg(long, value_enum, global = true)]
    pub log: Option<LogDestination>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Load a manifest and its remote IIIF document
    Manifest {
        /// Local manifest id
        id: String,
    },

    /// List recently added manifests and load their documents
    Recent,

    /// Import a remote manifest and wait for the job to finish
    Upload {
        /// URL of the remote IIIF manifest
        source_url: String,
    },

    /// Search the indexed manifests
    Search {
        query: String,

        /// Number of result pages to load
        #[arg(short, long, default_value = "1")]
        pages: u32,

        /// Also fetch query suggestions
        #[arg(long)]
        suggest: bool,
    },

    /// Look up OMR highlight locations on one page of a manifest
    Highlights {
        manifest_id: String,

        /// 0-based page index
        page_index: u32,

        /// Pitch sequence to look for, e.g. "cdefg"
        pitch: String,
    },

    /// Show server statistics
    Stats,
}
