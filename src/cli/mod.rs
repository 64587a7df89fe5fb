//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

pub mod commands;

/// Memkeep - local-first keeper for photo/video memories
#[derive(Parser, Debug)]
#[command(name = "mk", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (default: ~/.memkeep/data/memkeep.db)
    #[arg(long, global = true, env = "MK_DB")]
    pub db: Option<PathBuf>,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the local store
    Init {
        /// Overwrite an existing store
        #[arg(long)]
        force: bool,
    },

    /// Add a photo or video memory
    Add(AddArgs),

    /// List stored memories
    List(ListArgs),

    /// Remove a memory by id
    Rm {
        /// Id of the record to remove
        id: i64,
    },

    /// Remove every memory, locally and remotely
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Export all memories to a backup file
    Export {
        /// Directory to write the backup into (default: current directory)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Import a backup file and merge it into the store
    Import {
        /// Backup file to import
        file: PathBuf,
    },

    /// Reconcile with the remote mirror now
    Sync,

    /// Follow remote changes and apply them live
    Watch,

    /// Show record counts, storage usage, and sync state
    Status,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print version information
    Version,
}

/// Arguments for `mk add`.
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Media file to embed (mutually exclusive with --url)
    #[arg(conflicts_with = "url")]
    pub file: Option<PathBuf>,

    /// Reference URL instead of an embedded file
    #[arg(long)]
    pub url: Option<String>,

    /// Store as a video instead of a photo
    #[arg(long)]
    pub video: bool,

    /// Category tag (ignored for videos)
    #[arg(long, default_value = "uncategorized")]
    pub category: String,

    /// Caption text
    #[arg(long)]
    pub caption: Option<String>,
}

/// Arguments for `mk list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only records in this category
    #[arg(long, conflicts_with = "videos")]
    pub category: Option<String>,

    /// Only video records
    #[arg(long)]
    pub videos: bool,

    /// Limit the number of rows shown
    #[arg(long)]
    pub limit: Option<usize>,
}
