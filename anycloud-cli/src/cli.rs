use std::path::PathBuf;

use anycloud_client::session::DEFAULT_SESSION_PATH;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "anycloud",
    version,
    about = "Command-line client for the Anycubic cloud printing API"
)]
pub struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage session credentials
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },

    /// Show cloud storage quota
    Quota {
        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,

        /// Session file path
        #[arg(long, default_value = DEFAULT_SESSION_PATH)]
        session: PathBuf,
    },

    /// List cloud files
    Ls {
        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = 10)]
        limit: u32,

        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,

        /// Session file path
        #[arg(long, default_value = DEFAULT_SESSION_PATH)]
        session: PathBuf,
    },

    /// Resolve the download URL for a file
    Pull {
        file_id: i64,

        /// Session file path
        #[arg(long, default_value = DEFAULT_SESSION_PATH)]
        session: PathBuf,
    },

    /// Delete a file from cloud storage
    Rm {
        file_id: i64,

        /// Session file path
        #[arg(long, default_value = DEFAULT_SESSION_PATH)]
        session: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Build a session file from browser artifacts
    Import {
        /// Cookie JSON export (array or name->value map)
        #[arg(long)]
        cookies: Option<PathBuf>,

        /// Token JSON export (flat object)
        #[arg(long)]
        tokens: Option<PathBuf>,

        /// Import everything from a browser HAR capture instead
        #[arg(long)]
        from_har: Option<PathBuf>,

        /// Where to write the session file
        #[arg(long, default_value = DEFAULT_SESSION_PATH)]
        out: PathBuf,
    },
}
