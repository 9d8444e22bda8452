//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

/// scanty - a compact URL shortener storage core
#[derive(Parser)]
#[command(name = "scanty")]
#[command(version)]
#[command(about = "URL shortener storage core with pluggable backends", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, short = 'c', global = true, default_value = "config.toml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Store a URL and print its short code
    Save {
        /// Target URL
        url: String,

        /// Expiration time (RFC3339 or relative like "1d", "2h30m")
        #[arg(long)]
        expires: Option<String>,
    },

    /// Resolve a short code to its URL
    Load {
        /// Short code
        code: String,
    },

    /// Show the full record behind a short code
    Info {
        /// Short code
        code: String,
    },

    /// Print backend and cache diagnostics as JSON
    Stat,

    /// Remove expired links now
    Clean,

    /// Generate an example configuration file
    Config {
        /// Output path (default: stdout)
        output_path: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Keep the expiry cleaner running until Ctrl+C
    Run,
}
