//! CLI module for Recap.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Recap - keyword news and video summaries, re-summarized on demand
///
/// Runs the relay gateway in front of the summarization service, or drives a
/// search-select-summarize session against a running gateway.
#[derive(Parser, Debug)]
#[command(name = "recap")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the relay gateway
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,

        /// Base address of the upstream summarization service
        #[arg(long, env = "RECAP_UPSTREAM_URL")]
        upstream: Option<String>,

        /// Upstream request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Search a keyword and optionally re-summarize selected results
    Search {
        /// Keyword to search for
        keyword: String,

        /// News ordering (sim, date)
        #[arg(short, long)]
        sort: Option<String>,

        /// Items to re-summarize, e.g. "news:1,video:2" (1-based positions)
        #[arg(long, value_delimiter = ',')]
        select: Vec<String>,

        /// Re-summarize every result
        #[arg(long, conflicts_with = "select")]
        all: bool,

        /// Download the audio summary when one is offered
        #[arg(long)]
        audio: bool,

        /// Gateway base address
        #[arg(long, env = "RECAP_GATEWAY_URL")]
        gateway: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Write the current configuration to the config file
    Init,

    /// Show configuration file path
    Path,
}
