//! CLI argument definitions.

use clap::{Parser, Subcommand};

use adlib_core::types::DEFAULT_GRAPH_URL;

use crate::commands::ad::AdCommand;
use crate::commands::auth::AuthCommand;
use crate::commands::info::InfoArgs;
use crate::commands::page::PageCommand;
use crate::commands::search::SearchArgs;

/// Search and explore public ads in the Meta Ad Library.
#[derive(Parser, Debug)]
#[command(name = "meta-adlib")]
#[command(author, version = env!("ADLIB_VERSION"), about)]
#[command(long_about = "Read-only access to the public Meta Ad Library: ads run on \
Facebook, Instagram, Messenger, Threads and Audience Network.

Token resolution order:
  1. META_TOKEN env var
  2. own config    (meta-adlib auth set-token)
  3. shared config (meta-auth login)")]
pub struct Cli {
    /// Force JSON output
    #[arg(long, global = true)]
    pub json: bool,

    /// Force pretty-printed JSON output (implies --json)
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Graph API base URL, including the version
    #[arg(
        long,
        global = true,
        hide = true,
        env = "META_GRAPH_URL",
        default_value = DEFAULT_GRAPH_URL
    )]
    pub graph_url: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search the Ad Library
    Search(SearchArgs),

    /// Browse ads by Facebook Page
    Page(PageCommand),

    /// Get details about a specific ad
    Ad(AdCommand),

    /// Manage the stored access token
    Auth(AuthCommand),

    /// Show config paths, token source and environment
    Info(InfoArgs),
}
