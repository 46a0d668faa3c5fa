//! meta-adlib - read-only CLI for the Meta Ad Library.
//!
//! A thin wrapper over `adlib-graph` for searching public ads, listing a
//! page's ads and managing the access token used to do so.

mod cli;
mod commands;
mod config;
mod output;
mod session;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use commands::{ad, auth, info, page, search};
use session::Context;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(&format!("{err:#}"));
            if let Some(hint) = output::error_hint(&err) {
                output::warn(hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = Context::new(&cli)?;

    match cli.command {
        Commands::Search(args) => search::run(&ctx, args).await,
        Commands::Page(cmd) => page::handle(&ctx, cmd).await,
        Commands::Ad(cmd) => ad::handle(&ctx, cmd).await,
        Commands::Auth(cmd) => auth::handle(&ctx, cmd).await,
        Commands::Info(args) => info::run(&ctx, args),
    }
}

fn init_logging(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
