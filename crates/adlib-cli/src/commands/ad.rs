//! Ad subcommands.

use anyhow::Result;
use clap::{Args, Subcommand};

use adlib_core::AdArchiveRecord;
use adlib_core::query::AD_DETAIL_FIELDS;

use crate::output;
use crate::session::Context;

#[derive(Args, Debug)]
pub struct AdCommand {
    #[command(subcommand)]
    pub command: AdSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AdSubcommand {
    /// Get detailed info for an ad by its archive ID
    Get(AdGetArgs),
}

#[derive(Args, Debug)]
pub struct AdGetArgs {
    /// Ad archive ID, as shown in search results
    pub id: String,
}

pub async fn handle(ctx: &Context, cmd: AdCommand) -> Result<()> {
    match cmd.command {
        AdSubcommand::Get(args) => get(ctx, args).await,
    }
}

async fn get(ctx: &Context, args: AdGetArgs) -> Result<()> {
    let client = ctx.client()?;

    let ad: AdArchiveRecord = client.get_object(&args.id, AD_DETAIL_FIELDS).await?;

    if ctx.output.is_json() {
        return ctx.output.emit(&ad);
    }

    println!("{}", output::ad_detail(&ad));
    Ok(())
}
