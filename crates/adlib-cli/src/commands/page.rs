//! Page subcommands.

use anyhow::Result;
use clap::{Args, Subcommand};

use adlib_core::QuerySpec;

use super::AdFilters;
use crate::output;
use crate::session::Context;

#[derive(Args, Debug)]
pub struct PageCommand {
    #[command(subcommand)]
    pub command: PageSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum PageSubcommand {
    /// List the ads of a Facebook Page
    Ads(PageAdsArgs),
}

#[derive(Args, Debug)]
#[command(after_help = "Examples:
  meta-adlib page ads 123456789 --country US
  meta-adlib page ads 123456789 --country DE --status ACTIVE")]
pub struct PageAdsArgs {
    /// Facebook Page ID
    pub page_id: String,

    #[command(flatten)]
    pub filters: AdFilters,
}

pub async fn handle(ctx: &Context, cmd: PageCommand) -> Result<()> {
    match cmd.command {
        PageSubcommand::Ads(args) => ads(ctx, args).await,
    }
}

async fn ads(ctx: &Context, args: PageAdsArgs) -> Result<()> {
    let client = ctx.client()?;

    let mut spec = QuerySpec {
        page_ids: vec![args.page_id.clone()],
        ..QuerySpec::default()
    };
    args.filters.apply(&mut spec)?;

    let ads = client.search_ads(&spec, args.filters.limit).await?;

    let empty = format!("no ads found for page {}", args.page_id);
    output::ads(ctx.output, &ads, &empty, |n| {
        format!("{n} ad(s) for page {}", args.page_id)
    })
}
