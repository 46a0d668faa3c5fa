//! Extend-token command implementation.

use anyhow::{Context as _, Result};
use chrono::Utc;
use clap::Args;

use adlib_core::{AccessToken, CredentialRecord, CredentialStore};

use crate::output;
use crate::session::Context;

#[derive(Args, Debug)]
#[command(after_help = "Requires META_APP_ID and META_APP_SECRET.

Examples:
  meta-adlib auth extend-token EAABsbCS...
  meta-adlib auth extend-token EAABsbCS... --save")]
pub struct ExtendTokenArgs {
    /// Short-lived user access token
    pub short_token: String,

    /// Save the long-lived token to config, replacing the current one
    #[arg(long)]
    pub save: bool,
}

pub async fn run(ctx: &Context, args: ExtendTokenArgs) -> Result<()> {
    let app = ctx.env.app_credentials()?;
    let lifecycle = ctx.lifecycle()?;

    output::progress("exchanging for long-lived token...");
    let exchanged = lifecycle
        .exchange(&AccessToken::new(args.short_token), &app)
        .await?;

    if args.save {
        output::progress("validating token...");
        let identity = lifecycle.validate(&exchanged.token).await?;
        let record = CredentialRecord::new(exchanged.token, Some(identity), exchanged.expires_at);

        let store = ctx.local_store();
        store.save(&record).context("failed to save config")?;

        super::print_saved("long-lived token saved", &record, store.path());
        return Ok(());
    }

    output::success("long-lived token:");
    println!("{}", exchanged.token.as_str());
    if let Some(at) = exchanged.expires_at {
        let record = CredentialRecord::new(exchanged.token.clone(), None, Some(at));
        output::field("  expires", &output::expiry(&record, Utc::now()));
    }
    println!();
    println!("to save it, run: meta-adlib auth set-token <token>");
    println!("or re-run with --save");
    Ok(())
}
