//! Set-token command implementation.

use anyhow::{Context as _, Result};
use clap::Args;

use adlib_core::{AccessToken, CredentialRecord, CredentialStore};
use adlib_graph::UpgradeNote;

use crate::output;
use crate::session::Context;

#[derive(Args, Debug)]
#[command(after_help = "The token is validated against /me. With META_APP_ID and \
META_APP_SECRET set it is first upgraded to a long-lived token (~60 days).

Examples:
  meta-adlib auth set-token EAABsbCS...
  meta-adlib auth set-token EAABsbCS... --no-extend")]
pub struct SetTokenArgs {
    /// Meta user access token
    pub token: String,

    /// Save the token as given, even if app credentials are available
    #[arg(long)]
    pub no_extend: bool,
}

pub async fn run(ctx: &Context, args: SetTokenArgs) -> Result<()> {
    let app = ctx.env.optional_app_credentials();
    let extend = !args.no_extend;

    if extend && app.is_some() {
        output::progress("app credentials found, upgrading to long-lived token (~60 days)...");
    }

    let lifecycle = ctx.lifecycle()?;
    let upgrade = lifecycle
        .upgrade(AccessToken::new(args.token), app.as_ref(), extend)
        .await;

    for note in &upgrade.notes {
        output::warn(&note.to_string());
        if *note == UpgradeNote::AppCredentialsMissing {
            output::warn("to extend later: meta-adlib auth extend-token <token> --save");
        }
    }
    if upgrade.upgraded {
        output::success("token upgraded to long-lived");
    }

    output::progress("validating token...");
    let identity = lifecycle.validate(&upgrade.token).await?;
    let record = CredentialRecord::new(upgrade.token, Some(identity), upgrade.expires_at);

    let store = ctx.local_store();
    store.save(&record).context("failed to save config")?;

    super::print_saved("token saved", &record, store.path());
    Ok(())
}
