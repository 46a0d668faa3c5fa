//! Refresh command implementation.

use anyhow::{Context as _, Result, anyhow};
use chrono::Utc;
use clap::Args;

use adlib_core::{CredentialState, CredentialStore};

use crate::output;
use crate::session::Context;

#[derive(Args, Debug)]
#[command(after_help = "Re-exchanges the stored token for a fresh long-lived one, \
resetting the ~60 day window. Requires META_APP_ID and META_APP_SECRET.

Run it periodically to keep the token alive:
  0 9 1 * * META_APP_ID=... META_APP_SECRET=... meta-adlib auth refresh")]
pub struct RefreshArgs {}

pub async fn run(ctx: &Context, _args: RefreshArgs) -> Result<()> {
    let app = ctx.env.app_credentials()?;

    let store = ctx.local_store();
    let record = store
        .load()
        .context("failed to load config")?
        .ok_or_else(|| anyhow!("not authenticated: run `meta-adlib auth set-token <token>`"))?;

    match record.state(Utc::now()) {
        CredentialState::Expired { .. } => {
            output::progress("token has expired, attempting refresh anyway...")
        }
        CredentialState::ExpiringSoon { days_left, .. } => output::progress(&format!(
            "current token expires in {days_left} day(s), refreshing now..."
        )),
        _ => output::progress("refreshing token..."),
    }

    let refreshed = ctx
        .lifecycle()?
        .refresh(&record, &app)
        .await
        .context("token refresh failed")?;
    store
        .save(&refreshed)
        .context("failed to save refreshed token")?;

    super::print_saved("token refreshed", &refreshed, store.path());
    Ok(())
}
