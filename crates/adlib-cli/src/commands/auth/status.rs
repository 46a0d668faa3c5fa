//! Status command implementation.

use anyhow::{Context as _, Result};
use chrono::Utc;
use clap::Args;

use adlib_core::{CredentialState, CredentialStore};

use crate::output;
use crate::session::Context;

#[derive(Args, Debug)]
pub struct StatusArgs {}

pub fn run(ctx: &Context, _args: StatusArgs) -> Result<()> {
    let store = ctx.local_store();
    let record = store.load().context("failed to load config")?.unwrap_or_default();
    let now = Utc::now();

    let state = record.state(now);
    if !state.is_usable() {
        output::warn("not authenticated");
        println!("  → meta-adlib auth set-token <token>");
        println!("  → meta-auth login");
        println!("  → export META_TOKEN=<token>");
        return Ok(());
    }

    output::success(&format!("authenticated as {}", super::owner(&record)));
    match state {
        CredentialState::Expired { .. } | CredentialState::ExpiringSoon { .. } => {
            output::field("  expires", &output::expiry(&record, now));
            println!("  run: meta-adlib auth refresh");
        }
        CredentialState::Valid { expires_at: None }
        | CredentialState::Unvalidated { expires_at: None } => output::field(
            "  expires",
            "unknown (token may never expire, or expiry not tracked)",
        ),
        _ => output::field("  expires", &output::expiry(&record, now)),
    }
    if matches!(state, CredentialState::Unvalidated { .. }) {
        output::warn("token has not been validated; run: meta-adlib auth set-token <token>");
    }
    output::field("  config", &store.path().display().to_string());
    Ok(())
}
