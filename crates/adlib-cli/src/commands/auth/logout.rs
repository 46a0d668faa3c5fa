//! Logout command implementation.

use anyhow::{Context as _, Result};
use clap::Args;

use adlib_core::CredentialStore;

use crate::output;
use crate::session::Context;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub fn run(ctx: &Context, _args: LogoutArgs) -> Result<()> {
    let store = ctx.local_store();
    store.clear().context("failed to clear config")?;

    output::success("logged out");
    output::field("  removed", &store.path().display().to_string());
    Ok(())
}
