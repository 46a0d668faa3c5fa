//! Info command: build, environment and credential diagnostics.

use anyhow::Result;
use chrono::Utc;
use clap::Args;

use adlib_core::AccessToken;

use crate::output;
use crate::session::Context;

#[derive(Args, Debug)]
pub struct InfoArgs {}

pub fn run(ctx: &Context, _args: InfoArgs) -> Result<()> {
    println!("meta-adlib {}", env!("ADLIB_VERSION"));
    println!();

    let binary = std::env::current_exe()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "(unknown)".to_string());
    output::field("  binary", &binary);
    output::field(
        "  platform",
        &format!("{}/{}", std::env::consts::OS, std::env::consts::ARCH),
    );
    output::field("  own config", &ctx.paths.local.display().to_string());
    output::field("  shared config", &ctx.paths.shared.display().to_string());
    output::field("  graph api", ctx.graph_url.as_str());
    println!();

    let now = Utc::now();
    let stores = ctx.stores();
    match stores.resolver(ctx.env.token.as_deref(), now).find() {
        Ok(Some(resolved)) => {
            output::field("  token source", &resolved.source.to_string());
            if let Some(record) = &resolved.record {
                let user = record
                    .user_name
                    .as_deref()
                    .or(record.user_id.as_deref())
                    .unwrap_or("(not validated)");
                output::field("  user", user);
                output::field("  expires", &output::expiry(record, now));
            }
        }
        Ok(None) => output::field("  token source", "(not set)"),
        Err(err) => output::field("  token source", &format!("(error: {err})")),
    }
    println!();

    let token = ctx
        .env
        .token
        .as_deref()
        .map(|t| AccessToken::new(t).masked())
        .unwrap_or_else(|| "(not set)".to_string());
    output::field("  META_TOKEN", &token);
    output::field("  META_APP_ID", set_or_not(ctx.env.app_id.is_some()));
    output::field("  META_APP_SECRET", set_or_not(ctx.env.app_secret.is_some()));
    println!();

    println!("token resolution order:");
    println!("  1. META_TOKEN env var");
    println!("  2. {}", ctx.paths.local.display());
    println!("  3. {} (read-only)", ctx.paths.shared.display());
    Ok(())
}

fn set_or_not(set: bool) -> &'static str {
    if set { "(set)" } else { "(not set)" }
}
