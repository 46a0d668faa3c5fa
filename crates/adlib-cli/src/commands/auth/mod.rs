//! Auth subcommand implementations.

mod extend_token;
mod logout;
mod refresh;
mod set_token;
mod status;

use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use clap::{Args, Subcommand};

use adlib_core::CredentialRecord;

use crate::output;
use crate::session::Context;

#[derive(Args, Debug)]
pub struct AuthCommand {
    #[command(subcommand)]
    pub command: AuthSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthSubcommand {
    /// Validate and save an access token
    SetToken(set_token::SetTokenArgs),

    /// Exchange a short-lived token for a long-lived one (~60 days)
    ExtendToken(extend_token::ExtendTokenArgs),

    /// Refresh the stored token before it expires
    Refresh(refresh::RefreshArgs),

    /// Show the stored credential
    Status(status::StatusArgs),

    /// Remove the stored credential
    Logout(logout::LogoutArgs),
}

pub async fn handle(ctx: &Context, cmd: AuthCommand) -> Result<()> {
    match cmd.command {
        AuthSubcommand::SetToken(args) => set_token::run(ctx, args).await,
        AuthSubcommand::ExtendToken(args) => extend_token::run(ctx, args).await,
        AuthSubcommand::Refresh(args) => refresh::run(ctx, args).await,
        AuthSubcommand::Status(args) => status::run(ctx, args),
        AuthSubcommand::Logout(args) => logout::run(ctx, args),
    }
}

/// Report a freshly saved credential.
fn print_saved(headline: &str, record: &CredentialRecord, path: &Path) {
    output::success(&format!("{headline}: authenticated as {}", owner(record)));
    if record.token_expires_at.is_some() {
        output::field("  expires", &output::expiry(record, Utc::now()));
    }
    output::field("  config", &path.display().to_string());
}

/// `Alice (ID: 42)`, or whatever part of it is known.
fn owner(record: &CredentialRecord) -> String {
    let name = record.user_name.as_deref().filter(|n| !n.is_empty());
    match (name, record.user_id.as_deref()) {
        (Some(name), Some(id)) => format!("{name} (ID: {id})"),
        (None, Some(id)) => format!("ID {id}"),
        (Some(name), None) => name.to_string(),
        (None, None) => "unknown user".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adlib_core::{AccessToken, Identity};

    #[test]
    fn owner_prefers_name_and_id() {
        let record = CredentialRecord::new(
            AccessToken::new("tok"),
            Some(Identity {
                id: "42".to_string(),
                name: "Alice".to_string(),
            }),
            None,
        );
        assert_eq!(owner(&record), "Alice (ID: 42)");

        let bare = CredentialRecord::new(AccessToken::new("tok"), None, None);
        assert_eq!(owner(&bare), "unknown user");
    }
}
