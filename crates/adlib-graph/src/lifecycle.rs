//! Token validation, exchange and refresh.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, instrument, warn};

use adlib_core::error::{AuthError, ExchangeError};
use adlib_core::{
    AccessToken, AppCredentials, CredentialRecord, GraphUrl, Identity, QueryParams, Result,
};

use crate::endpoints::{IdentityResponse, ME, OAUTH_ACCESS_TOKEN, TokenResponse};
use crate::transport::{Transport, embedded_error, parse_body};

/// A long-lived token returned by the exchange endpoint.
#[derive(Debug, Clone)]
pub struct ExchangedToken {
    pub token: AccessToken,
    /// `None` when the response gave no positive lifetime.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Why a token was stored without being upgraded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpgradeNote {
    ExchangeFailed { reason: String },
    AppCredentialsMissing,
}

impl fmt::Display for UpgradeNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExchangeFailed { reason } => {
                write!(f, "could not extend token ({reason}); saved as-is")
            }
            Self::AppCredentialsMissing => f.write_str(
                "META_APP_ID/META_APP_SECRET not set; token saved without extension",
            ),
        }
    }
}

/// Outcome of [`TokenLifecycle::upgrade`]: the token to store.
#[derive(Debug, Clone)]
pub struct Upgrade {
    pub token: AccessToken,
    pub expires_at: Option<DateTime<Utc>>,
    /// Whether `token` is the exchanged one.
    pub upgraded: bool,
    pub notes: Vec<UpgradeNote>,
}

/// Talks to the identity and token exchange endpoints.
#[derive(Debug, Clone)]
pub struct TokenLifecycle {
    transport: Transport,
}

impl TokenLifecycle {
    pub fn new(base: GraphUrl) -> Result<Self> {
        Ok(Self {
            transport: Transport::new(base)?,
        })
    }

    /// Confirm a token is accepted and learn whom it belongs to.
    #[instrument(skip_all)]
    pub async fn validate(&self, token: &AccessToken) -> Result<Identity> {
        let params: QueryParams = [("fields", "id,name"), ("access_token", token.as_str())]
            .into_iter()
            .collect();
        let url = self.transport.url(ME, &params)?;
        let raw = self.transport.get(url).await?;

        if let Some(error) = embedded_error(&raw.body) {
            return Err(AuthError::Rejected {
                message: error.message,
            }
            .into());
        }
        if raw.status >= 400 {
            return Err(AuthError::Status {
                status: raw.status,
                body: raw.body,
            }
            .into());
        }

        let identity: IdentityResponse = parse_body(&raw.body, "identity")?;
        let id = identity
            .id
            .filter(|id| !id.is_empty())
            .ok_or(AuthError::MissingIdentity)?;

        debug!(user_id = %id, "token validated");
        Ok(Identity {
            id,
            name: identity.name.unwrap_or_default(),
        })
    }

    /// Trade a token for a long-lived one.
    ///
    /// Also used to refresh a long-lived token before it expires.
    #[instrument(skip_all, fields(app_id = %app.app_id()))]
    pub async fn exchange(
        &self,
        token: &AccessToken,
        app: &AppCredentials,
    ) -> Result<ExchangedToken> {
        let params: QueryParams = [
            ("grant_type", "fb_exchange_token"),
            ("client_id", app.app_id()),
            ("client_secret", app.app_secret()),
            ("fb_exchange_token", token.as_str()),
        ]
        .into_iter()
        .collect();
        let url = self.transport.url(OAUTH_ACCESS_TOKEN, &params)?;
        let raw = self.transport.get(url).await?;

        if let Some(error) = embedded_error(&raw.body) {
            return Err(ExchangeError::Rejected {
                message: error.message,
            }
            .into());
        }
        if raw.status >= 400 {
            return Err(ExchangeError::Status {
                status: raw.status,
                body: raw.body,
            }
            .into());
        }

        let response: TokenResponse = parse_body(&raw.body, "token exchange")?;
        let Some(access_token) = response.access_token.filter(|t| !t.is_empty()) else {
            return Err(ExchangeError::MissingToken { body: raw.body }.into());
        };

        let expires_at = response
            .expires_in
            .filter(|secs| *secs > 0)
            .map(|secs| Utc::now() + Duration::seconds(secs));

        debug!(?expires_at, "token exchanged");
        Ok(ExchangedToken {
            token: AccessToken::new(access_token),
            expires_at,
        })
    }

    /// Exchange the stored token for a fresh one, keeping the recorded owner.
    pub async fn refresh(
        &self,
        record: &CredentialRecord,
        app: &AppCredentials,
    ) -> Result<CredentialRecord> {
        let exchanged = self.exchange(&record.access_token, app).await?;
        info!("token refreshed");
        Ok(CredentialRecord::new(
            exchanged.token,
            record.identity(),
            exchanged.expires_at,
        ))
    }

    /// The token `set-token` should store: `token` upgraded to a long-lived
    /// one when `extend` is set and app credentials are available.
    ///
    /// A failed upgrade is not an error: the original token is kept and the
    /// reason is reported in [`Upgrade::notes`]. The result still needs
    /// [`validate`](Self::validate) before it is stored.
    pub async fn upgrade(
        &self,
        token: AccessToken,
        app: Option<&AppCredentials>,
        extend: bool,
    ) -> Upgrade {
        let mut notes = Vec::new();

        if extend {
            match app {
                Some(app) => match self.exchange(&token, app).await {
                    Ok(exchanged) => {
                        return Upgrade {
                            token: exchanged.token,
                            expires_at: exchanged.expires_at,
                            upgraded: true,
                            notes,
                        };
                    }
                    Err(err) => {
                        warn!(error = %err, "token exchange failed; keeping original token");
                        notes.push(UpgradeNote::ExchangeFailed {
                            reason: err.to_string(),
                        });
                    }
                },
                None => notes.push(UpgradeNote::AppCredentialsMissing),
            }
        }

        Upgrade {
            token,
            expires_at: None,
            upgraded: false,
            notes,
        }
    }
}
