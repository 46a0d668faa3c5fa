//! Access token resolution.
//!
//! Order, first non-empty wins:
//!
//! 1. `META_TOKEN` environment override
//! 2. this tool's own credential store
//! 3. the store shared with `meta-auth`
//!
//! Expiring or expired stored tokens are still returned; the caller gets
//! the warnings alongside.

use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

use crate::credential::{CredentialRecord, ExpiryWarning, TokenSource};
use crate::error::Error;
use crate::store::CredentialStore;
use crate::types::AccessToken;
use crate::Result;

/// Everything resolution reads, passed in explicitly.
pub struct CredentialResolver<'a> {
    pub env_token: Option<&'a str>,
    pub local: &'a dyn CredentialStore,
    pub shared: &'a dyn CredentialStore,
    pub now: DateTime<Utc>,
}

/// A usable token and where it came from.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub token: AccessToken,
    pub source: TokenSource,
    /// The stored record, absent for the environment override.
    pub record: Option<CredentialRecord>,
    pub warnings: Vec<ExpiryWarning>,
}

impl<'a> CredentialResolver<'a> {
    pub fn new(local: &'a dyn CredentialStore, shared: &'a dyn CredentialStore) -> Self {
        Self {
            env_token: None,
            local,
            shared,
            now: Utc::now(),
        }
    }

    pub fn with_env_token(mut self, token: Option<&'a str>) -> Self {
        self.env_token = token;
        self
    }

    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Resolve a token or fail with [`Error::Unauthenticated`].
    pub fn resolve(&self) -> Result<Resolved> {
        self.find()?.ok_or(Error::Unauthenticated)
    }

    /// Walk the chain without treating "nothing found" as an error.
    #[instrument(skip(self))]
    pub fn find(&self) -> Result<Option<Resolved>> {
        if let Some(token) = self.env_token.filter(|t| !t.trim().is_empty()) {
            debug!(source = %TokenSource::Environment, "resolved token");
            return Ok(Some(Resolved {
                token: AccessToken::new(token),
                source: TokenSource::Environment,
                record: None,
                warnings: Vec::new(),
            }));
        }

        for (source, store) in [
            (TokenSource::Local, self.local),
            (TokenSource::Shared, self.shared),
        ] {
            let Some(record) = store.load()? else {
                debug!(%source, path = %store.path().display(), "no credential");
                continue;
            };
            if record.is_empty() {
                continue;
            }

            debug!(%source, "resolved token");
            let warnings = record.expiry_warning(source, self.now).into_iter().collect();
            return Ok(Some(Resolved {
                token: record.access_token.clone(),
                source,
                record: Some(record),
                warnings,
            }));
        }

        Ok(None)
    }
}
