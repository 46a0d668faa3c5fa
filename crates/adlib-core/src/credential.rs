//! Stored credential record and its derived lifecycle state.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::AccessToken;

/// Whole days of remaining validity at or below which a token is "expiring soon".
pub const EXPIRY_WARNING_DAYS: i64 = 7;

/// Owner of a token, as reported by the identity endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub name: String,
}

/// A persisted credential.
///
/// Saved wholesale; there is no partial update. On disk:
/// `{ "access_token", "user_id"?, "user_name"?, "token_expires_at"? }` with
/// the expiry in unix seconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    #[serde(default)]
    pub access_token: AccessToken,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "empty_as_none"
    )]
    pub user_id: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "empty_as_none"
    )]
    pub user_name: Option<String>,

    /// Absent means unknown or non-expiring, never the epoch.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "unix_seconds")]
    pub token_expires_at: Option<DateTime<Utc>>,
}

impl CredentialRecord {
    /// Create a record for a token with optional owner identity and expiry.
    pub fn new(
        access_token: AccessToken,
        identity: Option<Identity>,
        token_expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        let (user_id, user_name) = match identity {
            Some(identity) => (Some(identity.id), Some(identity.name)),
            None => (None, None),
        };
        Self {
            access_token,
            user_id,
            user_name,
            token_expires_at,
        }
    }

    /// A record without a token is no credential at all.
    pub fn is_empty(&self) -> bool {
        self.access_token.is_empty()
    }

    /// The recorded owner, if the token was validated.
    pub fn identity(&self) -> Option<Identity> {
        self.user_id.as_ref().map(|id| Identity {
            id: id.clone(),
            name: self.user_name.clone().unwrap_or_default(),
        })
    }

    /// Whole days until expiry; `None` when unknown, `Some(0)` once past.
    pub fn days_until_expiry(&self, now: DateTime<Utc>) -> Option<i64> {
        self.token_expires_at
            .map(|at| (at - now).num_days().max(0))
    }

    /// Derive the lifecycle state against the given wall-clock instant.
    pub fn state(&self, now: DateTime<Utc>) -> CredentialState {
        if self.is_empty() {
            return CredentialState::NoCredential;
        }

        if let Some(at) = self.token_expires_at {
            if at <= now {
                return CredentialState::Expired { at };
            }
            let days_left = (at - now).num_days();
            if days_left <= EXPIRY_WARNING_DAYS {
                return CredentialState::ExpiringSoon { at, days_left };
            }
        }

        if self.user_id.is_none() {
            return CredentialState::Unvalidated {
                expires_at: self.token_expires_at,
            };
        }

        CredentialState::Valid {
            expires_at: self.token_expires_at,
        }
    }

    /// The non-fatal warning a resolution from `source` should surface, if any.
    pub fn expiry_warning(&self, source: TokenSource, now: DateTime<Utc>) -> Option<ExpiryWarning> {
        let kind = match self.state(now) {
            CredentialState::Expired { at } => ExpiryKind::Expired { at },
            CredentialState::ExpiringSoon { at, days_left } => {
                ExpiryKind::ExpiringSoon { at, days_left }
            }
            _ => return None,
        };
        Some(ExpiryWarning { source, kind })
    }
}

/// Lifecycle state of a stored credential, recomputed on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialState {
    NoCredential,
    /// Token present but never checked against the identity endpoint.
    Unvalidated { expires_at: Option<DateTime<Utc>> },
    Valid { expires_at: Option<DateTime<Utc>> },
    ExpiringSoon { at: DateTime<Utc>, days_left: i64 },
    Expired { at: DateTime<Utc> },
}

impl CredentialState {
    pub fn is_usable(&self) -> bool {
        !matches!(self, CredentialState::NoCredential)
    }
}

/// Where a resolved token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    /// `META_TOKEN`
    Environment,
    /// This tool's own config file.
    Local,
    /// The config file maintained by `meta-auth`.
    Shared,
}

impl TokenSource {
    /// Command that renews a token from this source.
    pub fn refresh_hint(&self) -> Option<&'static str> {
        match self {
            TokenSource::Environment => None,
            TokenSource::Local => Some("meta-adlib auth refresh"),
            TokenSource::Shared => Some("meta-auth refresh"),
        }
    }

    fn subject(&self) -> &'static str {
        match self {
            TokenSource::Shared => "meta-auth token",
            _ => "token",
        }
    }
}

impl fmt::Display for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TokenSource::Environment => "META_TOKEN env var",
            TokenSource::Local => "own config",
            TokenSource::Shared => "meta-auth shared config",
        })
    }
}

/// Expiry condition carried by an [`ExpiryWarning`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryKind {
    Expired { at: DateTime<Utc> },
    ExpiringSoon { at: DateTime<Utc>, days_left: i64 },
}

/// A token that still works but needs renewal. Reported, never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryWarning {
    pub source: TokenSource,
    pub kind: ExpiryKind,
}

impl ExpiryWarning {
    pub fn is_expired(&self) -> bool {
        matches!(self.kind, ExpiryKind::Expired { .. })
    }
}

impl fmt::Display for ExpiryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subject = self.source.subject();
        match self.kind {
            ExpiryKind::Expired { .. } => write!(f, "{subject} has expired")?,
            ExpiryKind::ExpiringSoon { days_left, .. } => {
                write!(f, "{subject} expires in {days_left} day(s)")?
            }
        }
        if let Some(hint) = self.source.refresh_hint() {
            write!(f, "; run: {hint}")?;
        }
        Ok(())
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.is_empty()))
}

mod unix_seconds {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(at) => serializer.serialize_i64(at.timestamp()),
            None => serializer.serialize_none(),
        }
    }

    // Zero is how the sibling tool writes "unknown".
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<i64>::deserialize(deserializer)?;
        Ok(secs
            .filter(|s| *s > 0)
            .and_then(|s| DateTime::from_timestamp(s, 0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_760_000_000, 0).unwrap()
    }

    fn record_expiring_in(offset: Duration) -> CredentialRecord {
        CredentialRecord::new(
            AccessToken::new("tok"),
            Some(Identity {
                id: "42".to_string(),
                name: "Alice".to_string(),
            }),
            Some(now() + offset),
        )
    }

    #[test]
    fn seven_days_out_is_expiring_soon() {
        let record = record_expiring_in(Duration::days(7));
        assert_eq!(
            record.state(now()),
            CredentialState::ExpiringSoon {
                at: now() + Duration::days(7),
                days_left: 7
            }
        );
        let warning = record.expiry_warning(TokenSource::Local, now()).unwrap();
        assert!(!warning.is_expired());
        assert_eq!(
            warning.to_string(),
            "token expires in 7 day(s); run: meta-adlib auth refresh"
        );
    }

    #[test]
    fn thirty_days_out_is_valid() {
        let record = record_expiring_in(Duration::days(30));
        assert!(matches!(record.state(now()), CredentialState::Valid { .. }));
        assert!(record.expiry_warning(TokenSource::Local, now()).is_none());
        assert_eq!(record.days_until_expiry(now()), Some(30));
    }

    #[test]
    fn past_expiry_is_expired_not_expiring() {
        let record = record_expiring_in(Duration::hours(-3));
        assert!(matches!(record.state(now()), CredentialState::Expired { .. }));
        let warning = record.expiry_warning(TokenSource::Shared, now()).unwrap();
        assert!(warning.is_expired());
        assert_eq!(
            warning.to_string(),
            "meta-auth token has expired; run: meta-auth refresh"
        );
        assert_eq!(record.days_until_expiry(now()), Some(0));
    }

    #[test]
    fn unknown_expiry_never_warns() {
        let record = CredentialRecord::new(AccessToken::new("tok"), None, None);
        assert_eq!(
            record.state(now()),
            CredentialState::Unvalidated { expires_at: None }
        );
        assert!(record.expiry_warning(TokenSource::Local, now()).is_none());
        assert_eq!(record.days_until_expiry(now()), None);
    }

    #[test]
    fn empty_token_is_no_credential() {
        let record = CredentialRecord::default();
        assert!(record.is_empty());
        assert_eq!(record.state(now()), CredentialState::NoCredential);
        assert!(!record.state(now()).is_usable());
    }

    #[test]
    fn zero_expiry_reads_as_unknown() {
        let record: CredentialRecord = serde_json::from_str(
            r#"{"access_token":"tok","user_name":"","token_expires_at":0}"#,
        )
        .unwrap();
        assert_eq!(record.token_expires_at, None);
        assert_eq!(record.user_name, None);
    }

    #[test]
    fn absent_fields_are_omitted_on_write() {
        let record = CredentialRecord::new(AccessToken::new("tok"), None, None);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"access_token":"tok"}"#);

        let record = CredentialRecord::new(
            AccessToken::new("tok"),
            Some(Identity {
                id: "42".to_string(),
                name: "Alice".to_string(),
            }),
            DateTime::from_timestamp(1_765_000_000, 0),
        );
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["user_id"], "42");
        assert_eq!(value["token_expires_at"], 1_765_000_000);
    }
}
