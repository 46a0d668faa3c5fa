//! Bearer token and application identity types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A Graph API access token.
///
/// Sent as the `access_token` query parameter on every request.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Create a new access token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token value.
    ///
    /// # Security
    ///
    /// Use only when constructing requests or writing the credential file.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty token is the same as no token at all.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// First and last four characters, for status displays.
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 8 {
            return "***".to_string();
        }
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    }
}

// Hide token value in Debug output
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessToken").field(&"[REDACTED]").finish()
    }
}

/// Application identity used for token exchange.
///
/// Read from `META_APP_ID` and `META_APP_SECRET`; only the exchange and
/// refresh operations need it.
#[derive(Clone)]
pub struct AppCredentials {
    app_id: String,
    app_secret: String,
}

impl AppCredentials {
    /// Create new application credentials.
    pub fn new(app_id: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_secret: app_secret.into(),
        }
    }

    /// Build from optional environment values, naming the first missing one.
    pub fn from_env_values(
        app_id: Option<&str>,
        app_secret: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let app_id = non_empty(app_id).ok_or(ValidationError::MissingEnv {
            name: "META_APP_ID",
            hint: "your_app_id",
        })?;
        let app_secret = non_empty(app_secret).ok_or(ValidationError::MissingEnv {
            name: "META_APP_SECRET",
            hint: "your_app_secret",
        })?;
        Ok(Self::new(app_id, app_secret))
    }

    /// Both values present, or nothing.
    pub fn available(app_id: Option<&str>, app_secret: Option<&str>) -> Option<Self> {
        Self::from_env_values(app_id, app_secret).ok()
    }

    /// Returns the application id.
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Returns the application secret.
    ///
    /// # Security
    ///
    /// Use only when constructing the exchange request.
    pub fn app_secret(&self) -> &str {
        &self.app_secret
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

impl fmt::Debug for AppCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppCredentials")
            .field("app_id", &self.app_id)
            .field("app_secret", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_hides_value_in_debug() {
        let token = AccessToken::new("EAABsbCS1234567890");
        let debug = format!("{:?}", token);
        assert!(!debug.contains("EAAB"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn masked_keeps_ends_only() {
        assert_eq!(AccessToken::new("EAABsbCS1234567890").masked(), "EAAB...7890");
        assert_eq!(AccessToken::new("short").masked(), "***");
    }

    #[test]
    fn whitespace_token_is_empty() {
        assert!(AccessToken::new("  ").is_empty());
        assert!(!AccessToken::new("tok").is_empty());
    }

    #[test]
    fn app_credentials_hide_secret_in_debug() {
        let app = AppCredentials::new("123", "s3cr3t");
        let debug = format!("{:?}", app);
        assert!(debug.contains("123"));
        assert!(!debug.contains("s3cr3t"));
    }

    #[test]
    fn missing_app_id_reported_first() {
        let err = AppCredentials::from_env_values(None, None).unwrap_err();
        assert_eq!(err.to_string(), "META_APP_ID not set: export META_APP_ID=<your_app_id>");

        let err = AppCredentials::from_env_values(Some("123"), Some("")).unwrap_err();
        assert!(err.to_string().starts_with("META_APP_SECRET not set"));
    }

    #[test]
    fn available_requires_both() {
        assert!(AppCredentials::available(Some("1"), None).is_none());
        assert!(AppCredentials::available(Some("1"), Some("2")).is_some());
    }
}
