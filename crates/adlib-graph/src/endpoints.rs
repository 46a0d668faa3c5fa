//! Graph API paths and response shapes.

use serde::Deserialize;
use serde_json::Value;

/// Ad Library search.
pub const ADS_ARCHIVE: &str = "ads_archive";

/// Token owner identity.
pub const ME: &str = "me";

/// Short-lived to long-lived token exchange.
pub const OAUTH_ACCESS_TOKEN: &str = "oauth/access_token";

/// Any response that may carry an `error` object.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    #[serde(default)]
    pub error: Option<Value>,
}

/// Response from `GET /me?fields=id,name`.
#[derive(Debug, Deserialize)]
pub(crate) struct IdentityResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Response from the token exchange endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    /// Seconds until expiry.
    #[serde(default)]
    pub expires_in: Option<i64>,
}
