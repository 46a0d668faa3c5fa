//! Error types for the Ad Library client.
//!
//! Every failure mode maps to one explicit variant so callers can tell a
//! locally rejected query apart from a server-side rejection or a dead
//! network. None of these are retried.

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

/// The unified error type for Ad Library operations.
#[derive(Debug, Error)]
pub enum Error {
    /// No usable credential anywhere in the resolution chain.
    #[error(
        "not authenticated: run `meta-auth login` (shared) or `meta-adlib auth set-token <token>` (local only)"
    )]
    Unauthenticated,

    /// Malformed or incomplete input, caught before any request is issued.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The identity endpoint rejected the token.
    #[error("token validation failed: {0}")]
    Auth(#[from] AuthError),

    /// The token exchange call failed or returned no token.
    #[error("token exchange failed: {0}")]
    Exchange(#[from] ExchangeError),

    /// Network failures and unreadable responses.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Structured error payload or non-success status from the API.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// Credential file could not be read or written.
    #[error("credential store error: {0}")]
    Store(#[from] StoreError),
}

/// Local validation failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("at least one --country is required (e.g. --country US)")]
    MissingCountry,

    #[error("at least one of --query or --page-id is required")]
    MissingSearchTarget,

    #[error("at least one field must be requested")]
    EmptyFields,

    /// A value outside a closed enumeration.
    #[error("invalid {kind} '{value}': expected one of {expected}")]
    UnknownValue {
        kind: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("invalid Graph API URL '{value}': {reason}")]
    GraphUrl { value: String, reason: String },

    /// A required environment variable is not set.
    #[error("{name} not set: export {name}=<{hint}>")]
    MissingEnv {
        name: &'static str,
        hint: &'static str,
    },
}

/// Identity validation failures.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The response carried an error payload.
    #[error("meta api error: {message}")]
    Rejected { message: String },

    /// Non-success status without an error payload.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response did not identify the token owner.
    #[error("identity response carried no user id")]
    MissingIdentity,
}

/// Token exchange failures.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// The response carried an error payload.
    #[error("meta api error: {message}")]
    Rejected { message: String },

    /// Non-success status without an error payload.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response parsed but held no access token.
    #[error("no access_token in response: {body}")]
    MissingToken { body: String },
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out after {duration_secs}s")]
    Timeout { duration_secs: u64 },

    /// Generic HTTP client error.
    #[error("request failed: {message}")]
    Http { message: String },

    /// The body could not be decoded into the expected shape.
    #[error("parsing {context}: {message}")]
    MalformedBody {
        context: &'static str,
        message: String,
    },

    /// A server-supplied continuation locator is not an absolute URL.
    #[error("invalid paging locator '{locator}': {reason}")]
    InvalidLocator { locator: String, reason: String },
}

/// API-level errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// An `error` object embedded in the response body.
    #[error("{0}")]
    Graph(GraphError),

    /// HTTP status >= 400 with no error payload.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// The `error` object of a Graph API response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GraphError {
    pub code: i64,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub error_subcode: Option<i64>,
    pub fbtrace_id: Option<String>,
}

impl GraphError {
    /// Build an error carrying only a message.
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    /// Rate limiting codes: application, user, page and Ad Library throttles.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self.code, 4 | 17 | 32 | 613)
    }

    /// Invalid or expired OAuth token.
    pub fn is_token_error(&self) -> bool {
        self.code == 190
    }
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.error_subcode {
            Some(subcode) if subcode != 0 => write!(
                f,
                "meta api error {} (subcode {}): {}",
                self.code, subcode, self.message
            ),
            _ => write!(f, "meta api error {}: {}", self.code, self.message),
        }
    }
}

impl std::error::Error for GraphError {}

impl From<GraphError> for Error {
    fn from(err: GraphError) -> Self {
        Error::Api(ApiError::Graph(err))
    }
}

/// Credential store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("{path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("invalid credential file {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    /// The store belongs to another tool and is never written.
    #[error("{path} is read-only (managed by meta-auth)")]
    ReadOnly { path: PathBuf },
}
