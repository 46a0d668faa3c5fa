//! HTTP transport shared by the API client and the token lifecycle.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, trace, warn};
use url::Url;

use adlib_core::error::{ApiError, Error, GraphError, TransportError};
use adlib_core::{GraphUrl, QueryParams, Result};

use crate::endpoints::ErrorEnvelope;
use crate::usage::{AppUsage, USAGE_HEADER};

/// Per-request timeout. There is no overall deadline for multi-page fetches.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Status and body of a completed request.
#[derive(Debug)]
pub(crate) struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// HTTP client bound to a Graph API base URL.
#[derive(Debug, Clone)]
pub struct Transport {
    client: reqwest::Client,
    base: GraphUrl,
    quota_warnings: Arc<AtomicUsize>,
}

impl Transport {
    /// Create a transport for the given base URL.
    pub fn new(base: GraphUrl) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("meta-adlib/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(transport_error)?;

        Ok(Self {
            client,
            base,
            quota_warnings: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Number of high-usage warnings emitted so far.
    pub fn quota_warnings(&self) -> usize {
        self.quota_warnings.load(Ordering::Relaxed)
    }

    /// Absolute URL of `path` under the base, with `params` appended.
    pub(crate) fn url(&self, path: &str, params: &QueryParams) -> Result<Url> {
        let endpoint = self.base.endpoint(path);
        let mut url = Url::parse(&endpoint).map_err(|e| TransportError::InvalidLocator {
            locator: endpoint.clone(),
            reason: e.to_string(),
        })?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params.iter());
        }
        Ok(url)
    }

    /// Issue a GET and read the whole body.
    ///
    /// The usage header is checked before anything looks at the body.
    #[instrument(skip_all, fields(path = %url.path()))]
    pub(crate) async fn get(&self, url: Url) -> Result<RawResponse> {
        debug!("GET");

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        trace!(status, "response");
        self.check_quota(response.headers());

        let body = response.text().await.map_err(transport_error)?;
        Ok(RawResponse { status, body })
    }

    fn check_quota(&self, headers: &HeaderMap) {
        let Some(usage) = headers
            .get(USAGE_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(AppUsage::parse)
        else {
            return;
        };

        trace!(?usage, "app usage");
        if usage.exceeds_threshold() {
            self.quota_warnings.fetch_add(1, Ordering::Relaxed);
            warn!(
                "rate limit {:.0}% used; slow down to avoid HTTP 613",
                usage.peak()
            );
        }
    }
}

/// Map a reqwest failure onto the transport taxonomy.
pub(crate) fn transport_error(err: reqwest::Error) -> Error {
    let err = if err.is_timeout() {
        TransportError::Timeout {
            duration_secs: REQUEST_TIMEOUT.as_secs(),
        }
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    Error::Transport(err)
}

/// The `error` object of a body, if it holds anything.
pub(crate) fn embedded_error(body: &str) -> Option<GraphError> {
    let envelope: ErrorEnvelope = serde_json::from_str(body).ok()?;
    let error = envelope.error?;

    let is_empty = match &error {
        serde_json::Value::Null => true,
        serde_json::Value::Object(map) => map.is_empty(),
        serde_json::Value::String(s) => s.is_empty(),
        _ => false,
    };
    if is_empty {
        return None;
    }

    Some(match error {
        serde_json::Value::String(message) => GraphError::from_message(message),
        other => serde_json::from_value::<GraphError>(other.clone())
            .unwrap_or_else(|_| GraphError::from_message(other.to_string())),
    })
}

/// Decode an API response.
///
/// An embedded error wins over the status code, a failing status wins over
/// the body, and only then is the body parsed.
pub(crate) fn decode<T: DeserializeOwned>(raw: &RawResponse, context: &'static str) -> Result<T> {
    if let Some(error) = embedded_error(&raw.body) {
        return Err(error.into());
    }

    if raw.status >= 400 {
        return Err(ApiError::Status {
            status: raw.status,
            body: raw.body.clone(),
        }
        .into());
    }

    parse_body(&raw.body, context)
}

pub(crate) fn parse_body<T: DeserializeOwned>(body: &str, context: &'static str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| {
        TransportError::MalformedBody {
            context,
            message: e.to_string(),
        }
        .into()
    })
}
