//! adlib-graph - Graph API client for the Ad Library.
//!
//! [`GraphClient`] issues authenticated requests and follows continuation
//! cursors; [`TokenLifecycle`] validates and exchanges tokens.

mod client;
mod endpoints;
mod lifecycle;
mod transport;
mod usage;

pub use client::{DEFAULT_PAGE_SIZE, GraphClient, collect_pages};
pub use endpoints::{ADS_ARCHIVE, ME, OAUTH_ACCESS_TOKEN};
pub use lifecycle::{ExchangedToken, TokenLifecycle, Upgrade, UpgradeNote};
pub use transport::{REQUEST_TIMEOUT, Transport};
pub use usage::{AppUsage, QUOTA_WARN_THRESHOLD, USAGE_HEADER};
