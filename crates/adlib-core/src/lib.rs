//! adlib-core - Core Ad Library types, query builder and credential model.

pub mod ads;
pub mod credential;
pub mod error;
pub mod page;
pub mod query;
pub mod resolver;
pub mod store;
pub mod stream;
pub mod types;

pub use ads::{
    AdArchiveRecord, DemographicDistribution, Percentage, RangeValue, RegionDistribution,
};
pub use credential::{CredentialRecord, CredentialState, ExpiryWarning, Identity, TokenSource};
pub use error::Error;
pub use page::{Cursors, Page, Paging};
pub use query::{ActiveStatus, AdType, MediaType, Platform, QueryParams, QuerySpec};
pub use resolver::{CredentialResolver, Resolved};
pub use store::CredentialStore;
pub use stream::PageStream;
pub use types::{AccessToken, AppCredentials, GraphUrl};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
