//! Subcommand implementations.

pub mod ad;
pub mod auth;
pub mod info;
pub mod page;
pub mod search;

use clap::Args;

use adlib_core::error::ValidationError;
use adlib_core::{ActiveStatus, AdType, QuerySpec};

/// Filters shared by `search` and `page ads`.
#[derive(Args, Debug)]
pub struct AdFilters {
    /// Country code(s) (ISO 3166, e.g. US, DE, FR). Repeatable.
    #[arg(long = "country", value_name = "CODE")]
    pub countries: Vec<String>,

    /// Ad type: ALL or POLITICAL_AND_ISSUE_ADS
    #[arg(long = "type", default_value = "ALL")]
    pub ad_type: String,

    /// Ad active status: ALL, ACTIVE or INACTIVE
    #[arg(long, default_value = "ALL")]
    pub status: String,

    /// Minimum delivery date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub since: Option<String>,

    /// Maximum delivery date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub until: Option<String>,

    /// Maximum number of results (0 = fetch all pages)
    #[arg(long, default_value_t = 25)]
    pub limit: usize,
}

impl AdFilters {
    /// Copy the filters into `spec`, rejecting unknown enumerated values.
    pub fn apply(&self, spec: &mut QuerySpec) -> Result<(), ValidationError> {
        spec.countries = self.countries.clone();
        spec.ad_type = self.ad_type.parse::<AdType>()?;
        spec.active_status = self.status.parse::<ActiveStatus>()?;
        spec.delivery_date_min = self.since.clone().filter(|d| !d.is_empty());
        spec.delivery_date_max = self.until.clone().filter(|d| !d.is_empty());
        Ok(())
    }
}
