//! Query specification and parameter encoding for `ads_archive`.
//!
//! Repeatable filters travel as JSON array literals inside ordinary query
//! parameters (`ad_reached_countries=["US","DE"]`). The endpoint rejects any
//! other encoding.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use tracing::trace;

use crate::error::ValidationError;

/// Fields requested by search and page listings unless overridden.
pub const DEFAULT_FIELDS: &[&str] = &[
    "id",
    "ad_creation_time",
    "ad_delivery_start_time",
    "ad_delivery_stop_time",
    "ad_creative_bodies",
    "ad_creative_link_titles",
    "ad_creative_link_captions",
    "ad_snapshot_url",
    "page_id",
    "page_name",
    "publisher_platforms",
    "languages",
    "spend",
    "impressions",
    "currency",
];

/// Fields requested by a single-ad lookup.
pub const AD_DETAIL_FIELDS: &[&str] = &[
    "id",
    "ad_creation_time",
    "ad_delivery_start_time",
    "ad_delivery_stop_time",
    "ad_creative_bodies",
    "ad_creative_image_urls",
    "ad_creative_link_captions",
    "ad_creative_link_descriptions",
    "ad_creative_link_titles",
    "ad_snapshot_url",
    "page_id",
    "page_name",
    "publisher_platforms",
    "languages",
    "spend",
    "impressions",
    "currency",
    "bylines",
    "region_distribution",
    "demographic_distribution",
];

macro_rules! closed_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every accepted value, in wire form.
            pub const VALUES: &'static [&'static str] = &[$($text),+];

            /// Wire form of the value.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($text) {
                        return Ok($name::$variant);
                    }
                )+
                Err(ValidationError::UnknownValue {
                    kind: $kind,
                    value: s.to_string(),
                    expected: concat!($($text, " "),+).trim_ascii_end(),
                })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

closed_enum! {
    /// Ad classification filter.
    AdType, "ad type" {
        All => "ALL",
        PoliticalAndIssueAds => "POLITICAL_AND_ISSUE_ADS",
    }
}

closed_enum! {
    /// Delivery status filter.
    ActiveStatus, "status" {
        All => "ALL",
        Active => "ACTIVE",
        Inactive => "INACTIVE",
    }
}

closed_enum! {
    /// Creative media type filter.
    MediaType, "media type" {
        All => "ALL",
        Image => "IMAGE",
        Meme => "MEME",
        Video => "VIDEO",
        None => "NONE",
    }
}

closed_enum! {
    /// Publisher platform filter.
    Platform, "platform" {
        Facebook => "facebook",
        Instagram => "instagram",
        AudienceNetwork => "audience_network",
        Messenger => "messenger",
        Threads => "threads",
    }
}

impl Default for AdType {
    fn default() -> Self {
        AdType::All
    }
}

impl Default for ActiveStatus {
    fn default() -> Self {
        ActiveStatus::All
    }
}

/// Structured search criteria for the `ads_archive` endpoint.
///
/// Empty collections mean "not set".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    pub search_terms: Option<String>,
    pub page_ids: Vec<String>,
    pub ad_type: AdType,
    pub active_status: ActiveStatus,
    pub countries: Vec<String>,
    /// Inclusive, passed through as given.
    pub delivery_date_min: Option<String>,
    pub delivery_date_max: Option<String>,
    pub platforms: Vec<Platform>,
    pub languages: Vec<String>,
    pub media_type: Option<MediaType>,
    pub fields: Vec<String>,
    /// Page-size hint sent as `limit`; the engine picks one when unset.
    pub page_size: Option<u32>,
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            search_terms: None,
            page_ids: Vec::new(),
            ad_type: AdType::default(),
            active_status: ActiveStatus::default(),
            countries: Vec::new(),
            delivery_date_min: None,
            delivery_date_max: None,
            platforms: Vec::new(),
            languages: Vec::new(),
            media_type: None,
            fields: DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect(),
            page_size: None,
        }
    }
}

impl QuerySpec {
    /// Check the preconditions, reporting only the first one violated.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.countries.iter().all(|c| c.trim().is_empty()) {
            return Err(ValidationError::MissingCountry);
        }

        let has_terms = self
            .search_terms
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty());
        if !has_terms && self.page_ids.is_empty() {
            return Err(ValidationError::MissingSearchTarget);
        }

        if self.fields.iter().all(|f| f.trim().is_empty()) {
            return Err(ValidationError::EmptyFields);
        }

        Ok(())
    }

    /// Validate and encode into request parameters.
    pub fn build(&self) -> Result<QueryParams, ValidationError> {
        self.validate()?;

        let mut params = QueryParams::new();
        params.set("fields", self.fields.join(","));
        params.set("ad_type", self.ad_type.as_str());
        params.set("ad_active_status", self.active_status.as_str());
        params.set("ad_reached_countries", json_array(&self.countries));

        if let Some(terms) = self.search_terms.as_deref().filter(|t| !t.is_empty()) {
            params.set("search_terms", terms);
        }
        if !self.page_ids.is_empty() {
            params.set("search_page_ids", json_array(&self.page_ids));
        }
        if let Some(min) = &self.delivery_date_min {
            params.set("ad_delivery_date_min", min.as_str());
        }
        if let Some(max) = &self.delivery_date_max {
            params.set("ad_delivery_date_max", max.as_str());
        }
        if !self.platforms.is_empty() {
            let platforms: Vec<&str> = self.platforms.iter().map(Platform::as_str).collect();
            params.set("publisher_platforms", json_array(&platforms));
        }
        if !self.languages.is_empty() {
            params.set("languages", json_array(&self.languages));
        }
        if let Some(media_type) = self.media_type {
            params.set("ad_creative_media_type", media_type.as_str());
        }
        if let Some(page_size) = self.page_size {
            params.set("limit", page_size.to_string());
        }

        trace!(?params, "encoded query");
        Ok(params)
    }
}

/// `["US","DE"]`: each element JSON-quoted, comma-joined, no whitespace.
pub fn json_array<S: AsRef<str>>(items: &[S]) -> String {
    Value::Array(
        items
            .iter()
            .map(|item| Value::String(item.as_ref().to_string()))
            .collect(),
    )
    .to_string()
}

/// Ordered request parameters. Setting a name twice replaces the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        for (name, value) in iter {
            params.set(name, value);
        }
        params
    }
}
