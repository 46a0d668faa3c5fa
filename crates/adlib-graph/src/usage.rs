//! Rate-quota signal from the `X-App-Usage` response header.

use serde::Deserialize;

/// Header carrying application usage as JSON percentages.
pub const USAGE_HEADER: &str = "x-app-usage";

/// Usage above this percentage produces a warning.
pub const QUOTA_WARN_THRESHOLD: f64 = 75.0;

/// Application usage, e.g. `{"call_count":28,"total_cputime":25,"total_time":25}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppUsage {
    pub call_count: f64,
    pub total_cputime: f64,
    pub total_time: f64,
}

impl AppUsage {
    /// Parse the header value; anything unreadable is ignored.
    pub fn parse(header: &str) -> Option<Self> {
        serde_json::from_str(header).ok()
    }

    /// Highest of the reported percentages.
    pub fn peak(&self) -> f64 {
        self.call_count.max(self.total_cputime).max(self.total_time)
    }

    pub fn exceeds_threshold(&self) -> bool {
        self.peak() > QUOTA_WARN_THRESHOLD
    }
}
