//! Output formatting helpers.

use std::io::IsTerminal;

use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use adlib_core::error::ApiError;
use adlib_core::{AdArchiveRecord, CredentialRecord, CredentialState, Error, Percentage};

const BODY_WIDTH: usize = 50;
const PAGE_WIDTH: usize = 25;
const PLATFORMS_WIDTH: usize = 20;

/// How command results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json { pretty: bool },
}

impl OutputMode {
    /// JSON when piped or asked for; tables on an interactive terminal.
    pub fn detect(json: bool, pretty: bool) -> Self {
        Self::select(json, pretty, std::io::stdout().is_terminal())
    }

    fn select(json: bool, pretty: bool, terminal: bool) -> Self {
        if pretty {
            Self::Json { pretty: true }
        } else if json {
            Self::Json { pretty: terminal }
        } else if !terminal {
            Self::Json { pretty: false }
        } else {
            Self::Human
        }
    }

    pub fn is_json(self) -> bool {
        matches!(self, Self::Json { .. })
    }

    /// Write `value` as JSON in the selected style.
    pub fn emit<T: Serialize + ?Sized>(self, value: &T) -> Result<()> {
        match self {
            Self::Json { pretty: true } => json_pretty(value),
            _ => json(value),
        }
    }
}

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a warning.
pub fn warn(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

/// Print a progress line to stderr.
pub fn progress(msg: &str) {
    eprintln!("{}", msg.dimmed());
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Follow-up advice for an API failure the user can act on.
pub fn error_hint(err: &anyhow::Error) -> Option<&'static str> {
    let graph = err.chain().find_map(|cause| match cause.downcast_ref::<Error>() {
        Some(Error::Api(ApiError::Graph(graph))) => Some(graph),
        _ => None,
    })?;

    if graph.is_token_error() {
        Some("the access token was rejected; run: meta-adlib auth refresh (or auth set-token <token>)")
    } else if graph.is_rate_limited() {
        Some("the Ad Library rate limit was reached; wait a few minutes before retrying")
    } else {
        None
    }
}

/// Print a value as compact JSON.
pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    println!("{}", json);
    Ok(())
}

/// Print a value as pretty-printed JSON.
pub fn json_pretty<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Print a listing of ads: a JSON array, or a table followed by `summary`.
pub fn ads(
    mode: OutputMode,
    ads: &[AdArchiveRecord],
    empty: &str,
    summary: impl FnOnce(usize) -> String,
) -> Result<()> {
    if mode.is_json() {
        return mode.emit(ads);
    }

    if ads.is_empty() {
        println!("{}", empty);
        return Ok(());
    }

    println!("{}", ads_table(ads));
    println!();
    println!("{}", summary(ads.len()));
    Ok(())
}

#[derive(Tabled)]
struct AdRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "PAGE")]
    page: String,
    #[tabled(rename = "STARTED")]
    started: String,
    #[tabled(rename = "STATUS")]
    status: &'static str,
    #[tabled(rename = "SPEND")]
    spend: String,
    #[tabled(rename = "PLATFORMS")]
    platforms: String,
    #[tabled(rename = "BODY")]
    body: String,
}

impl AdRow {
    fn new(ad: &AdArchiveRecord) -> Self {
        Self {
            id: ad.id.clone().unwrap_or_default(),
            page: truncate(ad.page_name.as_deref().unwrap_or_default(), PAGE_WIDTH),
            started: format_time(ad.ad_delivery_start_time.as_deref().unwrap_or_default()),
            status: status(ad),
            spend: ad.spend_label().unwrap_or_else(|| "-".to_string()),
            platforms: truncate(&join(ad.publisher_platforms.as_deref(), ", "), PLATFORMS_WIDTH),
            body: ad
                .headline()
                .map(|body| truncate(body, BODY_WIDTH))
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Render ads as an aligned table.
pub fn ads_table(ads: &[AdArchiveRecord]) -> String {
    let rows: Vec<AdRow> = ads.iter().map(AdRow::new).collect();
    Table::new(rows).with(Style::blank()).to_string()
}

/// Render one ad as key/value rows, then its delivery distributions.
///
/// Rows without a value are left out.
pub fn ad_detail(ad: &AdArchiveRecord) -> String {
    let page = match (ad.page_name.as_deref(), ad.page_id.as_deref()) {
        (Some(name), Some(id)) => format!("{name} (ID: {id})"),
        (Some(name), None) => name.to_string(),
        (None, Some(id)) => format!("(ID: {id})"),
        (None, None) => String::new(),
    };
    let impressions = ad
        .impressions
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_default();

    let mut rows = vec![
        ("ID", ad.id.clone().unwrap_or_default()),
        ("Page", page),
        ("Status", status(ad).to_string()),
        ("Created", time_field(ad.ad_creation_time.as_deref())),
        ("Started", time_field(ad.ad_delivery_start_time.as_deref())),
        ("Stopped", time_field(ad.ad_delivery_stop_time.as_deref())),
        ("Platforms", join(ad.publisher_platforms.as_deref(), ", ")),
        ("Languages", join(ad.languages.as_deref(), ", ")),
        ("Bylines", ad.bylines.clone().unwrap_or_default()),
        ("Funding entity", ad.funding_entity.clone().unwrap_or_default()),
        ("Spend (est.)", ad.spend_label().unwrap_or_default()),
        ("Impressions (est.)", impressions),
        ("Snapshot URL", ad.ad_snapshot_url.clone().unwrap_or_default()),
    ];

    for (label, values, sep) in [
        ("Body", &ad.ad_creative_bodies, " | "),
        ("Link Title", &ad.ad_creative_link_titles, " | "),
        ("Link Description", &ad.ad_creative_link_descriptions, " | "),
        ("Link Caption", &ad.ad_creative_link_captions, " | "),
        ("Image URLs", &ad.ad_creative_image_urls, "\n"),
    ] {
        if let Some(values) = values.as_deref().filter(|v| !v.is_empty()) {
            rows.push((label, values.join(sep)));
        }
    }

    let mut builder = Builder::default();
    for (label, value) in rows {
        if value.is_empty() || value == "-" {
            continue;
        }
        builder.push_record([label.to_string(), value]);
    }
    let mut out = builder.build().with(Style::blank()).to_string();

    if let Some(regions) = ad.region_distribution.as_deref().filter(|r| !r.is_empty()) {
        out.push_str("\n\nRegion Distribution:");
        for d in regions {
            let pct = share(d.percentage.as_ref());
            out.push_str(&format!("\n  {:<30} {pct}", d.region));
        }
    }

    if let Some(demographics) = ad
        .demographic_distribution
        .as_deref()
        .filter(|d| !d.is_empty())
    {
        out.push_str("\n\nDemographic Distribution:");
        for d in demographics {
            out.push_str(&format!(
                "\n  {:<5} {:<10} {}",
                d.gender,
                d.age,
                share(d.percentage.as_ref())
            ));
        }
    }

    out
}

fn status(ad: &AdArchiveRecord) -> &'static str {
    if ad.is_active() { "active" } else { "inactive" }
}

fn share(percentage: Option<&Percentage>) -> String {
    match percentage.and_then(Percentage::value) {
        Some(p) => format!("{p:.1}%"),
        None => "-".to_string(),
    }
}

fn time_field(value: Option<&str>) -> String {
    value.map(format_time).unwrap_or_default()
}

/// Expiry of a stored credential, e.g. `2026-12-13 (60 days left)`.
pub fn expiry(record: &CredentialRecord, now: DateTime<Utc>) -> String {
    match record.state(now) {
        CredentialState::Expired { at } => format!("EXPIRED on {}", date(at)),
        CredentialState::ExpiringSoon { at, days_left } => {
            format!("{} ({days_left} day(s) left)", date(at))
        }
        CredentialState::Valid {
            expires_at: Some(at),
        }
        | CredentialState::Unvalidated {
            expires_at: Some(at),
        } => format!("{} ({} days left)", date(at), (at - now).num_days()),
        _ => "unknown".to_string(),
    }
}

fn date(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

/// Shorten to `max` characters, ending in `…` when cut.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// `2024-03-01T10:15:00+0000` becomes `2024-03-01 10:15`; empty becomes `-`.
pub fn format_time(value: &str) -> String {
    if value.is_empty() {
        return "-".to_string();
    }
    match (value.get(..10), value.get(11..16)) {
        (Some(date), Some(time)) => format!("{date} {time}"),
        _ => value.to_string(),
    }
}

/// Join values, `-` when there are none.
pub fn join(values: Option<&[String]>, sep: &str) -> String {
    match values {
        Some(values) if !values.is_empty() => values.join(sep),
        _ => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adlib_core::error::GraphError;
    use adlib_core::{AccessToken, RangeValue, RegionDistribution};
    use chrono::Duration;

    fn ad() -> AdArchiveRecord {
        AdArchiveRecord {
            id: Some("123".to_string()),
            page_id: Some("99".to_string()),
            page_name: Some("Acme Solar".to_string()),
            ad_delivery_start_time: Some("2024-03-01T10:15:00+0000".to_string()),
            ad_creative_bodies: Some(vec!["a".repeat(80)]),
            publisher_platforms: Some(vec!["facebook".to_string(), "instagram".to_string()]),
            spend: Some(RangeValue {
                lower_bound: Some("100".to_string()),
                upper_bound: Some("199".to_string()),
            }),
            currency: Some("EUR".to_string()),
            ..AdArchiveRecord::default()
        }
    }

    #[test]
    fn hints_for_token_and_rate_limit_errors() {
        let api = |code| {
            anyhow::Error::from(Error::from(GraphError {
                code,
                message: "nope".to_string(),
                ..GraphError::default()
            }))
        };

        assert!(error_hint(&api(190)).unwrap().contains("meta-adlib auth refresh"));
        assert!(error_hint(&api(613)).unwrap().contains("rate limit"));
        assert_eq!(error_hint(&api(100)), None);

        let wrapped = api(190).context("token refresh failed");
        assert!(error_hint(&wrapped).is_some());

        assert_eq!(error_hint(&anyhow::Error::from(Error::Unauthenticated)), None);
    }

    #[test]
    fn mode_selection() {
        assert_eq!(OutputMode::select(false, false, true), OutputMode::Human);
        assert_eq!(
            OutputMode::select(false, false, false),
            OutputMode::Json { pretty: false }
        );
        assert_eq!(
            OutputMode::select(true, false, true),
            OutputMode::Json { pretty: true }
        );
        assert_eq!(
            OutputMode::select(true, false, false),
            OutputMode::Json { pretty: false }
        );
        assert_eq!(
            OutputMode::select(false, true, false),
            OutputMode::Json { pretty: true }
        );
    }

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate("short", 50), "short");
        assert_eq!(truncate("ééééé", 5), "ééééé");
        assert_eq!(truncate("abcdef", 4), "abc…");
        assert_eq!(truncate(&"x".repeat(80), 50).chars().count(), 50);
    }

    #[test]
    fn format_time_shortens_iso() {
        assert_eq!(format_time("2024-03-01T10:15:00+0000"), "2024-03-01 10:15");
        assert_eq!(format_time("2024-03-01"), "2024-03-01");
        assert_eq!(format_time(""), "-");
    }

    #[test]
    fn table_has_columns_and_derived_values() {
        let table = ads_table(&[ad()]);
        for header in ["ID", "PAGE", "STARTED", "STATUS", "SPEND", "PLATFORMS", "BODY"] {
            assert!(table.contains(header), "missing {header}");
        }
        assert!(table.contains("2024-03-01 10:15"));
        assert!(table.contains("active"));
        assert!(table.contains("100–199 EUR"));
        assert!(table.contains(&format!("{}…", "a".repeat(49))));
        assert!(!table.contains(&"a".repeat(50)));
    }

    #[test]
    fn detail_omits_empty_rows() {
        let mut ad = ad();
        ad.ad_delivery_stop_time = Some("2024-04-01T00:00:00+0000".to_string());
        ad.region_distribution = Some(vec![RegionDistribution {
            region: "Bavaria".to_string(),
            percentage: Some(Percentage::Text("0.42".to_string())),
        }]);

        let detail = ad_detail(&ad);
        assert!(detail.contains("Acme Solar (ID: 99)"));
        assert!(detail.contains("inactive"));
        assert!(detail.contains("Stopped"));
        assert!(!detail.contains("Bylines"));
        assert!(!detail.contains("Snapshot URL"));
        assert!(!detail.contains("Languages"));
        assert!(detail.contains("Region Distribution:"));
        assert!(detail.contains("Bavaria"));
        assert!(detail.contains("0.4%"));
        assert!(!detail.contains("Demographic Distribution:"));
    }

    #[test]
    fn expiry_descriptions() {
        let now = DateTime::from_timestamp(1_760_000_000, 0).unwrap();
        let record = |expires: Option<Duration>| {
            CredentialRecord::new(AccessToken::new("tok"), None, expires.map(|d| now + d))
        };

        assert_eq!(expiry(&record(None), now), "unknown");
        assert_eq!(
            expiry(&record(Some(Duration::days(-1))), now),
            "EXPIRED on 2025-10-08"
        );
        assert_eq!(
            expiry(&record(Some(Duration::days(3))), now),
            "2025-10-12 (3 day(s) left)"
        );
        assert_eq!(
            expiry(&record(Some(Duration::days(60))), now),
            "2025-12-08 (60 days left)"
        );
    }
}
