//! Ad Library record types.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

/// An ad returned by the `ads_archive` endpoint or a direct lookup.
///
/// Every field is optional and only serialized when present, so JSON output
/// mirrors what the server sent. Fields this type does not know about are
/// kept in `extra` and written back unchanged. So are known fields whose
/// value is `null` or does not have the expected shape: one odd record never
/// fails a page, and its raw value survives in JSON output.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdArchiveRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_creation_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_creative_bodies: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_creative_image_urls: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_creative_link_captions: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_creative_link_descriptions: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_creative_link_titles: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_delivery_start_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_delivery_stop_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_snapshot_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    /// Estimated range, e.g. `{"lower_bound":"100","upper_bound":"199"}`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spend: Option<RangeValue>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub impressions: Option<RangeValue>,

    /// ISO 639-1 codes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_distribution: Option<Vec<RegionDistribution>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub demographic_distribution: Option<Vec<DemographicDistribution>>,

    /// Political and issue ads only; deprecated upstream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funding_entity: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bylines: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher_platforms: Option<Vec<String>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<'de> Deserialize<'de> for AdArchiveRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut fields = Map::<String, Value>::deserialize(deserializer)?;
        Ok(Self {
            id: take(&mut fields, "id"),
            ad_creation_time: take(&mut fields, "ad_creation_time"),
            ad_creative_bodies: take(&mut fields, "ad_creative_bodies"),
            ad_creative_image_urls: take(&mut fields, "ad_creative_image_urls"),
            ad_creative_link_captions: take(&mut fields, "ad_creative_link_captions"),
            ad_creative_link_descriptions: take(&mut fields, "ad_creative_link_descriptions"),
            ad_creative_link_titles: take(&mut fields, "ad_creative_link_titles"),
            ad_delivery_start_time: take(&mut fields, "ad_delivery_start_time"),
            ad_delivery_stop_time: take(&mut fields, "ad_delivery_stop_time"),
            ad_snapshot_url: take(&mut fields, "ad_snapshot_url"),
            currency: take(&mut fields, "currency"),
            spend: take(&mut fields, "spend"),
            impressions: take(&mut fields, "impressions"),
            languages: take(&mut fields, "languages"),
            region_distribution: take(&mut fields, "region_distribution"),
            demographic_distribution: take(&mut fields, "demographic_distribution"),
            funding_entity: take(&mut fields, "funding_entity"),
            page_id: take(&mut fields, "page_id"),
            page_name: take(&mut fields, "page_name"),
            bylines: take(&mut fields, "bylines"),
            publisher_platforms: take(&mut fields, "publisher_platforms"),
            extra: fields,
        })
    }
}

/// Remove `key` and decode it, leaving the raw value in place when it is
/// `null` or does not decode as `T`.
fn take<T: DeserializeOwned>(fields: &mut Map<String, Value>, key: &str) -> Option<T> {
    let value = fields.get(key)?;
    if value.is_null() {
        return None;
    }
    let decoded = T::deserialize(value).ok()?;
    fields.remove(key);
    Some(decoded)
}

impl AdArchiveRecord {
    /// Ads without a delivery stop time are still running.
    pub fn is_active(&self) -> bool {
        self.ad_delivery_stop_time
            .as_deref()
            .is_none_or(|stop| stop.is_empty())
    }

    /// First creative body, falling back to the first link title.
    pub fn headline(&self) -> Option<&str> {
        first(&self.ad_creative_bodies).or_else(|| first(&self.ad_creative_link_titles))
    }

    /// Spend range with currency, e.g. `100–199 EUR`.
    pub fn spend_label(&self) -> Option<String> {
        let spend = self.spend.as_ref()?;
        Some(match self.currency.as_deref().filter(|c| !c.is_empty()) {
            Some(currency) => format!("{spend} {currency}"),
            None => spend.to_string(),
        })
    }
}

fn first(values: &Option<Vec<String>>) -> Option<&str> {
    values.as_ref().and_then(|v| v.first()).map(String::as_str)
}

/// An estimated range as reported by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_bound: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<String>,
}

impl fmt::Display for RangeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.lower_bound.as_deref(), self.upper_bound.as_deref()) {
            (Some(lower), Some(upper)) if lower == upper => f.write_str(lower),
            (Some(lower), Some(upper)) => write!(f, "{lower}–{upper}"),
            (Some(lower), None) => write!(f, "{lower}+"),
            (None, Some(upper)) => write!(f, "<{upper}"),
            (None, None) => f.write_str("-"),
        }
    }
}

/// Share of delivery per region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionDistribution {
    #[serde(default)]
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<Percentage>,
}

/// Share of delivery per age bracket and gender.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DemographicDistribution {
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<Percentage>,
}

/// A share the API sends either as a JSON number or as a numeric string.
/// Written back in the form it arrived in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Percentage {
    Number(Number),
    Text(String),
}

impl Percentage {
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_fields_pass_through() {
        let raw = json!({
            "id": "123",
            "page_name": "Example",
            "target_ages": ["18", "65+"],
        });
        let record: AdArchiveRecord = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(record.id.as_deref(), Some("123"));
        assert!(record.extra.contains_key("target_ages"));
        assert_eq!(serde_json::to_value(&record).unwrap(), raw);
    }

    #[test]
    fn off_type_field_kept_raw() {
        let raw = json!({
            "id": "2",
            "page_name": 17,
            "spend": { "lower_bound": 100, "upper_bound": 199 },
        });
        let record: AdArchiveRecord = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(record.id.as_deref(), Some("2"));
        assert_eq!(record.page_name, None);
        assert_eq!(record.spend, None);
        assert_eq!(serde_json::to_value(&record).unwrap(), raw);
    }

    #[test]
    fn explicit_null_written_back() {
        let raw = json!({ "id": "1", "ad_delivery_stop_time": null });
        let record: AdArchiveRecord = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(record.ad_delivery_stop_time, None);
        assert!(record.is_active());
        assert_eq!(serde_json::to_value(&record).unwrap(), raw);
    }

    #[test]
    fn percentage_as_number_or_string() {
        let raw = json!({
            "id": "3",
            "demographic_distribution": [
                { "age": "25-34", "gender": "male", "percentage": "0.0123" },
                { "age": "35-44", "gender": "female", "percentage": 0.5 }
            ]
        });
        let record: AdArchiveRecord = serde_json::from_value(raw.clone()).unwrap();
        let demographics = record.demographic_distribution.as_deref().unwrap();
        assert_eq!(demographics[0].percentage.as_ref().unwrap().value(), Some(0.0123));
        assert_eq!(demographics[1].percentage.as_ref().unwrap().value(), Some(0.5));
        assert_eq!(serde_json::to_value(&record).unwrap(), raw);
    }

    #[test]
    fn absent_fields_are_not_serialized() {
        let record = AdArchiveRecord {
            id: Some("1".to_string()),
            ..AdArchiveRecord::default()
        };
        assert_eq!(serde_json::to_string(&record).unwrap(), r#"{"id":"1"}"#);
    }

    #[test]
    fn active_when_no_stop_time() {
        let mut record = AdArchiveRecord::default();
        assert!(record.is_active());
        record.ad_delivery_stop_time = Some("2024-03-01".to_string());
        assert!(!record.is_active());
    }

    #[test]
    fn headline_falls_back_to_link_title() {
        let record = AdArchiveRecord {
            ad_creative_link_titles: Some(vec!["Title".to_string()]),
            ..AdArchiveRecord::default()
        };
        assert_eq!(record.headline(), Some("Title"));
    }

    #[test]
    fn spend_label_formats_range() {
        let record = AdArchiveRecord {
            spend: Some(RangeValue {
                lower_bound: Some("100".to_string()),
                upper_bound: Some("199".to_string()),
            }),
            currency: Some("EUR".to_string()),
            ..AdArchiveRecord::default()
        };
        assert_eq!(record.spend_label().as_deref(), Some("100–199 EUR"));

        let point = RangeValue {
            lower_bound: Some("0".to_string()),
            upper_bound: Some("0".to_string()),
        };
        assert_eq!(point.to_string(), "0");
    }
}
