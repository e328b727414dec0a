//! Records returned by the price, news and scan endpoints.

use std::fmt;

use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::Date;

use crate::locale::LocalizedText;

// ── Prices ───────────────────────────────────────────────────────────────────

/// Direction a market price is moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl Trend {
    pub const ALL: [Trend; 3] = [Trend::Up, Trend::Down, Trend::Stable];

    pub const fn as_str(self) -> &'static str {
        match self {
            Trend::Up => "up",
            Trend::Down => "down",
            Trend::Stable => "stable",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A crop price at one market. `price` is in whole rupees per quintal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Unique within one response only.
    pub id: u32,
    pub crop: LocalizedText,
    pub market: LocalizedText,
    pub price: u64,
    pub trend: Trend,
}

// ── News ─────────────────────────────────────────────────────────────────────

/// An agricultural news headline with a short summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: u32,
    pub title: LocalizedText,
    pub summary: LocalizedText,
    #[serde(with = "iso_date")]
    pub date: Date,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

/// Format a date as `YYYY-MM-DD`.
pub fn format_iso_date(date: Date) -> String {
    let format = format_description!("[year]-[month]-[day]");
    date.format(&format)
        .unwrap_or_else(|_| format!("{}", date))
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_iso_date(s: &str) -> Result<Date, time::error::Parse> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(s.trim(), &format)
}

mod iso_date {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    pub(super) fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_iso_date(*date))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_iso_date(&raw).map_err(serde::de::Error::custom)
    }
}

// ── Scans ────────────────────────────────────────────────────────────────────

/// How badly a detected disease affects the crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    Unknown,
}

impl Severity {
    /// Case-insensitive parse of `Low`, `Medium`, `High` or `Unknown`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Severity::Low),
            "medium" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            "unknown" => Some(Severity::Unknown),
            _ => None,
        }
    }
}

/// Error building a [`Confidence`] from an out-of-range score.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("confidence must be between 0 and 100, got {0}")]
pub struct ConfidenceError(pub u8);

/// Model confidence as a whole percentage, 0 through 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Confidence(u8);

impl Confidence {
    pub const ZERO: Confidence = Confidence(0);
    pub const MAX: u8 = 100;

    pub fn new(value: u8) -> Result<Self, ConfidenceError> {
        if value > Self::MAX {
            return Err(ConfidenceError(value));
        }
        Ok(Self(value))
    }

    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Confidence {
    type Error = ConfidenceError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Confidence> for u8 {
    fn from(c: Confidence) -> u8 {
        c.0
    }
}

/// Analysis of one crop photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub crop: LocalizedText,
    /// `None` when the plant looks healthy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disease: Option<LocalizedText>,
    pub severity: Severity,
    pub severity_label: LocalizedText,
    pub remedy: LocalizedText,
    pub confidence: Confidence,
}

impl ScanResult {
    /// The fixed result returned when the photo could not be analysed.
    pub fn degraded_sentinel() -> Self {
        Self {
            crop: LocalizedText::new("Unknown", "தெரியவில்லை"),
            disease: Some(LocalizedText::new("Error analyzing image", "பிழை")),
            severity: Severity::Unknown,
            severity_label: LocalizedText::new("Unknown", "தெரியவில்லை"),
            remedy: LocalizedText::new("Please try again.", "மீண்டும் முயற்சிக்கவும்."),
            confidence: Confidence::ZERO,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.disease.is_none()
    }
}

/// What a scan request produced.
///
/// Serialized with an `outcome` tag next to the result fields, e.g.
/// `{"outcome": "degraded", "crop": {...}, ..., "confidence": 0}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ScanOutcome {
    /// The model analysed the photo.
    Detected(ScanResult),
    /// The model found no crop in the photo. `error` is the model's message.
    NoCropDetected { error: String },
    /// Analysis failed; carries [`ScanResult::degraded_sentinel`].
    Degraded(ScanResult),
}

impl ScanOutcome {
    pub fn degraded() -> Self {
        ScanOutcome::Degraded(ScanResult::degraded_sentinel())
    }

    pub fn result(&self) -> Option<&ScanResult> {
        match self {
            ScanOutcome::Detected(r) | ScanOutcome::Degraded(r) => Some(r),
            ScanOutcome::NoCropDetected { .. } => None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, ScanOutcome::Degraded(_))
    }
}

// ── Provenance ───────────────────────────────────────────────────────────────

/// Where a collection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Model,
    Fallback,
}

impl DataSource {
    pub const fn as_str(self) -> &'static str {
        match self {
            DataSource::Model => "model",
            DataSource::Fallback => "fallback",
        }
    }
}

/// Data accepted from the model, or the fallback used in its place.
/// Never a mix of the two.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sourced<T> {
    Accepted(T),
    Fallback(T),
}

impl<T> Sourced<T> {
    pub fn source(&self) -> DataSource {
        match self {
            Sourced::Accepted(_) => DataSource::Model,
            Sourced::Fallback(_) => DataSource::Fallback,
        }
    }

    pub fn get(&self) -> &T {
        match self {
            Sourced::Accepted(v) | Sourced::Fallback(v) => v,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Sourced::Accepted(v) | Sourced::Fallback(v) => v,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Sourced::Fallback(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn trend_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Trend::Stable).unwrap(), "stable");
        let parsed: Trend = serde_json::from_str("\"down\"").unwrap();
        assert_eq!(parsed, Trend::Down);
        assert!(serde_json::from_str::<Trend>("\"Down\"").is_err());
        assert!(serde_json::from_str::<Trend>("\"rising\"").is_err());
    }

    #[test]
    fn news_date_is_iso() {
        let item = NewsItem {
            id: 1,
            title: LocalizedText::new("Title", "தலைப்பு"),
            summary: LocalizedText::new("Summary", "சுருக்கம்"),
            date: date!(2024 - 05 - 07),
            source_url: None,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["date"], "2024-05-07");
        assert!(json.get("source_url").is_none());

        let back: NewsItem = serde_json::from_value(json).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn news_date_rejects_other_formats() {
        assert!(parse_iso_date("07/05/2024").is_err());
        assert!(parse_iso_date("2024-13-01").is_err());
        assert_eq!(parse_iso_date(" 2024-02-29 ").unwrap(), date!(2024 - 02 - 29));
    }

    #[test]
    fn confidence_range() {
        assert_eq!(Confidence::new(100).unwrap().value(), 100);
        assert_eq!(Confidence::new(101), Err(ConfidenceError(101)));
        assert!(serde_json::from_str::<Confidence>("150").is_err());
        assert_eq!(serde_json::from_str::<Confidence>("42").unwrap().value(), 42);
    }

    #[test]
    fn severity_parse_is_case_insensitive() {
        assert_eq!(Severity::parse("HIGH"), Some(Severity::High));
        assert_eq!(Severity::parse(" medium "), Some(Severity::Medium));
        assert_eq!(Severity::parse("severe"), None);
    }

    #[test]
    fn degraded_outcome_serialization() {
        let json = serde_json::to_value(ScanOutcome::degraded()).unwrap();
        assert_eq!(json["outcome"], "degraded");
        assert_eq!(json["confidence"], 0);
        assert_eq!(json["severity"], "Unknown");
        assert_eq!(json["disease"]["en"], "Error analyzing image");
        assert_eq!(json["disease"]["ta"], "பிழை");
    }

    #[test]
    fn no_crop_outcome_serialization() {
        let outcome = ScanOutcome::NoCropDetected {
            error: "No crop detected".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"outcome": "no_crop_detected", "error": "No crop detected"})
        );
        assert!(outcome.result().is_none());
    }

    #[test]
    fn healthy_scan_omits_disease() {
        let result = ScanResult {
            crop: LocalizedText::new("Tomato", "தக்காளி"),
            disease: None,
            severity: Severity::Low,
            severity_label: LocalizedText::new("Low", "குறைவு"),
            remedy: LocalizedText::new("None needed", "தேவையில்லை"),
            confidence: Confidence::new(91).unwrap(),
        };
        assert!(result.is_healthy());
        let json = serde_json::to_value(ScanOutcome::Detected(result.clone())).unwrap();
        assert!(json.get("disease").is_none());
        let back: ScanOutcome = serde_json::from_value(json).unwrap();
        assert_eq!(back, ScanOutcome::Detected(result));
    }

    #[test]
    fn sourced_reports_origin() {
        let accepted = Sourced::Accepted(vec![1]);
        let fallback = Sourced::Fallback(vec![2]);
        assert_eq!(accepted.source(), DataSource::Model);
        assert_eq!(fallback.source().as_str(), "fallback");
        assert!(fallback.is_fallback());
        assert_eq!(accepted.into_inner(), vec![1]);
    }
}
