//! Strict parsing of model output into domain records.
//!
//! A collection is accepted only if it is a non-empty JSON array whose every
//! element has every field with the right type. One bad element rejects the
//! whole collection; there is no per-item filtering.

use serde::Deserialize;
use time::Date;
use tracing::debug;
use uzhavar_domain::{
    parse_iso_date, Confidence, LocalizedText, NewsItem, PriceQuote, ScanOutcome, ScanResult,
    Severity, Trend,
};

use crate::error::GatewayError;

/// Strip markdown code fences (```json ... ```) from a model answer.
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(after_open) = text.strip_prefix("```") else {
        return text;
    };
    // Skip the info string (`json`, `JSON`, ...) on the opening line.
    let body = match after_open.find('\n') {
        Some(nl) => &after_open[nl + 1..],
        None => after_open.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };
    match body.rfind("```") {
        Some(close) => body[..close].trim(),
        None => body.trim(),
    }
}

/// Truncate a model answer for error messages, on a char boundary.
fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

fn parse_json<'a, T: Deserialize<'a>>(text: &'a str, what: &str) -> Result<T, GatewayError> {
    let json = strip_code_fences(text);
    serde_json::from_str(json).map_err(|e| {
        GatewayError::Parse(format!(
            "{} is not valid: {}. Response was: {}",
            what,
            e,
            truncate(json, 200)
        ))
    })
}

fn localized(en: String, ta: String, field: &str, index: usize) -> Result<LocalizedText, GatewayError> {
    let text = LocalizedText::new(en, ta);
    if !text.is_complete() {
        return Err(GatewayError::Malformed(format!(
            "item {}: '{}' is missing a translation",
            index, field
        )));
    }
    Ok(text)
}

// ── Prices ───────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePrice {
    id: u32,
    name: String,
    name_ta: String,
    market: String,
    market_ta: String,
    price: f64,
    trend: Trend,
}

/// Parse a price list. Fractional prices are rounded to whole rupees.
pub fn parse_prices(text: &str) -> Result<Vec<PriceQuote>, GatewayError> {
    let entries: Vec<WirePrice> = parse_json(text, "price list")?;
    if entries.is_empty() {
        return Err(GatewayError::Malformed("model returned no prices".to_string()));
    }

    entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| {
            if !entry.price.is_finite() || entry.price < 0.0 {
                return Err(GatewayError::Malformed(format!(
                    "item {}: price {} is not a non-negative number",
                    i, entry.price
                )));
            }
            Ok(PriceQuote {
                id: entry.id,
                crop: localized(entry.name, entry.name_ta, "name", i)?,
                market: localized(entry.market, entry.market_ta, "market", i)?,
                price: entry.price.round() as u64,
                trend: entry.trend,
            })
        })
        .collect()
}

// ── News ─────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireNews {
    id: u32,
    title: String,
    title_ta: String,
    summary: String,
    summary_ta: String,
    date: String,
    #[serde(default, alias = "source_url", alias = "url")]
    source_url: Option<String>,
}

/// Parse a news list. Dates after `today` are clamped to `today`.
pub fn parse_news(text: &str, today: Date) -> Result<Vec<NewsItem>, GatewayError> {
    let entries: Vec<WireNews> = parse_json(text, "news list")?;
    if entries.is_empty() {
        return Err(GatewayError::Malformed("model returned no news".to_string()));
    }

    entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| {
            let mut date = parse_iso_date(&entry.date).map_err(|e| {
                GatewayError::Malformed(format!("item {}: bad date '{}': {}", i, entry.date, e))
            })?;
            if date > today {
                debug!(item = i, %date, "clamping future-dated news item");
                date = today;
            }
            Ok(NewsItem {
                id: entry.id,
                title: localized(entry.title, entry.title_ta, "title", i)?,
                summary: localized(entry.summary, entry.summary_ta, "summary", i)?,
                date,
                source_url: entry.source_url.filter(|u| !u.trim().is_empty()),
            })
        })
        .collect()
}

// ── Scans ────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireScan {
    crop: String,
    crop_ta: String,
    #[serde(default)]
    disease: Option<String>,
    #[serde(default)]
    disease_ta: Option<String>,
    severity: String,
    severity_ta: String,
    remedy: String,
    remedy_ta: String,
    confidence: f64,
}

/// Severity label for a healthy plant whose reply left it blank.
const NO_SEVERITY_LABEL: (&str, &str) = ("None", "இல்லை");

/// Disease names the model uses for a healthy plant.
fn means_no_disease(name: &str) -> bool {
    matches!(
        name.trim().to_ascii_lowercase().as_str(),
        "" | "none" | "n/a" | "healthy" | "no disease" | "no disease detected"
    )
}

/// Parse a scan analysis. An object with a string `error` field and no
/// `crop` is the model's "no crop detected" answer and is passed through.
pub fn parse_scan(text: &str) -> Result<ScanOutcome, GatewayError> {
    let value: serde_json::Value = parse_json(text, "scan analysis")?;

    if let Some(obj) = value.as_object() {
        if !obj.contains_key("crop") {
            if let Some(error) = obj.get("error").and_then(|e| e.as_str()) {
                return Ok(ScanOutcome::NoCropDetected {
                    error: error.to_string(),
                });
            }
        }
    }

    let wire: WireScan = serde_json::from_value(value)
        .map_err(|e| GatewayError::Parse(format!("scan analysis is not valid: {}", e)))?;

    let healthy = wire.disease.as_deref().map_or(true, means_no_disease);
    let severity = match Severity::parse(&wire.severity) {
        Some(severity) => severity,
        None if healthy && means_no_disease(&wire.severity) => Severity::Unknown,
        None => {
            return Err(GatewayError::Malformed(format!(
                "unknown severity '{}'",
                wire.severity
            )))
        }
    };

    let score = wire.confidence.round();
    if !score.is_finite() || !(0.0..=f64::from(Confidence::MAX)).contains(&score) {
        return Err(GatewayError::Malformed(format!(
            "confidence {} is outside 0-100",
            wire.confidence
        )));
    }
    let confidence = Confidence::new(score as u8)
        .map_err(|e| GatewayError::Malformed(e.to_string()))?;

    let disease = match (wire.disease, wire.disease_ta) {
        (Some(en), Some(ta)) if !healthy => Some(localized(en, ta, "disease", 0)?),
        (Some(en), None) if !healthy => {
            return Err(GatewayError::Malformed(format!(
                "disease '{}' has no Tamil translation",
                en
            )))
        }
        _ => None,
    };

    // A healthy plant may come back with no severity wording at all.
    let severity_label = match localized(wire.severity, wire.severity_ta, "severity", 0) {
        Err(_) if healthy => LocalizedText::new(NO_SEVERITY_LABEL.0, NO_SEVERITY_LABEL.1),
        label => label?,
    };

    Ok(ScanOutcome::Detected(ScanResult {
        crop: localized(wire.crop, wire.crop_ta, "crop", 0)?,
        disease,
        severity,
        severity_label,
        remedy: localized(wire.remedy, wire.remedy_ta, "remedy", 0)?,
        confidence,
    }))
}
