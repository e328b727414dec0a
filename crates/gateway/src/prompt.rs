//! Fixed prompts for the three model tasks.
//!
//! The model is asked for flat English/Tamil field pairs (`name`/`nameTa`);
//! [`crate::parse`] turns those into localized text maps.

use time::Date;
use uzhavar_domain::format_iso_date;

/// Number of news items requested from the model.
pub const NEWS_COUNT: usize = 6;

/// Crops whose prices are requested, in display order.
pub const PRICE_CROPS: [&str; 6] = ["Rice", "Cotton", "Turmeric", "Coconut", "Tomato", "Onion"];

/// Message the model returns when a photo has no crop in it.
pub const NO_CROP_MESSAGE: &str = "No crop detected";

const JSON_ONLY: &str = "Return only the JSON. Do not include markdown code blocks or any other text.";

/// Prompt for agricultural news dated `today`.
pub fn news_prompt(today: Date) -> String {
    format!(
        r#"Generate {count} realistic and recent-sounding agricultural news headlines and summaries for farmers in Tamil Nadu, India.
Use today's date, {today}, for every item.
Return a valid JSON array of objects with exactly this structure:
[
  {{
    "id": number,
    "title": "English title",
    "titleTa": "Tamil translation of the title",
    "summary": "Short English summary",
    "summaryTa": "Short Tamil summary",
    "date": "YYYY-MM-DD"
  }}
]
{json_only}"#,
        count = NEWS_COUNT,
        today = format_iso_date(today),
        json_only = JSON_ONLY,
    )
}

/// Prompt for current market prices of [`PRICE_CROPS`].
pub fn prices_prompt() -> String {
    format!(
        r#"Generate realistic market prices for these {count} crops in Tamil Nadu markets: {crops}.
Return a valid JSON array of objects with exactly this structure:
[
  {{
    "id": number,
    "name": "English crop name",
    "nameTa": "Tamil crop name",
    "market": "Market town (e.g. Madurai)",
    "marketTa": "Market town in Tamil",
    "price": number (INR per quintal),
    "trend": "up" | "down" | "stable"
  }}
]
{json_only}"#,
        count = PRICE_CROPS.len(),
        crops = PRICE_CROPS.join(", "),
        json_only = JSON_ONLY,
    )
}

/// Prompt sent alongside a crop photo.
pub fn scan_prompt() -> String {
    format!(
        r#"Analyze this image of a crop.
1. Identify the crop name.
2. Detect if there is any disease. If the plant is healthy, use "None" for the disease and "Unknown" for the severity.
3. If there is a disease, name it, estimate its severity, and provide a remedy.
4. Provide a confidence score from 0 to 100.
5. Translate all text fields to Tamil as well.

Return JSON in exactly this format:
{{
  "crop": "string",
  "cropTa": "string",
  "disease": "string",
  "diseaseTa": "string",
  "severity": "Low" | "Medium" | "High" | "Unknown",
  "severityTa": "Tamil translation of the severity",
  "remedy": "string",
  "remedyTa": "string",
  "confidence": number
}}
If no crop is found, return {{ "error": "{no_crop}" }}.
{json_only}"#,
        no_crop = NO_CROP_MESSAGE,
        json_only = JSON_ONLY,
    )
}
